//! Page reaper background task

use std::{sync::Arc, time::Duration};
use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// How often expired pages are looked for
pub const REAP_INTERVAL: Duration = Duration::from_secs(15);

/// Background task that drops submitted pages once their retention has passed
/// and pages nobody finished once they have been idle too long
pub async fn page_reaper_task(state: Arc<AppState>) {
    info!(
        "Starting page reaper task, retention {}s, idle timeout {}s",
        state.retention.as_secs(),
        state.idle_timeout.as_secs()
    );

    let mut interval = interval(REAP_INTERVAL);

    loop {
        interval.tick().await;

        match state.reap_expired(Utc::now()) {
            Ok(0) => {
                debug!("No expired pages to reap");
            }
            Ok(reaped) => {
                info!("Reaped {} expired pages", reaped);
            }
            Err(e) => {
                warn!("Failed to reap expired pages: {}", e);
            }
        }
    }
}

//! Main application state management

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::{StartPosition, TimerSettings},
    error::ApiError,
    services::extract_video_code,
};

use super::QuizSession;

/// Per-page changes to the server's default timer settings
#[derive(Debug, Clone, Default)]
pub struct PageOverrides {
    pub fixed_start_secs: Option<u32>,
    pub timeout_flag: Option<bool>,
}

/// Main application state that owns every hosted quiz page
#[derive(Debug)]
pub struct AppState {
    /// Hosted pages by id
    pub pages: Mutex<HashMap<Uuid, Arc<QuizSession>>>,
    /// Settings new pages start from
    pub default_settings: TimerSettings,
    /// How long a submitted page stays readable
    pub retention: Duration,
    /// How long an unsubmitted page may wait before it is dropped
    pub idle_timeout: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState with no pages
    pub fn new(
        port: u16,
        host: String,
        default_settings: TimerSettings,
        retention: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            default_settings,
            retention,
            idle_timeout,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_pages(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Arc<QuizSession>>>, ApiError> {
        self.pages
            .lock()
            .map_err(|e| ApiError::Internal(format!("Failed to lock pages: {}", e)))
    }

    /// Record the last action for status reporting
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Settings for a new page, defaults plus overrides
    pub fn settings_for(&self, overrides: &PageOverrides) -> TimerSettings {
        let mut settings = self.default_settings.clone();
        if let Some(offset_secs) = overrides.fixed_start_secs {
            settings.start = StartPosition::Fixed { offset_secs };
        }
        if let Some(timeout_flag) = overrides.timeout_flag {
            settings.timeout_flag = timeout_flag;
        }
        settings
    }

    /// Create a quiz page and start its countdown task
    pub fn create_page(
        &self,
        video: &str,
        media_duration_secs: u32,
        overrides: &PageOverrides,
    ) -> Result<Arc<QuizSession>, ApiError> {
        if media_duration_secs == 0 {
            return Err(ApiError::ZeroMediaDuration);
        }
        let settings = self.settings_for(overrides);
        if let StartPosition::Fixed { offset_secs } = settings.start {
            if offset_secs >= media_duration_secs {
                return Err(ApiError::StartPastEnd {
                    offset_secs,
                    media_secs: media_duration_secs,
                });
            }
        }
        let video_code = extract_video_code(video)?;
        let session = Arc::new(QuizSession::spawn(video_code, media_duration_secs, settings)?);

        self.lock_pages()?.insert(session.id, Arc::clone(&session));
        self.record_action("create");
        Ok(session)
    }

    /// Look up a hosted page
    pub fn get_page(&self, id: Uuid) -> Result<Arc<QuizSession>, ApiError> {
        self.lock_pages()?
            .get(&id)
            .cloned()
            .ok_or(ApiError::PageNotFound(id))
    }

    /// Close a page; its countdown task ends once the last handle drops
    pub fn remove_page(&self, id: Uuid) -> Result<(), ApiError> {
        let removed = self.lock_pages()?.remove(&id);
        match removed {
            Some(_) => {
                info!("Closed quiz page {}", id);
                self.record_action("close");
                Ok(())
            }
            None => Err(ApiError::PageNotFound(id)),
        }
    }

    /// Drop pages submitted more than `retention` before `now`, and
    /// unsubmitted pages created more than `idle_timeout` before it
    pub fn reap_expired(&self, now: DateTime<Utc>) -> Result<usize, ApiError> {
        let retention = chrono::Duration::from_std(self.retention)
            .map_err(|e| ApiError::Internal(format!("Invalid retention: {}", e)))?;
        let idle_timeout = chrono::Duration::from_std(self.idle_timeout)
            .map_err(|e| ApiError::Internal(format!("Invalid idle timeout: {}", e)))?;
        let mut pages = self.lock_pages()?;
        let before = pages.len();
        pages.retain(|id, session| match session.submitted_at() {
            Some(at) if now - at >= retention => {
                info!("Reaping finished quiz page {}", id);
                false
            }
            None if now - session.created_at >= idle_timeout => {
                info!("Reaping quiz page {} left unsubmitted since {}", id, session.created_at);
                false
            }
            _ => true,
        });
        Ok(before - pages.len())
    }

    /// Number of (counting or idle, submitted) pages
    pub fn page_counts(&self) -> (usize, usize) {
        match self.lock_pages() {
            Ok(pages) => {
                let finished = pages.values().filter(|s| s.timer().is_finished()).count();
                (pages.len() - finished, finished)
            }
            Err(e) => {
                warn!("{}", e);
                (0, 0)
            }
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

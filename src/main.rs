//! Quiz Timer - hosts video quiz pages over HTTP
//! 
//! This is the main entry point for the quiz-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use quiz_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::page_reaper_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("quiz_timer={},tower_http=info", config.log_level()))
        .init();

    let settings = config.timer_settings();
    info!("Starting quiz-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}ms, start={:?}, timeout_flag={}",
          config.host, config.port, settings.duration_millis, settings.start, settings.timeout_flag);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        settings,
        config.retention(),
        config.idle_timeout(),
    ));

    // Start the page reaper background task
    let reaper_state = Arc::clone(&state);
    tokio::spawn(async move {
        page_reaper_task(reaper_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /quiz                     - Create a quiz page");
    info!("  GET    /quiz/:id                 - Page view and timer state");
    info!("  DELETE /quiz/:id                 - Close a quiz page");
    info!("  POST   /quiz/:id/player/ready    - Player constructed");
    info!("  POST   /quiz/:id/player/state    - Player state change");
    info!("  GET    /quiz/:id/player/commands - Drain player commands");
    info!("  POST   /quiz/:id/submit          - Submit the answer form");
    info!("  GET    /status                   - Server status");
    info!("  GET    /health                   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

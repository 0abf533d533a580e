//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/quiz", post(create_page_handler))
        .route("/quiz/:id", get(page_handler).delete(close_page_handler))
        .route("/quiz/:id/player/ready", post(player_ready_handler))
        .route("/quiz/:id/player/state", post(player_state_handler))
        .route("/quiz/:id/player/commands", get(player_commands_handler))
        .route("/quiz/:id/submit", post(submit_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

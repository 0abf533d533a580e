//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::ApiError,
    services::PlayerState,
    state::{AppState, PageOverrides},
};
use super::responses::{
    ApiResponse, CommandsResponse, CreatePageRequest, HealthResponse, PageResponse,
    PlayerStateRequest, PlayerStateResponse, StatusResponse, SubmitRequest,
};

/// Handle POST /quiz - Create a quiz page
pub async fn create_page_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<PageResponse>), ApiError> {
    let overrides = PageOverrides {
        fixed_start_secs: request.fixed_start_secs,
        timeout_flag: request.timeout_flag,
    };
    let session = state.create_page(&request.video, request.media_duration_secs, &overrides)?;
    Ok((StatusCode::CREATED, Json(PageResponse::from_session(&session))))
}

/// Handle GET /quiz/:id - Return the page view
pub async fn page_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageResponse>, ApiError> {
    let session = state.get_page(id)?;
    Ok(Json(PageResponse::from_session(&session)))
}

/// Handle DELETE /quiz/:id - Close the page
pub async fn close_page_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.remove_page(id)?;
    Ok(Json(ApiResponse::ok(format!("Quiz page {} closed", id))))
}

/// Handle POST /quiz/:id/player/ready - The embedded player was constructed
pub async fn player_ready_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageResponse>, ApiError> {
    let session = state.get_page(id)?;
    let timer = session.player_ready().await;
    info!("Player ready on page {}", id);
    Ok(Json(PageResponse::with_timer(&session, timer)))
}

/// Handle POST /quiz/:id/player/state - Forward a player state change
pub async fn player_state_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<PlayerStateRequest>,
) -> Result<Json<PlayerStateResponse>, ApiError> {
    let player_state =
        PlayerState::from_code(request.state).ok_or(ApiError::UnknownPlayerState(request.state))?;
    let session = state.get_page(id)?;
    let delivered = session.player_state(player_state);
    debug!("Player state {:?} on page {} delivered={}", player_state, id, delivered);
    Ok(Json(PlayerStateResponse {
        state: player_state,
        delivered,
    }))
}

/// Handle GET /quiz/:id/player/commands - Drain queued player commands
pub async fn player_commands_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommandsResponse>, ApiError> {
    let session = state.get_page(id)?;
    Ok(Json(CommandsResponse {
        commands: session.player.drain_commands(),
    }))
}

/// Handle POST /quiz/:id/submit - The user submits the answer form
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    request: Option<Json<SubmitRequest>>,
) -> Result<Json<PageResponse>, ApiError> {
    let session = state.get_page(id)?;
    let answer = request.and_then(|Json(body)| body.answer);
    let timer = session.submit(answer).await;
    state.record_action("submit");
    Ok(Json(PageResponse::with_timer(&session, timer)))
}

/// Handle GET /status - Return server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (active_pages, finished_pages) = state.page_counts();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        active_pages,
        finished_pages,
        default_settings: state.default_settings.clone(),
        retention_seconds: state.retention.as_secs(),
        idle_timeout_seconds: state.idle_timeout.as_secs(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

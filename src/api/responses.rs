//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{
    config::TimerSettings,
    error::ApiError,
    services::{PlayerCommand, PlayerState, PlayerView},
    state::{PageView, QuizSession, TimerSnapshot},
};

/// Body of POST /quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePageRequest {
    /// Video code or watch/embed URL
    pub video: String,
    pub media_duration_secs: u32,
    #[serde(default)]
    pub fixed_start_secs: Option<u32>,
    #[serde(default)]
    pub timeout_flag: Option<bool>,
}

/// Body of POST /quiz/:id/player/state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStateRequest {
    pub state: i32,
}

/// Body of POST /quiz/:id/submit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub answer: Option<String>,
}

/// Full view of one quiz page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub id: Uuid,
    pub video_code: String,
    pub created_at: DateTime<Utc>,
    pub settings: TimerSettings,
    pub timer: TimerSnapshot,
    pub page: PageView,
    pub player: PlayerView,
}

impl PageResponse {
    /// Build from a session, using an already obtained timer snapshot
    pub fn with_timer(session: &QuizSession, timer: TimerSnapshot) -> Self {
        Self {
            id: session.id,
            video_code: session.video_code.clone(),
            created_at: session.created_at,
            settings: session.settings.clone(),
            timer,
            page: session.view(),
            player: session.player_view(),
        }
    }

    pub fn from_session(session: &QuizSession) -> Self {
        Self::with_timer(session, session.timer())
    }
}

/// Result of forwarding a player state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStateResponse {
    pub state: PlayerState,
    /// False when the player was not ready yet and the change was dropped
    pub delivered: bool,
}

/// Player commands queued since the last poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsResponse {
    pub commands: Vec<PlayerCommand>,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn ok(message: String) -> Self {
        Self::new("ok".to_string(), message)
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message)
    }
}

/// Server status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub active_pages: usize,
    pub finished_pages: usize,
    pub default_settings: TimerSettings,
    pub retention_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::PageNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownPlayerState(_)
            | ApiError::ZeroMediaDuration
            | ApiError::StartPastEnd { .. }
            | ApiError::Video(_) => StatusCode::BAD_REQUEST,
            ApiError::Timer(_) | ApiError::Internal(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

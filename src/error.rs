//! Error types

use thiserror::Error;

/// Errors raised while binding a quiz timer to its page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("quiz form has no '{0}' field")]
    MissingField(&'static str),

    #[error("timer step must be positive")]
    ZeroStep,
}

/// Errors raised while reading a video reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VideoError {
    #[error("video reference is empty")]
    Empty,

    #[error("cannot extract video code from '{0}'")]
    UnrecognizedUrl(String),
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("quiz page {0} not found")]
    PageNotFound(uuid::Uuid),

    #[error("unknown player state code {0}")]
    UnknownPlayerState(i32),

    #[error("media duration must be positive")]
    ZeroMediaDuration,

    #[error("start offset {offset_secs}s is past the end of {media_secs}s of media")]
    StartPastEnd { offset_secs: u32, media_secs: u32 },

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("internal error: {0}")]
    Internal(String),
}

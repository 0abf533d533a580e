//! Quiz Timer - countdown-and-submission control for video quiz pages
//! 
//! A quiz page embeds a video player, starts a countdown once playback
//! begins, and submits its answer form exactly once: when the countdown
//! runs out or when the user submits early. This library provides the
//! controller, the capabilities it is bound to, and an HTTP host for
//! remote pages.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, StartPosition, TimerSettings};
pub use error::{ApiError, TimerError, VideoError};
pub use state::AppState;
pub use timer::{ManualScheduler, QuizTimer, TickScheduler};
pub use utils::signals::shutdown_signal;

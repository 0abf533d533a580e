//! External capability module
//! 
//! This module contains the capabilities a quiz timer is bound to (video
//! player, timer display, answer form) and their remote implementations.

pub mod page;
pub mod player;
pub mod video;

// Re-export main types
pub use page::{AnswerForm, RemotePage, TimerDisplay};
pub use player::{PlayerCommand, PlayerState, PlayerView, RemotePlayer, StateListener, VideoPlayer};
pub use video::extract_video_code;

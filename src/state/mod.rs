//! State management module
//! 
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod page_state;
pub mod session;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, PageOverrides};
pub use page_state::{PageView, Submission, ANSWER_FIELD, REMAINING_TIME_FIELD, TIMEOUT_FLAG_FIELD};
pub use session::QuizSession;
pub use timer_state::{Phase, SubmissionKind, TimerSnapshot, TimerState};

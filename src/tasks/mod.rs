//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown_task;
pub mod page_reaper;

// Re-export main functions
pub use countdown_task::{countdown_task, PageTimer, TimerEvent, TokioTickScheduler};
pub use page_reaper::page_reaper_task;

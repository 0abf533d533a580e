//! Quiz timer module
//! 
//! This module contains the countdown-and-submission controller and the
//! scheduling seam it re-arms its ticks through.

pub mod countdown;
pub mod scheduler;

// Re-export main types
pub use countdown::{format_remaining, QuizTimer};
pub use scheduler::{ManualScheduler, TickId, TickScheduler};

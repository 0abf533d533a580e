//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Countdown step between two ticks.
pub const TICK_STEP_MILLIS: u64 = 100;
/// Remaining time below which the display switches to the warning color.
pub const WARNING_THRESHOLD_MILLIS: u64 = 10_000;
/// Color applied to the display once the warning threshold is crossed.
pub const WARNING_COLOR: &str = "#CC0000";
/// Output volume set on the player when it becomes ready.
pub const PLAYER_VOLUME: u8 = 100;
/// Quiz duration used when nothing else is configured.
pub const DEFAULT_DURATION_SECS: u64 = 20;
/// Longest quiz duration accepted on the command line.
pub const MAX_DURATION_SECS: u64 = 86_400;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "quiz-timer")]
#[command(about = "Hosts video quiz pages and submits their answer forms on time")]
#[command(version = "0.3.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Quiz duration in seconds
    #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_SECS))]
    pub duration: u64,

    /// Start every clip at this offset (seconds) instead of a random one
    #[arg(long)]
    pub fixed_start: Option<u32>,

    /// Do not expose the timeout flag field on quiz forms
    #[arg(long)]
    pub no_timeout_flag: bool,

    /// Seconds a finished page is kept before it is reaped
    #[arg(short, long, default_value = "300")]
    pub retention: u64,

    /// Seconds an unsubmitted page is kept before it is reaped
    #[arg(long, default_value = "3600", value_parser = clap::value_parser!(u64).range(60..))]
    pub idle_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// How long finished pages stay readable
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention)
    }

    /// How long a page may wait for playback or submission
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    /// Default timer settings for pages created by this server
    pub fn timer_settings(&self) -> TimerSettings {
        let start = match self.fixed_start {
            Some(offset_secs) => StartPosition::Fixed { offset_secs },
            None => StartPosition::Random,
        };
        TimerSettings {
            duration_millis: self.duration.saturating_mul(1000),
            start,
            timeout_flag: !self.no_timeout_flag,
            ..TimerSettings::default()
        }
    }
}

/// Where playback starts once the player is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StartPosition {
    /// Anywhere that still leaves a full quiz duration of media.
    Random,
    Fixed { offset_secs: u32 },
}

impl StartPosition {
    /// Pick the seek offset in seconds for a clip of `media_secs` seconds.
    pub fn resolve<R: Rng>(&self, rng: &mut R, media_secs: u32, quiz_secs: u32) -> u32 {
        match *self {
            StartPosition::Random => {
                let span = media_secs.saturating_sub(quiz_secs);
                rng.random_range(0..=span)
            }
            StartPosition::Fixed { offset_secs } => offset_secs,
        }
    }
}

/// Settings of a single quiz timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub duration_millis: u64,
    pub step_millis: u64,
    pub warning_threshold_millis: u64,
    pub warning_color: String,
    pub volume: u8,
    pub start: StartPosition,
    /// Write `timeout_flag` before an automatic submission
    pub timeout_flag: bool,
}

impl TimerSettings {
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_millis)
    }

    /// Whole seconds of quiz time, as used for start offset selection
    pub fn duration_secs(&self) -> u32 {
        u32::try_from(self.duration_millis / 1000).unwrap_or(u32::MAX)
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            duration_millis: DEFAULT_DURATION_SECS * 1000,
            step_millis: TICK_STEP_MILLIS,
            warning_threshold_millis: WARNING_THRESHOLD_MILLIS,
            warning_color: WARNING_COLOR.to_string(),
            volume: PLAYER_VOLUME,
            start: StartPosition::Random,
            timeout_flag: true,
        }
    }
}

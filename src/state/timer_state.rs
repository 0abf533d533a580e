//! Timer state structure and management

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a quiz timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Counting,
    Submitted,
}

/// Which path submitted the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    User,
    Timeout,
}

/// Countdown state of one quiz page.
///
/// `H` is the handle of the pending tick, as returned by the scheduler.
/// Only the owning `QuizTimer` writes these fields.
#[derive(Debug)]
pub struct TimerState<H> {
    pub(crate) remaining_millis: u64,
    pub(crate) is_player_ready: bool,
    pub(crate) is_counting: bool,
    pub(crate) is_submitted: bool,
    /// Warning color has been applied to the display
    pub(crate) warning: bool,
    pub(crate) ticks: u32,
    pub(crate) submission: Option<SubmissionKind>,
    pub(crate) tick_handle: Option<H>,
}

impl<H> TimerState<H> {
    /// Create an idle timer state with the full duration remaining
    pub fn new(duration_millis: u64) -> Self {
        Self {
            remaining_millis: duration_millis,
            is_player_ready: false,
            is_counting: false,
            is_submitted: false,
            warning: false,
            ticks: 0,
            submission: None,
            tick_handle: None,
        }
    }

    pub fn remaining_millis(&self) -> u64 {
        self.remaining_millis
    }

    pub fn is_player_ready(&self) -> bool {
        self.is_player_ready
    }

    /// Check if the countdown has started
    pub fn is_counting(&self) -> bool {
        self.is_counting
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }

    /// Number of ticks applied so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn submission(&self) -> Option<SubmissionKind> {
        self.submission
    }

    pub fn has_pending_tick(&self) -> bool {
        self.tick_handle.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_submitted {
            Phase::Submitted
        } else if self.is_counting {
            Phase::Counting
        } else {
            Phase::Idle
        }
    }

    /// Ticks may only run while counting and not yet submitted
    pub fn may_tick(&self) -> bool {
        self.is_counting && !self.is_submitted
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase(),
            remaining_millis: self.remaining_millis,
            player_ready: self.is_player_ready,
            warning: self.warning,
            ticks: self.ticks,
            tick_pending: self.tick_handle.is_some(),
            submission: self.submission,
        }
    }
}

/// Copy of a timer state that can leave the countdown task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_millis: u64,
    pub player_ready: bool,
    pub warning: bool,
    pub ticks: u32,
    pub tick_pending: bool,
    pub submission: Option<SubmissionKind>,
}

impl TimerSnapshot {
    /// Snapshot of a timer that has not seen any event yet
    pub fn idle(duration_millis: u64) -> Self {
        TimerState::<()>::new(duration_millis).snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_the_flags() {
        let mut state = TimerState::<u8>::new(20_000);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.may_tick());

        state.is_counting = true;
        assert_eq!(state.phase(), Phase::Counting);
        assert!(state.may_tick());

        state.is_submitted = true;
        assert_eq!(state.phase(), Phase::Submitted);
        assert!(!state.may_tick());
        assert!(state.is_counting() && state.is_submitted());
    }

    #[test]
    fn idle_snapshot_has_full_time_and_no_tick() {
        let snapshot = TimerSnapshot::idle(20_000);
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.remaining_millis, 20_000);
        assert!(!snapshot.tick_pending);
        assert!(!snapshot.is_finished());
    }
}

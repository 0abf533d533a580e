//! Tick scheduling

use std::{collections::VecDeque, time::Duration};

/// Schedules the next countdown tick.
///
/// The scheduler only arms a callback; the host delivers it by calling
/// `QuizTimer::tick` once the delay has elapsed.
pub trait TickScheduler {
    type Handle;

    fn schedule(&mut self, after: Duration) -> Self::Handle;

    /// Cancel a pending tick. Cancelling a handle that already fired or was
    /// already cancelled does nothing.
    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickId(u64);

/// Scheduler for hosts that drive ticks themselves, e.g. a frame loop.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<(TickId, Duration)>,
    scheduled: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total ticks ever scheduled
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }

    /// Total pending ticks actually removed by `cancel`
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Delay requested by the oldest pending tick
    pub fn next_delay(&self) -> Option<Duration> {
        self.pending.front().map(|(_, after)| *after)
    }

    /// Pop the oldest pending tick as if its delay had elapsed.
    pub fn fire(&mut self) -> Option<TickId> {
        self.pending.pop_front().map(|(id, _)| id)
    }
}

impl TickScheduler for ManualScheduler {
    type Handle = TickId;

    fn schedule(&mut self, after: Duration) -> TickId {
        let id = TickId(self.next_id);
        self.next_id += 1;
        self.scheduled += 1;
        self.pending.push_back((id, after));
        id
    }

    fn cancel(&mut self, handle: TickId) {
        if let Some(pos) = self.pending.iter().position(|(id, _)| *id == handle) {
            self.pending.remove(pos);
            self.cancelled += 1;
        }
    }
}

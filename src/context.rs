//! Mutable node state threaded through every per-cycle operation.
//!
//! `NodeContext` is the single struct that the scheduler, the dispatcher
//! and the feedback timer read from and write to.  Nothing else in the
//! firmware holds mutable state between cycles.

use crate::app::ports::OutputChannel;
use crate::feedback::FeedbackTimer;

// ---------------------------------------------------------------------------
// Scheduler state (written only by the telemetry scheduler)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerState {
    /// Clock value the last push was scheduled for.  `None` until the
    /// first poll, which fires immediately and anchors the schedule.
    pub last_fire_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Output state (written only by bus WRITE commands)
// ---------------------------------------------------------------------------

/// Last commanded level of each indicator output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStates([bool; 3]);

impl OutputStates {
    pub const fn all_off() -> Self {
        Self([false; 3])
    }

    pub const fn get(&self, channel: OutputChannel) -> bool {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: OutputChannel, on: bool) {
        self.0[channel.index()] = on;
    }
}

// ---------------------------------------------------------------------------
// NodeContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeContext {
    pub scheduler: SchedulerState,
    pub feedback: FeedbackTimer,
    pub outputs: OutputStates,
}

impl NodeContext {
    pub const fn new() -> Self {
        Self {
            scheduler: SchedulerState { last_fire_ms: None },
            feedback: FeedbackTimer::new(),
            outputs: OutputStates::all_off(),
        }
    }
}

//! Self-expiring RGB feedback flash.
//!
//! ```text
//!   Idle ──trigger(d > 0)──▶ Active{expiry} ──tick(now ≥ expiry)──▶ Idle
//!            ▲                   │
//!            └── trigger(0) ─────┤ trigger(any) restarts expiry
//! ```
//!
//! The timer owns no hardware.  Every transition renders through an
//! [`IndicatorPort`] passed in by the caller, so the strip driver stays a
//! pure sink and the timing can be exercised without one.

use crate::app::ports::{IndicatorPort, Rgb};

/// Current feedback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackState {
    #[default]
    Idle,
    Active {
        /// Absolute clock value at which the flash goes dark.
        expiry_ms: u64,
        colour: Rgb,
    },
}

/// Feedback timer.  Lives in the [`NodeContext`](crate::context::NodeContext).
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackTimer {
    state: FeedbackState,
}

impl FeedbackTimer {
    pub const fn new() -> Self {
        Self {
            state: FeedbackState::Idle,
        }
    }

    pub const fn state(&self) -> FeedbackState {
        self.state
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.state, FeedbackState::Active { .. })
    }

    /// Light every pixel with `colour` for `duration_ms`.
    ///
    /// Retriggering while active replaces colour and expiry; flashes never
    /// queue.  A zero duration is the same as [`extinguish`](Self::extinguish).
    pub fn trigger(
        &mut self,
        now_ms: u64,
        duration_ms: u32,
        colour: Rgb,
        indicator: &mut impl IndicatorPort,
    ) {
        if duration_ms == 0 {
            self.extinguish(indicator);
            return;
        }
        indicator.set_all(colour);
        indicator.show();
        self.state = FeedbackState::Active {
            expiry_ms: now_ms.saturating_add(u64::from(duration_ms)),
            colour,
        };
    }

    /// Clear the pixels and go idle.
    pub fn extinguish(&mut self, indicator: &mut impl IndicatorPort) {
        indicator.clear();
        indicator.show();
        self.state = FeedbackState::Idle;
    }

    /// Expire the flash once `now_ms` reaches its deadline.
    /// Returns `true` on the cycle the flash went dark.
    pub fn tick(&mut self, now_ms: u64, indicator: &mut impl IndicatorPort) -> bool {
        match self.state {
            FeedbackState::Active { expiry_ms, .. } if now_ms >= expiry_ms => {
                self.extinguish(indicator);
                true
            }
            _ => false,
        }
    }
}

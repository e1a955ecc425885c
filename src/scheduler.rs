//! Periodic telemetry push.
//!
//! ```text
//!   poll(now) ──▶ due? ──no──▶ None
//!                  │yes
//!                  ▼
//!   last_fire += interval
//!   read CO2, temperature, humidity, brightness   (MeasurementPort)
//!   send_value × 4                                 (BusPort)
//!   trigger liveness flash                         (FeedbackTimer)
//! ```
//!
//! The schedule is anchored on the first poll and then advances by exactly
//! one interval per fire, never to "now".  A late poll therefore fires
//! once and leaves the next deadline on the same grid; a gap of several
//! intervals is caught up one push per cycle.

use crate::app::ports::{BusPort, IndicatorPort, MeasurementPort, Quantity, Rgb};
use crate::config::NodeConfig;
use crate::context::{NodeContext, SchedulerState};
use crate::knx::address::GroupAddress;

/// One published measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub quantity: Quantity,
    pub address: GroupAddress,
    /// Raw provider value; `NaN` on a sensor fault.
    pub value: f32,
}

/// Everything pushed by one fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryFrame {
    /// Slot on the schedule grid this push belongs to.
    pub scheduled_ms: u64,
    pub readings: [Reading; 4],
}

/// Fixed-period telemetry scheduler.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryScheduler {
    interval_ms: u64,
    points: [(Quantity, GroupAddress); 4],
    flash_ms: u32,
    flash_colour: Rgb,
}

impl TelemetryScheduler {
    pub fn new(
        interval_ms: u32,
        points: [(Quantity, GroupAddress); 4],
        flash_ms: u32,
        flash_colour: Rgb,
    ) -> Self {
        Self {
            interval_ms: u64::from(interval_ms.max(1)),
            points,
            flash_ms,
            flash_colour,
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        let points = Quantity::ALL.map(|q| (q, config.groups.measurement(q)));
        Self::new(
            config.telemetry_interval_ms,
            points,
            config.telemetry_flash_ms,
            config.telemetry_flash_colour,
        )
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Deadline of the next push, or `None` before the first poll.
    pub fn next_due_ms(&self, state: &SchedulerState) -> Option<u64> {
        state.last_fire_ms.map(|last| last.saturating_add(self.interval_ms))
    }

    /// Whether a push is due at `now_ms`.
    pub fn is_due(&self, now_ms: u64, state: &SchedulerState) -> bool {
        match state.last_fire_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Check the deadline and fire at most once.
    pub fn poll<H, B>(
        &self,
        now_ms: u64,
        ctx: &mut NodeContext,
        hw: &mut H,
        bus: &mut B,
    ) -> Option<TelemetryFrame>
    where
        H: MeasurementPort + IndicatorPort,
        B: BusPort,
    {
        if !self.is_due(now_ms, &ctx.scheduler) {
            return None;
        }

        let scheduled_ms = match ctx.scheduler.last_fire_ms {
            None => now_ms,
            Some(last) => last.saturating_add(self.interval_ms),
        };
        ctx.scheduler.last_fire_ms = Some(scheduled_ms);

        let readings = self.points.map(|(quantity, address)| Reading {
            quantity,
            address,
            value: hw.read(quantity),
        });
        for r in &readings {
            bus.send_value(r.address, r.value);
        }

        ctx.feedback.trigger(now_ms, self.flash_ms, self.flash_colour, hw);

        Some(TelemetryFrame { scheduled_ms, readings })
    }
}

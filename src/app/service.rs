//! Node service, the hexagonal core.
//!
//! [`NodeService`] owns the dispatcher, the telemetry scheduler and the
//! per-cycle [`NodeContext`].  All I/O flows through port traits injected
//! at call sites, so the whole main loop can run against mock adapters.
//!
//! ```text
//!  MeasurementPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!       OutputPort ◀── │          NodeService          │
//!    IndicatorPort ◀── │ Scheduler · Dispatcher · Feedback │ ◀─▶ BusPort
//!       ButtonPort ──▶ └──────────────────────────────┘
//! ```
//!
//! One [`cycle`](NodeService::cycle) runs four steps in a fixed order,
//! none of which blocks: telemetry, one inbound telegram, feedback
//! expiry, button edge.

use log::{info, warn};

use super::dispatcher::{DispatchOutcome, Dispatcher, IgnoreReason};
use super::events::NodeEvent;
use super::ports::{
    BusPort, ButtonPort, Edge, EventSink, IndicatorPort, MeasurementPort, OutputChannel, OutputPort,
};
use crate::config::NodeConfig;
use crate::context::NodeContext;
use crate::error::ConfigError;
use crate::scheduler::{TelemetryFrame, TelemetryScheduler};

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleReport {
    pub telemetry: Option<TelemetryFrame>,
    pub dispatch: Option<DispatchOutcome>,
    pub feedback_expired: bool,
    pub button_pressed: bool,
}

/// The node service composes every core component.
pub struct NodeService {
    config: NodeConfig,
    dispatcher: Dispatcher,
    scheduler: TelemetryScheduler,
    ctx: NodeContext,
    cycles: u64,
}

impl NodeService {
    /// Validate `config` and build the route table.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        for c in config.collisions() {
            warn!(
                "config: {} and {} share group address {} (first registered wins)",
                c.first.name(),
                c.second.name(),
                c.address
            );
        }

        let dispatcher = Dispatcher::from_groups(&config.groups)?;
        let scheduler = TelemetryScheduler::from_config(&config);

        Ok(Self {
            config,
            dispatcher,
            scheduler,
            ctx: NodeContext::new(),
            cycles: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output low, show the boot flash and anchor the
    /// telemetry schedule at `now_ms`.  The first push follows one full
    /// interval later, so the boot flash is never cut short.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl OutputPort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        for ch in OutputChannel::ALL {
            hw.set_output(ch, false);
            self.ctx.outputs.set(ch, false);
        }
        self.ctx
            .feedback
            .trigger(now_ms, self.config.boot_flash_ms, self.config.boot_flash_colour, hw);
        self.ctx.scheduler.last_fire_ms = Some(now_ms);

        sink.emit(&NodeEvent::Started {
            address: self.config.physical_address,
        });
        info!(
            "NodeService started as {} ({} routes)",
            self.config.physical_address,
            self.dispatcher.routes().len()
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one main-loop cycle at `now_ms`.
    ///
    /// `hw` satisfies all three hardware ports so the scheduler, the
    /// dispatcher and the feedback timer can share it without a double
    /// mutable borrow.
    pub fn cycle<H, B, P, S>(
        &mut self,
        now_ms: u64,
        hw: &mut H,
        bus: &mut B,
        button: &mut P,
        sink: &mut S,
    ) -> CycleReport
    where
        H: MeasurementPort + OutputPort + IndicatorPort,
        B: BusPort,
        P: ButtonPort,
        S: EventSink,
    {
        self.cycles = self.cycles.wrapping_add(1);
        let mut report = CycleReport::default();

        // 1. Telemetry
        if let Some(frame) = self.scheduler.poll(now_ms, &mut self.ctx, hw, bus) {
            sink.emit(&NodeEvent::TelemetryPushed(frame));
            report.telemetry = Some(frame);
        }

        // 2. At most one inbound telegram
        if let Some(telegram) = bus.poll_frame() {
            let outcome = self.dispatcher.dispatch(&telegram, &mut self.ctx, hw, bus);
            match outcome {
                DispatchOutcome::Answered {
                    address,
                    quantity,
                    value,
                } => sink.emit(&NodeEvent::ReadAnswered {
                    address,
                    quantity,
                    value,
                }),
                DispatchOutcome::Switched { address, channel, on } => {
                    sink.emit(&NodeEvent::OutputSwitched { address, channel, on })
                }
                // Foreign traffic is the normal case on a shared bus.
                DispatchOutcome::Ignored(IgnoreReason::NotListening) => {}
                DispatchOutcome::Ignored(reason) => sink.emit(&NodeEvent::TelegramIgnored {
                    address: telegram.destination,
                    reason,
                }),
            }
            report.dispatch = Some(outcome);
        }

        // 3. Feedback expiry
        if self.ctx.feedback.tick(now_ms, hw) {
            sink.emit(&NodeEvent::FeedbackExpired);
            report.feedback_expired = true;
        }

        // 4. Button
        if button.sample(now_ms) == Some(Edge::Fell) {
            let address = self.config.groups.button;
            bus.send_bool(address, true);
            sink.emit(&NodeEvent::ButtonPressed { address });
            report.button_pressed = true;
        }

        report
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Cycles run since construction.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }
}

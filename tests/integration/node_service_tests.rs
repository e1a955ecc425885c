//! End-to-end tests for `NodeService`.
//!
//! The service is driven cycle by cycle against `MockHardware`, `MockBus`
//! and a real `Debouncer` on a `SharedPin`, with the clock passed in
//! explicitly so every timeline is deterministic.

use crate::mock_hw::{BusCall, HwCall, MockBus, MockHardware, RecordingSink, SharedPin};
use multisensor::app::dispatcher::{DispatchOutcome, IgnoreReason};
use multisensor::app::events::NodeEvent;
use multisensor::app::ports::{OutputChannel, Quantity};
use multisensor::app::service::NodeService;
use multisensor::config::NodeConfig;
use multisensor::drivers::button::Debouncer;
use multisensor::feedback::FeedbackState;
use multisensor::knx::address::{GroupAddress, IndividualAddress};
use multisensor::knx::telegram::Telegram;

// ── Helpers ───────────────────────────────────────────────────

struct Rig {
    node: NodeService,
    hw: MockHardware,
    bus: MockBus,
    pin: SharedPin,
    button: Debouncer<SharedPin>,
    sink: RecordingSink,
}

impl Rig {
    fn started() -> Self {
        let config = NodeConfig::default();
        let pin = SharedPin::released();
        let button = Debouncer::new(pin.clone(), config.debounce_ms);
        let mut rig = Self {
            node: NodeService::new(config).unwrap(),
            hw: MockHardware::new(),
            bus: MockBus::new(),
            pin,
            button,
            sink: RecordingSink::new(),
        };
        rig.node.start(0, &mut rig.hw, &mut rig.sink);
        rig
    }

    fn cycle(&mut self, now_ms: u64) -> multisensor::app::service::CycleReport {
        self.node
            .cycle(now_ms, &mut self.hw, &mut self.bus, &mut self.button, &mut self.sink)
    }
}

fn ga(s: &str) -> GroupAddress {
    s.parse().unwrap()
}

fn peer() -> IndividualAddress {
    IndividualAddress::new(1, 1, 7).unwrap()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_outputs_low_and_shows_boot_flash() {
    let rig = Rig::started();

    for ch in OutputChannel::ALL {
        assert_eq!(rig.hw.output(ch), Some(false));
        assert!(!rig.node.context().outputs.get(ch));
    }
    assert_eq!(rig.hw.lit(), (0, 150, 0));
    assert_eq!(
        rig.node.context().feedback.state(),
        FeedbackState::Active {
            expiry_ms: 1_000,
            colour: (0, 150, 0),
        }
    );
    assert!(matches!(rig.sink.events[0], NodeEvent::Started { .. }));
}

// ── Telemetry and feedback timeline ───────────────────────────

#[test]
fn boot_flash_survives_the_first_cycles() {
    let mut rig = Rig::started();

    let report = rig.cycle(1);
    assert!(report.telemetry.is_none(), "first push waits one interval");
    assert!(rig.bus.values().is_empty());
    assert_eq!(rig.hw.lit(), (0, 150, 0));

    assert!(!rig.cycle(600).feedback_expired);
    assert_eq!(rig.hw.lit(), (0, 150, 0));

    assert!(rig.cycle(1_000).feedback_expired);
    assert_eq!(rig.hw.lit(), (0, 0, 0));
}

#[test]
fn telemetry_and_flash_timeline() {
    let mut rig = Rig::started();
    rig.cycle(1);
    rig.cycle(1_000);

    // t = 9_999: not due yet.
    assert!(rig.cycle(9_999).telemetry.is_none());

    // t = 10_000: first push, one interval after start.
    let report = rig.cycle(10_000);
    let frame = report.telemetry.expect("first push");
    assert_eq!(frame.scheduled_ms, 10_000);
    assert_eq!(
        rig.bus.values(),
        vec![
            (ga("10/1/1"), 612.0),
            (ga("10/1/2"), 22.25),
            (ga("10/1/3"), 41.5),
            (ga("10/1/4"), 180.0),
        ]
    );
    assert_eq!(rig.hw.lit(), (0, 0, 150));
    assert!(!report.feedback_expired);

    // t = 10_400: still lit, nothing new on the bus.
    let report = rig.cycle(10_400);
    assert!(report.telemetry.is_none());
    assert!(!report.feedback_expired);
    assert_eq!(rig.hw.lit(), (0, 0, 150));

    // t = 10_600: the 500 ms flash has expired.
    let report = rig.cycle(10_600);
    assert!(report.feedback_expired);
    assert_eq!(rig.hw.lit(), (0, 0, 0));
    assert!(!rig.node.context().feedback.is_active());

    // t = 20_000: second push, still on the grid.
    let frame = rig.cycle(20_000).telemetry.expect("second push");
    assert_eq!(frame.scheduled_ms, 20_000);
    assert_eq!(rig.node.context().scheduler.last_fire_ms, Some(20_000));
    assert_eq!(rig.bus.values().len(), 8);
    assert_eq!(
        rig.sink.count(|e| matches!(e, NodeEvent::FeedbackExpired)),
        2
    );
}

#[test]
fn late_cycles_do_not_drift_the_grid() {
    let mut rig = Rig::started();
    rig.cycle(1);

    // The loop stalls and comes back late; the next slot stays on the grid.
    let frame = rig.cycle(10_730).telemetry.unwrap();
    assert_eq!(frame.scheduled_ms, 10_000);
    assert!(rig.cycle(19_999).telemetry.is_none());
    assert_eq!(rig.cycle(20_000).telemetry.unwrap().scheduled_ms, 20_000);
}

#[test]
fn sensor_fault_is_pushed_as_nan() {
    let mut rig = Rig::started();
    rig.hw.humidity = f32::NAN;
    rig.cycle(10_000);

    let values = rig.bus.values();
    assert_eq!(values.len(), 4);
    assert!(values[2].1.is_nan());
    assert_eq!(values[3].1, 180.0, "later quantities are still pushed");
}

// ── Inbound telegrams ─────────────────────────────────────────

#[test]
fn read_request_is_answered_with_fresh_sample() {
    let mut rig = Rig::started();
    rig.cycle(0);
    rig.hw.clear_calls();
    rig.bus.sent.clear();
    rig.hw.temperature = 23.5;

    rig.bus.inject(Telegram::group_read(peer(), ga("10/1/2")));
    let report = rig.cycle(1);

    assert_eq!(rig.hw.reads(), vec![Quantity::Temperature]);
    assert_eq!(
        rig.bus.sent,
        vec![BusCall::Answer {
            address: ga("10/1/2"),
            value: 23.5,
        }]
    );
    assert!(matches!(
        report.dispatch,
        Some(DispatchOutcome::Answered {
            quantity: Quantity::Temperature,
            ..
        })
    ));
    assert!(
        !rig.hw.calls.iter().any(|c| matches!(c, HwCall::SetAll(_))),
        "read answers do not flash"
    );
}

#[test]
fn humidity_read_is_answered_on_the_shared_address() {
    let mut rig = Rig::started();
    rig.cycle(0);
    rig.bus.sent.clear();

    rig.bus.inject(Telegram::group_read(peer(), ga("10/1/3")));
    rig.cycle(1);

    assert_eq!(
        rig.bus.sent,
        vec![BusCall::Answer {
            address: ga("10/1/3"),
            value: 41.5,
        }]
    );
}

#[test]
fn write_switches_output_and_updates_context() {
    let mut rig = Rig::started();

    rig.bus
        .inject(Telegram::group_write_bool(peer(), ga("10/1/12"), true));
    let report = rig.cycle(0);

    assert_eq!(
        report.dispatch,
        Some(DispatchOutcome::Switched {
            address: ga("10/1/12"),
            channel: OutputChannel::Yellow,
            on: true,
        })
    );
    assert_eq!(rig.hw.output(OutputChannel::Yellow), Some(true));
    assert!(rig.node.context().outputs.get(OutputChannel::Yellow));
    assert!(!rig.node.context().outputs.get(OutputChannel::Green));

    rig.bus
        .inject(Telegram::group_write_bool(peer(), ga("10/1/12"), false));
    rig.cycle(1);
    assert_eq!(rig.hw.output(OutputChannel::Yellow), Some(false));
}

#[test]
fn foreign_telegram_has_no_effect_and_no_event() {
    let mut rig = Rig::started();
    rig.cycle(0);
    rig.hw.clear_calls();
    rig.bus.sent.clear();
    let events_before = rig.sink.events.len();

    rig.bus.inject(Telegram::group_read(peer(), ga("3/3/3")));
    let report = rig.cycle(1);

    assert_eq!(
        report.dispatch,
        Some(DispatchOutcome::Ignored(IgnoreReason::NotListening))
    );
    assert!(rig.hw.calls.is_empty());
    assert!(rig.bus.sent.is_empty());
    assert_eq!(rig.sink.events.len(), events_before);
}

#[test]
fn write_to_measurement_address_is_reported() {
    let mut rig = Rig::started();
    rig.bus
        .inject(Telegram::group_write_bool(peer(), ga("10/1/1"), true));
    let report = rig.cycle(0);

    assert_eq!(
        report.dispatch,
        Some(DispatchOutcome::Ignored(IgnoreReason::NoHandler))
    );
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        NodeEvent::TelegramIgnored {
            reason: IgnoreReason::NoHandler,
            ..
        }
    )));
}

#[test]
fn one_telegram_per_cycle() {
    let mut rig = Rig::started();
    rig.bus
        .inject(Telegram::group_write_bool(peer(), ga("10/1/11"), true));
    rig.bus
        .inject(Telegram::group_write_bool(peer(), ga("10/1/13"), true));

    rig.cycle(0);
    assert!(rig.node.context().outputs.get(OutputChannel::Green));
    assert!(!rig.node.context().outputs.get(OutputChannel::Red));
    assert_eq!(rig.bus.inbound.len(), 1);

    rig.cycle(1);
    assert!(rig.node.context().outputs.get(OutputChannel::Red));
}

#[test]
fn telemetry_goes_out_before_the_answer() {
    let mut rig = Rig::started();
    rig.bus.inject(Telegram::group_read(peer(), ga("10/1/4")));
    rig.cycle(10_000);

    assert_eq!(rig.bus.sent.len(), 5);
    assert!(rig.bus.sent[..4]
        .iter()
        .all(|c| matches!(c, BusCall::Value { .. })));
    assert!(matches!(rig.bus.sent[4], BusCall::Answer { .. }));
}

// ── Button ────────────────────────────────────────────────────

#[test]
fn button_press_publishes_once_per_press() {
    let mut rig = Rig::started();
    rig.cycle(0);

    rig.pin.press();
    assert!(!rig.cycle(100).button_pressed, "bounce window not elapsed");
    assert!(rig.cycle(125).button_pressed);

    // Held down: no repeats.
    for t in (150..2_000).step_by(50) {
        assert!(!rig.cycle(t).button_pressed);
    }

    rig.pin.release();
    rig.cycle(2_000);
    assert!(!rig.cycle(2_025).button_pressed, "release is not published");

    rig.pin.press();
    rig.cycle(2_100);
    assert!(rig.cycle(2_125).button_pressed);

    assert_eq!(
        rig.bus.bools(),
        vec![(ga("10/1/3"), true), (ga("10/1/3"), true)]
    );
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, NodeEvent::ButtonPressed { .. })),
        2
    );
}

#[test]
fn short_glitch_is_not_a_press() {
    let mut rig = Rig::started();
    rig.cycle(0);

    rig.pin.press();
    rig.cycle(100);
    rig.pin.release();
    rig.cycle(110);
    rig.cycle(200);

    assert!(rig.bus.bools().is_empty());
}

#[test]
fn cycle_count_advances() {
    let mut rig = Rig::started();
    for t in 0..5 {
        rig.cycle(t);
    }
    assert_eq!(rig.node.cycle_count(), 5);
}

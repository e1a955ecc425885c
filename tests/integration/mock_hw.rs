//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without touching real GPIO, UART or RMT peripherals.

use std::cell::Cell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};
use multisensor::app::events::NodeEvent;
use multisensor::app::ports::{
    BusPort, EventSink, IndicatorPort, MeasurementPort, OutputChannel, OutputPort, Quantity, Rgb,
};
use multisensor::knx::address::GroupAddress;
use multisensor::knx::telegram::Telegram;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HwCall {
    Read(Quantity),
    SetOutput { channel: OutputChannel, on: bool },
    SetAll(Rgb),
    Show,
    Clear,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub co2: f32,
    pub temperature: f32,
    pub humidity: f32,
    pub brightness: f32,
    staged: Rgb,
    shown: Rgb,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            co2: 612.0,
            temperature: 22.25,
            humidity: 41.5,
            brightness: 180.0,
            staged: (0, 0, 0),
            shown: (0, 0, 0),
        }
    }

    /// Colour currently latched onto the strip.
    pub fn lit(&self) -> Rgb {
        self.shown
    }

    /// Last level written to `channel`, or `None` if never written.
    pub fn output(&self, channel: OutputChannel) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::SetOutput { channel: ch, on } if *ch == channel => Some(*on),
            _ => None,
        })
    }

    pub fn reads(&self) -> Vec<Quantity> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Read(q) => Some(*q),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementPort for MockHardware {
    fn read(&mut self, quantity: Quantity) -> f32 {
        self.calls.push(HwCall::Read(quantity));
        match quantity {
            Quantity::Co2 => self.co2,
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
            Quantity::Brightness => self.brightness,
        }
    }
}

impl OutputPort for MockHardware {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        self.calls.push(HwCall::SetOutput { channel, on });
    }
}

impl IndicatorPort for MockHardware {
    fn set_all(&mut self, colour: Rgb) {
        self.calls.push(HwCall::SetAll(colour));
        self.staged = colour;
    }

    fn show(&mut self) {
        self.calls.push(HwCall::Show);
        self.shown = self.staged;
    }

    fn clear(&mut self) {
        self.calls.push(HwCall::Clear);
        self.staged = (0, 0, 0);
    }
}

// ── MockBus ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BusCall {
    Value { address: GroupAddress, value: f32 },
    Answer { address: GroupAddress, value: f32 },
    Bool { address: GroupAddress, value: bool },
}

#[derive(Default)]
pub struct MockBus {
    pub sent: Vec<BusCall>,
    pub inbound: VecDeque<Telegram>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, telegram: Telegram) {
        self.inbound.push_back(telegram);
    }

    pub fn values(&self) -> Vec<(GroupAddress, f32)> {
        self.sent
            .iter()
            .filter_map(|c| match c {
                BusCall::Value { address, value } => Some((*address, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn bools(&self) -> Vec<(GroupAddress, bool)> {
        self.sent
            .iter()
            .filter_map(|c| match c {
                BusCall::Bool { address, value } => Some((*address, *value)),
                _ => None,
            })
            .collect()
    }
}

impl BusPort for MockBus {
    fn send_value(&mut self, address: GroupAddress, value: f32) {
        self.sent.push(BusCall::Value { address, value });
    }

    fn answer_value(&mut self, address: GroupAddress, value: f32) {
        self.sent.push(BusCall::Answer { address, value });
    }

    fn send_bool(&mut self, address: GroupAddress, value: bool) {
        self.sent.push(BusCall::Bool { address, value });
    }

    fn poll_frame(&mut self) -> Option<Telegram> {
        self.inbound.pop_front()
    }
}

// ── Button pin ────────────────────────────────────────────────

/// Input pin whose level the test flips through a shared handle.
/// Feeds the real `Debouncer`, so button tests cover the driver too.
#[derive(Clone)]
pub struct SharedPin {
    level: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl SharedPin {
    /// Idle high (pull-up, button released).
    pub fn released() -> Self {
        Self {
            level: Rc::new(Cell::new(true)),
        }
    }

    pub fn press(&self) {
        self.level.set(false);
    }

    pub fn release(&self) {
        self.level.set(true);
    }
}

impl ErrorType for SharedPin {
    type Error = Infallible;
}

impl InputPin for SharedPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.level.get())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<NodeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&NodeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(*event);
    }
}

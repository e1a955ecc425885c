//! Port traits: the hexagonal boundary between the node core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (core)
//! ```
//!
//! Driven adapters (sensors, outputs, pixels, bus, clock, event sink)
//! implement these traits.  The [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the core never touches hardware directly
//! and every cycle can be driven from a test with mock ports.
//!
//! Every port call returns within microseconds: nothing here may block on
//! I/O beyond a single bounded peripheral transaction.

use crate::knx::address::GroupAddress;
use crate::knx::telegram::Telegram;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

// ───────────────────────────────────────────────────────────────
// Measurement port (driven adapter: sensors → core)
// ───────────────────────────────────────────────────────────────

/// The four physical quantities this node publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// CO2 concentration (ppm).
    Co2,
    /// Air temperature (°C).
    Temperature,
    /// Relative humidity (%).
    Humidity,
    /// Illuminance (lux).
    Brightness,
}

impl Quantity {
    /// Fixed telemetry order.
    pub const ALL: [Self; 4] = [Self::Co2, Self::Temperature, Self::Humidity, Self::Brightness];

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Co2 => "ppm",
            Self::Temperature => "\u{00b0}C",
            Self::Humidity => "%RH",
            Self::Brightness => "lx",
        }
    }
}

/// Synchronous measurement source.
pub trait MeasurementPort {
    /// Read one quantity.  A hardware fault yields `NaN`, never a panic.
    fn read(&mut self, quantity: Quantity) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: core → indicator GPIOs)
// ───────────────────────────────────────────────────────────────

/// The three bus-switchable indicator outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputChannel {
    Green,
    Yellow,
    Red,
}

impl OutputChannel {
    pub const ALL: [Self; 3] = [Self::Green, Self::Yellow, Self::Red];

    pub const fn index(self) -> usize {
        match self {
            Self::Green => 0,
            Self::Yellow => 1,
            Self::Red => 2,
        }
    }
}

/// Write-side port for the indicator outputs.
pub trait OutputPort {
    /// Drive `channel` high (`true`) or low.  Takes effect immediately.
    fn set_output(&mut self, channel: OutputChannel, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: core → addressable LEDs)
// ───────────────────────────────────────────────────────────────

/// Rendering sink for the RGB feedback pixels.  No timing of its own.
pub trait IndicatorPort {
    /// Stage `colour` on every pixel.
    fn set_all(&mut self, colour: Rgb);

    /// Latch the staged frame onto the LEDs.
    fn show(&mut self);

    /// Stage all pixels off.
    fn clear(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Button port (driven adapter: debounced input → core)
// ───────────────────────────────────────────────────────────────

/// A stable level transition reported by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// High → low (press on an active-low button).
    Fell,
    /// Low → high (release).
    Rose,
}

/// Debounced digital input, sampled once per cycle.
pub trait ButtonPort {
    /// Sample the raw level at `now_ms` and report a stable edge, if one
    /// completed on this sample.
    fn sample(&mut self, now_ms: u64) -> Option<Edge>;
}

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: core ↔ field bus)
// ───────────────────────────────────────────────────────────────

/// Field-bus transport.  Outbound calls are fire-and-forget.
pub trait BusPort {
    /// GroupValueWrite a DPT 9 float (telemetry push).
    fn send_value(&mut self, address: GroupAddress, value: f32);

    /// GroupValueResponse a DPT 9 float (answer to a read).
    fn answer_value(&mut self, address: GroupAddress, value: f32);

    /// GroupValueWrite a DPT 1 boolean.
    fn send_bool(&mut self, address: GroupAddress, value: bool);

    /// Return the next complete inbound telegram, if one is available.
    /// Never blocks.
    fn poll_frame(&mut self) -> Option<Telegram>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`NodeEvent`](super::events::NodeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::NodeEvent);
}

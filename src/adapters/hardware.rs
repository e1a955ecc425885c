//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the indicator outputs and the pixel strip,
//! exposing them through [`MeasurementPort`], [`OutputPort`] and
//! [`IndicatorPort`].  One value implementing all three lets the node
//! service hand a single `&mut` to the scheduler and the dispatcher.

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::app::ports::{IndicatorPort, MeasurementPort, OutputChannel, OutputPort, Quantity, Rgb};
use crate::drivers::outputs::IndicatorOutputs;
use crate::drivers::pixels::{PixelStrip, PixelWriter};
use crate::knx::link::ByteLink;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all node hardware behind port traits.
pub struct HardwareAdapter<I2C, L: ByteLink, P, W> {
    sensor_hub: SensorHub<I2C, L>,
    outputs: IndicatorOutputs<P>,
    pixels: PixelStrip<W>,
}

impl<I2C, L, P, W> HardwareAdapter<I2C, L, P, W>
where
    I2C: I2c,
    L: ByteLink,
    P: OutputPin,
    W: PixelWriter,
{
    pub fn new(
        sensor_hub: SensorHub<I2C, L>,
        outputs: IndicatorOutputs<P>,
        pixels: PixelStrip<W>,
    ) -> Self {
        Self {
            sensor_hub,
            outputs,
            pixels,
        }
    }

    pub fn outputs(&self) -> &IndicatorOutputs<P> {
        &self.outputs
    }

    pub fn pixels(&self) -> &PixelStrip<W> {
        &self.pixels
    }
}

// ── MeasurementPort implementation ────────────────────────────

impl<I2C: I2c, L: ByteLink, P, W> MeasurementPort for HardwareAdapter<I2C, L, P, W> {
    fn read(&mut self, quantity: Quantity) -> f32 {
        self.sensor_hub.read(quantity)
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<I2C, L: ByteLink, P: OutputPin, W> OutputPort for HardwareAdapter<I2C, L, P, W> {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        self.outputs.set_output(channel, on);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<I2C, L: ByteLink, P, W: PixelWriter> IndicatorPort for HardwareAdapter<I2C, L, P, W> {
    fn set_all(&mut self, colour: Rgb) {
        self.pixels.set_all(colour);
    }

    fn show(&mut self) {
        self.pixels.show();
    }

    fn clear(&mut self) {
        self.pixels.clear();
    }
}

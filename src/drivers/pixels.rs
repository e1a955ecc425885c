//! WS2812B feedback strip.
//!
//! [`PixelStrip`] keeps a staged frame and hands it to a [`PixelWriter`]
//! on `show()`.  The strip has no timing of its own; the feedback timer
//! decides when to light and clear it.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`Ws2812Rmt`] clocks the frame out through an RMT channel.
//! On host/test: any in-memory writer.

use log::warn;

use crate::app::ports::{IndicatorPort, Rgb};
use crate::config::MAX_PIXELS;

const OFF: Rgb = (0, 0, 0);

/// Sends a full frame to the LEDs.
pub trait PixelWriter {
    type Error: core::fmt::Debug;

    fn write(&mut self, pixels: &[Rgb]) -> Result<(), Self::Error>;
}

pub struct PixelStrip<W> {
    writer: W,
    frame: [Rgb; MAX_PIXELS as usize],
    count: usize,
    write_errors: u32,
}

impl<W: PixelWriter> PixelStrip<W> {
    /// `count` is clamped to `1..=MAX_PIXELS`.
    pub fn new(writer: W, count: u8) -> Self {
        Self {
            writer,
            frame: [OFF; MAX_PIXELS as usize],
            count: usize::from(count.clamp(1, MAX_PIXELS)),
            write_errors: 0,
        }
    }

    /// Staged frame (not necessarily shown yet).
    pub fn frame(&self) -> &[Rgb] {
        &self.frame[..self.count]
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: PixelWriter> IndicatorPort for PixelStrip<W> {
    fn set_all(&mut self, colour: Rgb) {
        self.frame[..self.count].fill(colour);
    }

    fn show(&mut self) {
        if let Err(e) = self.writer.write(&self.frame[..self.count]) {
            self.write_errors = self.write_errors.wrapping_add(1);
            warn!("pixels: write failed: {:?}", e);
        }
    }

    fn clear(&mut self) {
        self.frame[..self.count].fill(OFF);
    }
}

// ── ESP-IDF RMT writer ────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use rmt::Ws2812Rmt;

#[cfg(target_os = "espidf")]
mod rmt {
    use core::time::Duration;

    use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, TxRmtDriver};
    use esp_idf_hal::sys::EspError;

    use super::{PixelWriter, Rgb};
    use crate::config::MAX_PIXELS;

    const BITS_PER_PIXEL: usize = 24;
    const MAX_BITS: usize = BITS_PER_PIXEL * MAX_PIXELS as usize;

    /// WS2812B bit timings (T0H, T0L, T1H, T1L) in nanoseconds.
    const T0H_NS: u64 = 350;
    const T0L_NS: u64 = 800;
    const T1H_NS: u64 = 700;
    const T1L_NS: u64 = 600;

    pub struct Ws2812Rmt<'d> {
        tx: TxRmtDriver<'d>,
        zero: (Pulse, Pulse),
        one: (Pulse, Pulse),
    }

    impl<'d> Ws2812Rmt<'d> {
        pub fn new(tx: TxRmtDriver<'d>) -> Result<Self, EspError> {
            let hz = tx.counter_clock()?;
            let pulse = |state: PinState, ns: u64| {
                Pulse::new_with_duration(hz, state, &Duration::from_nanos(ns))
            };
            Ok(Self {
                zero: (pulse(PinState::High, T0H_NS)?, pulse(PinState::Low, T0L_NS)?),
                one: (pulse(PinState::High, T1H_NS)?, pulse(PinState::Low, T1L_NS)?),
                tx,
            })
        }
    }

    impl PixelWriter for Ws2812Rmt<'_> {
        type Error = EspError;

        fn write(&mut self, pixels: &[Rgb]) -> Result<(), EspError> {
            let mut signal = FixedLengthSignal::<MAX_BITS>::new();
            for (p, &(r, g, b)) in pixels.iter().take(MAX_PIXELS as usize).enumerate() {
                // Wire order is GRB, MSB first.
                let grb = (u32::from(g) << 16) | (u32::from(r) << 8) | u32::from(b);
                for bit in 0..BITS_PER_PIXEL {
                    let set = grb & (1 << (BITS_PER_PIXEL - 1 - bit)) != 0;
                    let pair = if set { &self.one } else { &self.zero };
                    signal.set(p * BITS_PER_PIXEL + bit, pair)?;
                }
            }
            self.tx.start_blocking(&signal)
        }
    }
}

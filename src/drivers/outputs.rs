//! Green / yellow / red indicator outputs.
//!
//! Three push-pull GPIOs, active HIGH.  Switched only by bus WRITE
//! telegrams (and forced low at start).

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::{OutputChannel, OutputPort};

pub struct IndicatorOutputs<P> {
    /// Indexed by [`OutputChannel::index`].
    pins: [P; 3],
    levels: [bool; 3],
    write_errors: u32,
}

impl<P: OutputPin> IndicatorOutputs<P> {
    pub fn new(green: P, yellow: P, red: P) -> Self {
        Self {
            pins: [green, yellow, red],
            levels: [false; 3],
            write_errors: 0,
        }
    }

    /// Last level successfully driven on `channel`.
    pub fn level(&self, channel: OutputChannel) -> bool {
        self.levels[channel.index()]
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }
}

impl<P: OutputPin> OutputPort for IndicatorOutputs<P> {
    fn set_output(&mut self, channel: OutputChannel, on: bool) {
        let i = channel.index();
        let result = if on {
            self.pins[i].set_high()
        } else {
            self.pins[i].set_low()
        };
        match result {
            Ok(()) => self.levels[i] = on,
            Err(e) => {
                self.write_errors = self.write_errors.wrapping_add(1);
                warn!("outputs: {:?} write failed: {:?}", channel, e.kind());
            }
        }
    }
}

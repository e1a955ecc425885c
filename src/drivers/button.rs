//! Polled button debouncer.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The main loop samples the
//! pin once per cycle; no interrupt is involved.
//!
//! ## Debounce rule
//!
//! A raw level becomes the stable level once it has been held, without
//! change, for the settle interval.  Every raw change restarts the
//! interval, so contact bounce shorter than it never produces an edge.
//!
//! ```text
//!  raw    ‾‾‾‾|_|‾|__________________|‾‾‾‾‾
//!  stable ‾‾‾‾‾‾‾‾‾‾‾‾‾‾|____________‾‾‾‾‾‾‾‾‾‾   (after 25 ms quiet)
//!                       ^ Fell                   ^ Rose
//! ```

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::app::ports::{ButtonPort, Edge};

pub struct Debouncer<P> {
    pin: P,
    settle_ms: u64,
    stable_high: bool,
    candidate_high: bool,
    changed_at_ms: u64,
    read_errors: u32,
}

impl<P: InputPin> Debouncer<P> {
    /// Take the current level as the initial stable state (idle high if
    /// the pin cannot be read).
    pub fn new(mut pin: P, settle_ms: u32) -> Self {
        let level = pin.is_high().unwrap_or(true);
        Self {
            pin,
            settle_ms: u64::from(settle_ms),
            stable_high: level,
            candidate_high: level,
            changed_at_ms: 0,
            read_errors: 0,
        }
    }

    /// Debounced level; `true` = released.
    pub fn is_high(&self) -> bool {
        self.stable_high
    }

    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: InputPin> ButtonPort for Debouncer<P> {
    fn sample(&mut self, now_ms: u64) -> Option<Edge> {
        let raw = match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                self.read_errors = self.read_errors.wrapping_add(1);
                warn!("button: read failed: {:?}", e.kind());
                return None;
            }
        };

        if raw != self.candidate_high {
            self.candidate_high = raw;
            self.changed_at_ms = now_ms;
            return None;
        }

        if raw != self.stable_high && now_ms.saturating_sub(self.changed_at_ms) >= self.settle_ms {
            self.stable_high = raw;
            return Some(if raw { Edge::Rose } else { Edge::Fell });
        }
        None
    }
}

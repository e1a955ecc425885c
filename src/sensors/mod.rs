//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and answers one [`Quantity`] at a
//! time.  Driver faults never escape: they are logged and turned into
//! `NaN`, which the bus codec sends as the DPT 9 "invalid" value.

pub mod htu21d;
pub mod ldr;
pub mod mhz19;

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::app::ports::Quantity;
use crate::error::SensorError;
use crate::knx::link::ByteLink;
use htu21d::Htu21d;
use ldr::LdrSensor;
use mhz19::Mhz19;

/// Aggregates all sensor drivers.
pub struct SensorHub<I2C, L: ByteLink> {
    pub climate: Htu21d<I2C>,
    pub co2: Mhz19<L>,
    pub light: LdrSensor,
}

impl<I2C: I2c, L: ByteLink> SensorHub<I2C, L> {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(climate: Htu21d<I2C>, co2: Mhz19<L>, light: LdrSensor) -> Self {
        Self { climate, co2, light }
    }

    /// Read one quantity from its driver.
    pub fn try_read(&mut self, quantity: Quantity) -> Result<f32, SensorError> {
        match quantity {
            Quantity::Co2 => self.co2.read_ppm().map(f32::from),
            Quantity::Temperature => self.climate.temperature(),
            Quantity::Humidity => self.climate.humidity(),
            Quantity::Brightness => self.light.read().map(|r| r.lux),
        }
    }

    /// Read one quantity; a fault yields `NaN`.
    pub fn read(&mut self, quantity: Quantity) -> f32 {
        match self.try_read(quantity) {
            Ok(value) => {
                debug!("{:?}: {:.2} {}", quantity, value, quantity.unit());
                value
            }
            Err(e) => {
                warn!("{:?}: {}", quantity, e);
                f32::NAN
            }
        }
    }
}

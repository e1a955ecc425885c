//! GL5516 light-dependent resistor brightness sensor.
//!
//! The LDR sits on the supply side of a divider with a fixed 1 kOhm
//! resistor to ground, read through the ESP32-S3 ADC.  Resistance maps to
//! illuminance with the GL5516 power law `lux = 29 634 400 / R^1.6689`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the LDR channel via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

static SIM_LDR_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ldr_adc(raw: u16) {
    SIM_LDR_ADC.store(raw, Ordering::Relaxed);
}

const R_FIXED: f32 = 1_000.0;
const ADC_MAX: u16 = 4095;
const GL5516_MULT: f32 = 29_634_400.0;
const GL5516_POW: f32 = 1.6689;

/// Illuminance for one raw ADC sample.
///
/// A zero reading means the LDR is effectively open (darkness).  A
/// full-scale reading means a shorted LDR and is rejected.
pub fn raw_to_lux(raw: u16) -> Result<f32, SensorError> {
    if raw == 0 {
        return Ok(0.0);
    }
    if raw >= ADC_MAX {
        return Err(SensorError::OutOfRange);
    }
    let r_ldr = R_FIXED * f32::from(ADC_MAX - raw) / f32::from(raw);
    Ok(GL5516_MULT / r_ldr.powf(GL5516_POW))
}

#[derive(Debug, Clone, Copy)]
pub struct LdrReading {
    pub raw: u16,
    pub lux: f32,
}

pub struct LdrSensor {
    _adc_gpio: i32,
}

impl LdrSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    pub fn read(&self) -> Result<LdrReading, SensorError> {
        let raw = self.read_adc()?;
        Ok(LdrReading {
            raw,
            lux: raw_to_lux(raw)?,
        })
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(hw_init::ADC1_CH_LDR).ok_or(SensorError::OutOfRange)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(SIM_LDR_ADC.load(Ordering::Relaxed))
    }
}

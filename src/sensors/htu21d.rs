//! HTU21D temperature / relative-humidity sensor on I2C.
//!
//! Measurements use "hold master" mode: the sensor stretches SCL until the
//! conversion is done (≤ 50 ms for 14-bit temperature), so one
//! `write_read` per quantity is the whole transaction.
//!
//! Every reply is two data bytes (status bits in the low two) plus a CRC-8
//! over polynomial x⁸ + x⁵ + x⁴ + 1 (0x131).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::error::SensorError;

pub const ADDRESS: u8 = 0x40;

const CMD_TRIGGER_TEMP_HOLD: u8 = 0xE3;
const CMD_TRIGGER_HUMIDITY_HOLD: u8 = 0xE5;
const CMD_READ_USER_REG: u8 = 0xE7;
const CMD_SOFT_RESET: u8 = 0xFE;

/// User register contents after a soft reset.
const USER_REG_DEFAULT: u8 = 0x02;
const RESET_TIME_MS: u32 = 15;
const STATUS_MASK: u16 = 0xFFFC;

/// CRC-8, polynomial 0x131, init 0.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x31 } else { crc << 1 };
        }
    }
    crc
}

pub struct Htu21d<I2C> {
    i2c: I2C,
    present: bool,
}

impl<I2C: I2c> Htu21d<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, present: false }
    }

    /// Soft-reset and verify the user register.
    ///
    /// A failure leaves the driver usable; every later read simply retries
    /// the bus.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.i2c
            .write(ADDRESS, &[CMD_SOFT_RESET])
            .map_err(|_| SensorError::I2c)?;
        delay.delay_ms(RESET_TIME_MS);

        let mut reg = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[CMD_READ_USER_REG], &mut reg)
            .map_err(|_| SensorError::I2c)?;
        if reg[0] != USER_REG_DEFAULT {
            warn!("htu21d: unexpected user register 0x{:02X}", reg[0]);
            return Err(SensorError::NotFound);
        }

        self.present = true;
        info!("htu21d: ready at 0x{:02X}", ADDRESS);
        Ok(())
    }

    /// Whether `init` found the device.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Air temperature in °C.
    pub fn temperature(&mut self) -> Result<f32, SensorError> {
        let raw = self.measure(CMD_TRIGGER_TEMP_HOLD)?;
        Ok(-46.85 + 175.72 * f32::from(raw) / 65_536.0)
    }

    /// Relative humidity in %.
    pub fn humidity(&mut self) -> Result<f32, SensorError> {
        let raw = self.measure(CMD_TRIGGER_HUMIDITY_HOLD)?;
        Ok(-6.0 + 125.0 * f32::from(raw) / 65_536.0)
    }

    fn measure(&mut self, command: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(ADDRESS, &[command], &mut buf)
            .map_err(|_| SensorError::I2c)?;
        if crc8(&buf[..2]) != buf[2] {
            return Err(SensorError::Checksum);
        }
        Ok(u16::from_be_bytes([buf[0], buf[1]]) & STATUS_MASK)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

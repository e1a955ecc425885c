//! Unified error types for the multisensor firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping
//! bring-up error handling uniform.  All variants are `Copy` so they can be
//! passed around the cooperative loop without allocation.  Nothing in this
//! module is fatal once the main loop runs: callers log and carry on.

use core::fmt;

use crate::knx::address::GroupAddress;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// The bus link failed.
    Bus(BusError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transaction failed (NACK, arbitration loss, timeout).
    I2c,
    /// UART exchange failed or timed out.
    Uart,
    /// Response checksum / CRC mismatch.
    Checksum,
    /// Device did not identify as expected.
    NotFound,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c => write!(f, "I2C transaction failed"),
            Self::Uart => write!(f, "UART exchange failed"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::NotFound => write!(f, "sensor not found"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Telegram does not fit a standard frame.
    FrameTooLong,
    /// Listen table has no free slot.
    ListenTableFull,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooLong => write!(f, "frame too long"),
            Self::ListenTableFull => write!(f, "listen table full"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` names the field and the rule.
    ValidationFailed(&'static str),
    /// Two datapoints share one group address and the policy rejects it.
    AddressCollision {
        address: GroupAddress,
        first: &'static str,
        second: &'static str,
    },
    /// The route table has no free slot.
    TooManyRoutes,
    /// The JSON document is malformed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::AddressCollision { address, first, second } => {
                write!(f, "{first} and {second} share group address {address}")
            }
            Self::TooManyRoutes => write!(f, "route table full"),
            Self::Malformed => write!(f, "malformed config document"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

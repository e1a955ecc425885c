//! Node configuration.
//!
//! All tunable parameters of the node, fixed at build time.  The shipped
//! values live in `config/node.json` and mirror [`NodeConfig::default`];
//! the group addresses there are the bus wire contract and must match the
//! ETS project of the installation.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::app::ports::{OutputChannel, Quantity, Rgb};
use crate::error::ConfigError;
use crate::knx::address::{GroupAddress, IndividualAddress};

/// Most pixels the feedback strip can address.
pub const MAX_PIXELS: u8 = 8;

/// Build-time configuration document.
pub const NODE_CONFIG_JSON: &str = include_str!("../config/node.json");

/// What to do when two datapoints share one group address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Log every collision at start and keep going (first route wins).
    Warn,
    /// Refuse to start.
    Reject,
}

/// Group address of every exposed datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMap {
    pub co2: GroupAddress,
    pub temperature: GroupAddress,
    pub humidity: GroupAddress,
    pub brightness: GroupAddress,
    pub led_green: GroupAddress,
    pub led_yellow: GroupAddress,
    pub led_red: GroupAddress,
    pub button: GroupAddress,
}

/// Named datapoint, used for collision reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datapoint {
    Measurement(Quantity),
    Output(OutputChannel),
    Button,
}

impl Datapoint {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Measurement(Quantity::Co2) => "co2",
            Self::Measurement(Quantity::Temperature) => "temperature",
            Self::Measurement(Quantity::Humidity) => "humidity",
            Self::Measurement(Quantity::Brightness) => "brightness",
            Self::Output(OutputChannel::Green) => "led_green",
            Self::Output(OutputChannel::Yellow) => "led_yellow",
            Self::Output(OutputChannel::Red) => "led_red",
            Self::Button => "button",
        }
    }
}

/// Two datapoints that share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub address: GroupAddress,
    pub first: Datapoint,
    pub second: Datapoint,
}

impl GroupMap {
    pub const fn measurement(&self, quantity: Quantity) -> GroupAddress {
        match quantity {
            Quantity::Co2 => self.co2,
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
            Quantity::Brightness => self.brightness,
        }
    }

    pub const fn output(&self, channel: OutputChannel) -> GroupAddress {
        match channel {
            OutputChannel::Green => self.led_green,
            OutputChannel::Yellow => self.led_yellow,
            OutputChannel::Red => self.led_red,
        }
    }

    /// Every datapoint with its address, in registration order.
    pub fn datapoints(&self) -> [(Datapoint, GroupAddress); 8] {
        [
            (Datapoint::Measurement(Quantity::Co2), self.co2),
            (Datapoint::Measurement(Quantity::Temperature), self.temperature),
            (Datapoint::Measurement(Quantity::Humidity), self.humidity),
            (Datapoint::Measurement(Quantity::Brightness), self.brightness),
            (Datapoint::Output(OutputChannel::Green), self.led_green),
            (Datapoint::Output(OutputChannel::Yellow), self.led_yellow),
            (Datapoint::Output(OutputChannel::Red), self.led_red),
            (Datapoint::Button, self.button),
        ]
    }

    /// Every pair of datapoints sharing an address, in registration order.
    pub fn collisions(&self) -> Vec<Collision, 28> {
        let points = self.datapoints();
        let mut out = Vec::new();
        for (i, (first, addr)) in points.iter().enumerate() {
            for (second, other) in &points[i + 1..] {
                if addr == other {
                    // 8 choose 2 = 28 slots, never full.
                    let _ = out.push(Collision {
                        address: *addr,
                        first: *first,
                        second: *second,
                    });
                }
            }
        }
        out
    }
}

/// Core node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Identity ---
    /// The node's own bus address.
    pub physical_address: IndividualAddress,
    /// Datapoint → group address map.
    pub groups: GroupMap,
    /// Handling of shared group addresses.
    pub collision_policy: CollisionPolicy,

    // --- Telemetry ---
    /// Period of the measurement push (milliseconds).
    pub telemetry_interval_ms: u32,
    /// Liveness flash after each push (milliseconds).
    pub telemetry_flash_ms: u32,
    pub telemetry_flash_colour: Rgb,

    // --- Feedback strip ---
    /// Flash shown once at start (milliseconds).
    pub boot_flash_ms: u32,
    pub boot_flash_colour: Rgb,
    /// Pixels lit by the feedback flash.
    pub pixel_count: u8,

    // --- Inputs / sensors ---
    /// Button settle interval (milliseconds).
    pub debounce_ms: u32,
    /// MH-Z19 automatic baseline calibration.
    pub co2_auto_calibration: bool,
}

fn ga(main: u8, middle: u8, sub: u8) -> GroupAddress {
    GroupAddress::from_raw((u16::from(main) << 11) | (u16::from(middle) << 8) | u16::from(sub))
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            physical_address: IndividualAddress::from_raw(0x1119), // 1.1.25
            groups: GroupMap {
                co2: ga(10, 1, 1),
                temperature: ga(10, 1, 2),
                humidity: ga(10, 1, 3),
                brightness: ga(10, 1, 4),
                led_green: ga(10, 1, 11),
                led_yellow: ga(10, 1, 12),
                led_red: ga(10, 1, 13),
                // Shares the humidity address in the installed ETS project.
                button: ga(10, 1, 3),
            },
            collision_policy: CollisionPolicy::Warn,

            telemetry_interval_ms: 10_000,
            telemetry_flash_ms: 500,
            telemetry_flash_colour: (0, 0, 150),

            boot_flash_ms: 1_000,
            boot_flash_colour: (0, 150, 0),
            pixel_count: 3,

            debounce_ms: 25,
            co2_auto_calibration: false,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON document.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(doc).map_err(|e| {
            log::warn!("config: {}", e);
            ConfigError::Malformed
        })
    }

    /// The embedded build-time configuration.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(NODE_CONFIG_JSON)
    }

    pub fn collisions(&self) -> Vec<Collision, 28> {
        self.groups.collisions()
    }

    /// Range checks plus the collision policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("telemetry_interval_ms must be > 0"));
        }
        if self.pixel_count == 0 || self.pixel_count > MAX_PIXELS {
            return Err(ConfigError::ValidationFailed("pixel_count must be 1..=8"));
        }
        if self.debounce_ms >= self.telemetry_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms must be shorter than telemetry_interval_ms",
            ));
        }

        if self.collision_policy == CollisionPolicy::Reject {
            if let Some(c) = self.collisions().first() {
                return Err(ConfigError::AddressCollision {
                    address: c.address,
                    first: c.first.name(),
                    second: c.second.name(),
                });
            }
        }
        Ok(())
    }
}

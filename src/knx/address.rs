//! KNX addressing: three-level group addresses and individual (device)
//! addresses.
//!
//! Both are small `Copy` value types compared structurally; there is no
//! string handling on the dispatch path.  The textual forms (`"10/1/4"` and
//! `"1.1.25"`) exist for configuration and logging only.
//!
//! ```text
//!  Group address       MMMM Mmmm  ssss ssss     main:5  middle:3  sub:8
//!  Individual address  AAAA LLLL  dddd dddd     area:4  line:4    device:8
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors from building or parsing an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// Wrong number of components or a non-numeric component.
    Malformed,
    /// A component exceeds its bit width.
    OutOfRange,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed address"),
            Self::OutOfRange => write!(f, "address component out of range"),
        }
    }
}

/// Split `s` on `sep` into exactly three numeric components.
fn parse_triplet(s: &str, sep: char) -> Result<[u16; 3], AddressError> {
    let mut out = [0u16; 3];
    let mut parts = s.trim().split(sep);
    for slot in &mut out {
        let part = parts.next().ok_or(AddressError::Malformed)?;
        *slot = part.parse().map_err(|_| AddressError::Malformed)?;
    }
    if parts.next().is_some() {
        return Err(AddressError::Malformed);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Group address
// ---------------------------------------------------------------------------

/// Three-level group address (`main/middle/sub`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupAddress {
    main: u8,
    middle: u8,
    sub: u8,
}

impl GroupAddress {
    pub const MAX_MAIN: u8 = 31;
    pub const MAX_MIDDLE: u8 = 7;

    pub const fn new(main: u8, middle: u8, sub: u8) -> Result<Self, AddressError> {
        if main > Self::MAX_MAIN || middle > Self::MAX_MIDDLE {
            return Err(AddressError::OutOfRange);
        }
        Ok(Self { main, middle, sub })
    }

    pub const fn main(self) -> u8 {
        self.main
    }

    pub const fn middle(self) -> u8 {
        self.middle
    }

    pub const fn sub(self) -> u8 {
        self.sub
    }

    /// 16-bit wire form.
    pub const fn to_raw(self) -> u16 {
        ((self.main as u16) << 11) | ((self.middle as u16) << 8) | self.sub as u16
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self {
            main: ((raw >> 11) & 0x1F) as u8,
            middle: ((raw >> 8) & 0x07) as u8,
            sub: (raw & 0xFF) as u8,
        }
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main, self.middle, self.sub)
    }
}

impl FromStr for GroupAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [main, middle, sub] = parse_triplet(s, '/')?;
        if main > u16::from(Self::MAX_MAIN) || middle > u16::from(Self::MAX_MIDDLE) || sub > 255 {
            return Err(AddressError::OutOfRange);
        }
        Self::new(main as u8, middle as u8, sub as u8)
    }
}

impl Serialize for GroupAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <&str>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Individual address
// ---------------------------------------------------------------------------

/// Device address (`area.line.device`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndividualAddress {
    area: u8,
    line: u8,
    device: u8,
}

impl IndividualAddress {
    pub const fn new(area: u8, line: u8, device: u8) -> Result<Self, AddressError> {
        if area > 15 || line > 15 {
            return Err(AddressError::OutOfRange);
        }
        Ok(Self { area, line, device })
    }

    pub const fn to_raw(self) -> u16 {
        ((self.area as u16) << 12) | ((self.line as u16) << 8) | self.device as u16
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self {
            area: ((raw >> 12) & 0x0F) as u8,
            line: ((raw >> 8) & 0x0F) as u8,
            device: (raw & 0xFF) as u8,
        }
    }
}

impl fmt::Display for IndividualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.area, self.line, self.device)
    }
}

impl FromStr for IndividualAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [area, line, device] = parse_triplet(s, '.')?;
        if area > 15 || line > 15 || device > 255 {
            return Err(AddressError::OutOfRange);
        }
        Self::new(area as u8, line as u8, device as u8)
    }
}

impl Serialize for IndividualAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IndividualAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <&str>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

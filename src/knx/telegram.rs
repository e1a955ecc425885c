//! KNX TP1 standard-frame telegrams (group communication only).
//!
//! Wire format:
//! ```text
//! ┌──────┬────────┬────────┬─────────────┬──────┬──────────────┬─────────┬──────┐
//! │ CTRL │ SOURCE │  DEST  │ AT|RC|LEN   │ TPCI │ APCI | data6 │ data... │ CHK  │
//! │ 0xBC │  2 B   │  2 B   │ 1 B         │ 1 B  │ 1 B          │ 0-13 B  │ 1 B  │
//! └──────┴────────┴────────┴─────────────┴──────┴──────────────┴─────────┴──────┘
//! ```
//!
//! `LEN` counts the TPDU bytes after TPCI, so a frame is `LEN + 8` bytes long.
//! The checksum is the inverted XOR of every preceding byte.

use core::fmt;

use heapless::Vec;

use super::address::{GroupAddress, IndividualAddress};
use super::dpt;
use crate::error::BusError;

/// Standard frame, not repeated, low priority.
pub const CONTROL_STANDARD: u8 = 0xBC;
/// Group destination flag plus routing counter 6.
const ROUTING_GROUP: u8 = 0xE0;

const HEADER_LEN: usize = 6;
/// Frame length for a given `LEN` nibble.
pub const fn frame_len(len_nibble: u8) -> usize {
    (len_nibble as usize & 0x0F) + 8
}
/// Longest standard frame.
pub const MAX_FRAME_LEN: usize = frame_len(0x0F);
/// Longest long-payload data section.
pub const MAX_DATA_LEN: usize = 14;

/// `true` if `byte` looks like a standard data-frame control field.
pub const fn is_standard_control(byte: u8) -> bool {
    byte & 0xD3 == 0x90
}

/// Inverted XOR checksum used by TP1.
pub fn checksum(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

// ---------------------------------------------------------------------------
// Command / payload
// ---------------------------------------------------------------------------

/// Application-layer service carried by a telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Read,
    Response,
    Write,
    /// Any other APCI (memory, property, individual-address services…).
    Other(u16),
}

impl Command {
    /// 4-bit APCI code for the group value services.
    const fn apci(self) -> u16 {
        match self {
            Self::Read => 0b0000,
            Self::Response => 0b0001,
            Self::Write => 0b0010,
            Self::Other(apci) => apci,
        }
    }

    const fn from_apci(apci: u16) -> Self {
        match apci {
            0b0000 => Self::Read,
            0b0001 => Self::Response,
            0b0010 => Self::Write,
            other => Self::Other(other),
        }
    }
}

/// Telegram data: either folded into the APCI byte or appended after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// 6-bit value carried in the low bits of the APCI byte.
    Short(u8),
    /// Separate data bytes (APCI low bits are zero).
    Long(Vec<u8, MAX_DATA_LEN>),
}

/// Reasons a received frame is not turned into a [`Telegram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Truncated,
    BadControl,
    BadChecksum,
    /// Destination is an individual address, not a group.
    NotGroupAddressed,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "truncated frame"),
            Self::BadControl => write!(f, "not a standard data frame"),
            Self::BadChecksum => write!(f, "checksum mismatch"),
            Self::NotGroupAddressed => write!(f, "not group-addressed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

/// One decoded group telegram.
#[derive(Debug, Clone, PartialEq)]
pub struct Telegram {
    pub source: IndividualAddress,
    pub destination: GroupAddress,
    pub command: Command,
    pub payload: Payload,
}

impl Telegram {
    pub fn group_read(source: IndividualAddress, destination: GroupAddress) -> Self {
        Self {
            source,
            destination,
            command: Command::Read,
            payload: Payload::Short(0),
        }
    }

    pub fn group_write_bool(
        source: IndividualAddress,
        destination: GroupAddress,
        value: bool,
    ) -> Self {
        Self {
            source,
            destination,
            command: Command::Write,
            payload: Payload::Short(dpt::encode_bool(value)),
        }
    }

    pub fn group_write_f16(
        source: IndividualAddress,
        destination: GroupAddress,
        value: f32,
    ) -> Self {
        Self::with_f16(source, destination, Command::Write, value)
    }

    pub fn group_response_f16(
        source: IndividualAddress,
        destination: GroupAddress,
        value: f32,
    ) -> Self {
        Self::with_f16(source, destination, Command::Response, value)
    }

    fn with_f16(
        source: IndividualAddress,
        destination: GroupAddress,
        command: Command,
        value: f32,
    ) -> Self {
        let mut data = Vec::new();
        // Two bytes always fit in MAX_DATA_LEN.
        let _ = data.extend_from_slice(&dpt::encode_f16(value));
        Self {
            source,
            destination,
            command,
            payload: Payload::Long(data),
        }
    }

    /// DPT 1 view of the payload.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.payload {
            Payload::Short(data) => Some(dpt::decode_bool(*data)),
            Payload::Long(data) if data.len() == 1 => Some(dpt::decode_bool(data[0])),
            Payload::Long(_) => None,
        }
    }

    /// DPT 9 view of the payload.
    pub fn as_f16(&self) -> Option<f32> {
        match &self.payload {
            Payload::Long(data) if data.len() == 2 => Some(dpt::decode_f16([data[0], data[1]])),
            _ => None,
        }
    }

    /// Serialise into `out`, returning the frame length.
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, BusError> {
        let (short, data): (u8, &[u8]) = match &self.payload {
            Payload::Short(v) => (*v & 0x3F, &[]),
            Payload::Long(d) => (0, d.as_slice()),
        };
        let len_nibble = 1 + data.len() as u8;
        let total = frame_len(len_nibble);
        if total > out.len() {
            return Err(BusError::FrameTooLong);
        }

        let apci = self.command.apci();
        let src = self.source.to_raw().to_be_bytes();
        let dst = self.destination.to_raw().to_be_bytes();

        out[0] = CONTROL_STANDARD;
        out[1..3].copy_from_slice(&src);
        out[3..5].copy_from_slice(&dst);
        out[5] = ROUTING_GROUP | len_nibble;
        out[6] = ((apci >> 2) & 0x03) as u8;
        out[7] = (((apci & 0x03) as u8) << 6) | short;
        out[8..8 + data.len()].copy_from_slice(data);
        out[total - 1] = checksum(&out[..total - 1]);
        Ok(total)
    }

    /// Parse one complete frame.
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        if frame.len() < HEADER_LEN {
            return Err(DecodeError::Truncated);
        }
        if !is_standard_control(frame[0]) {
            return Err(DecodeError::BadControl);
        }
        let total = frame_len(frame[5]);
        if frame.len() < total {
            return Err(DecodeError::Truncated);
        }
        let frame = &frame[..total];
        if checksum(&frame[..total - 1]) != frame[total - 1] {
            return Err(DecodeError::BadChecksum);
        }
        if frame[5] & 0x80 == 0 {
            return Err(DecodeError::NotGroupAddressed);
        }

        let source = IndividualAddress::from_raw(u16::from_be_bytes([frame[1], frame[2]]));
        let destination = GroupAddress::from_raw(u16::from_be_bytes([frame[3], frame[4]]));
        let apci = (u16::from(frame[6] & 0x03) << 2) | u16::from(frame[7] >> 6);
        let data = &frame[8..total - 1];

        let payload = if data.is_empty() {
            Payload::Short(frame[7] & 0x3F)
        } else {
            let mut bytes = Vec::new();
            bytes
                .extend_from_slice(data)
                .map_err(|_| DecodeError::Truncated)?;
            Payload::Long(bytes)
        };

        Ok(Self {
            source,
            destination,
            command: Command::from_apci(apci),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pa() -> IndividualAddress {
        IndividualAddress::new(1, 1, 25).unwrap()
    }

    fn ga(s: &str) -> GroupAddress {
        s.parse().unwrap()
    }

    #[test]
    fn group_read_wire_bytes() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Telegram::group_read(pa(), ga("10/1/4")).encode(&mut buf).unwrap();
        assert_eq!(n, 9);
        assert_eq!(&buf[..8], &[0xBC, 0x11, 0x19, 0x51, 0x04, 0xE1, 0x00, 0x00]);
        assert_eq!(buf[8], checksum(&buf[..8]));
    }

    #[test]
    fn float_write_layout() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let t = Telegram::group_write_f16(pa(), ga("10/1/2"), 21.5);
        let n = t.encode(&mut buf).unwrap();
        assert_eq!(n, 11);
        assert_eq!(buf[5], 0xE3);
        assert_eq!(buf[7], 0x80);
        assert_eq!(&buf[8..10], &[0x0C, 0x33]);
    }

    #[test]
    fn decodes_bool_write() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Telegram::group_write_bool(pa(), ga("10/1/11"), true)
            .encode(&mut buf)
            .unwrap();
        let t = Telegram::decode(&buf[..n]).unwrap();
        assert_eq!(t.command, Command::Write);
        assert_eq!(t.destination, ga("10/1/11"));
        assert_eq!(t.as_bool(), Some(true));
        assert_eq!(t.as_f16(), None);
    }

    #[test]
    fn response_carries_float() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Telegram::group_response_f16(pa(), ga("10/1/1"), 800.0)
            .encode(&mut buf)
            .unwrap();
        let t = Telegram::decode(&buf[..n]).unwrap();
        assert_eq!(t.command, Command::Response);
        let v = t.as_f16().unwrap();
        assert!((v - 800.0).abs() < 0.5);
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Telegram::group_read(pa(), ga("10/1/1")).encode(&mut buf).unwrap();
        buf[n - 1] ^= 0x01;
        assert_eq!(Telegram::decode(&buf[..n]), Err(DecodeError::BadChecksum));
    }

    #[test]
    fn individual_destination_is_rejected() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Telegram::group_read(pa(), ga("10/1/1")).encode(&mut buf).unwrap();
        buf[5] &= 0x7F;
        buf[n - 1] = checksum(&buf[..n - 1]);
        assert_eq!(Telegram::decode(&buf[..n]), Err(DecodeError::NotGroupAddressed));
    }

    #[test]
    fn unknown_apci_is_other() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = Telegram::group_read(pa(), ga("10/1/1")).encode(&mut buf).unwrap();
        buf[6] = 0x03;
        buf[7] = 0xC0;
        buf[n - 1] = checksum(&buf[..n - 1]);
        let t = Telegram::decode(&buf[..n]).unwrap();
        assert_eq!(t.command, Command::Other(0b1111));
    }
}

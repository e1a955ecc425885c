//! Datapoint-type codecs used by this node.
//!
//! | DPT | Meaning              | Wire size                     |
//! |-----|----------------------|-------------------------------|
//! | 1   | Boolean (switch)     | 6-bit short data, bit 0       |
//! | 9   | 2-byte float         | `MEEEEMMM MMMMMMMM`           |
//!
//! DPT 9 value = `0.01 · M · 2^E`, where `M` is a 12-bit two's-complement
//! mantissa (sign in bit 15, low 11 bits in bits 10..0) and `E` a 4-bit
//! exponent.  `0x7FFF` is reserved for "invalid data".

/// Raw DPT 9 code for invalid data (sensor fault).
pub const F16_INVALID: u16 = 0x7FFF;

/// Largest value DPT 9 can carry.
pub const F16_MAX: f32 = 670_433.28;
/// Smallest value DPT 9 can carry.
pub const F16_MIN: f32 = -671_088.64;

const MANTISSA_MIN: f64 = -2048.0;
const MANTISSA_MAX: f64 = 2047.0;
const EXPONENT_MAX: u8 = 15;

/// Encode a float as DPT 9.  Non-finite input maps to [`F16_INVALID`];
/// out-of-range input is clamped.
pub fn encode_f16(value: f32) -> [u8; 2] {
    if !value.is_finite() {
        return F16_INVALID.to_be_bytes();
    }

    let mut mantissa = f64::from(value) * 100.0;
    let mut exponent = 0u8;
    loop {
        let rounded = mantissa.round();
        if (MANTISSA_MIN..=MANTISSA_MAX).contains(&rounded) || exponent == EXPONENT_MAX {
            break;
        }
        mantissa /= 2.0;
        exponent += 1;
    }

    let m = (mantissa.round() as i32).clamp(MANTISSA_MIN as i32, MANTISSA_MAX as i32);
    let bits = (m as u16) & 0x0FFF;
    let mut raw = ((bits & 0x0800) << 4) | (u16::from(exponent) << 11) | (bits & 0x07FF);
    if raw == F16_INVALID {
        // Clamped to the top of the range; step one below the reserved code.
        raw -= 1;
    }
    raw.to_be_bytes()
}

/// Decode DPT 9.  The invalid-data code yields `NaN`.
pub fn decode_f16(bytes: [u8; 2]) -> f32 {
    let raw = u16::from_be_bytes(bytes);
    if raw == F16_INVALID {
        return f32::NAN;
    }
    let exponent = i32::from((raw >> 11) & 0x0F);
    let low = i32::from(raw & 0x07FF);
    let mantissa = if raw & 0x8000 != 0 { low - 2048 } else { low };
    (0.01 * f64::from(mantissa) * f64::from(1u32 << exponent)) as f32
}

/// DPT 1: the switch value is bit 0 of the short data.
pub const fn encode_bool(value: bool) -> u8 {
    value as u8
}

pub const fn decode_bool(data: u8) -> bool {
    data & 0x01 != 0
}

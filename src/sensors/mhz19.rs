//! MH-Z19 NDIR CO2 sensor on a 9600-baud UART.
//!
//! Every exchange is a fixed 9-byte frame:
//!
//! ```text
//!  request  FF 01 cmd a0 a1 a2 a3 a4 ck
//!  response FF cmd d0 d1 d2 d3 d4 d5 ck      ck = (!Σ bytes 1..=7) + 1
//! ```

use log::{info, warn};

use crate::error::SensorError;
use crate::knx::link::ByteLink;

pub const FRAME_LEN: usize = 9;

const START: u8 = 0xFF;
const SENSOR_NUMBER: u8 = 0x01;
const CMD_READ_CO2: u8 = 0x86;
const CMD_AUTO_CALIBRATION: u8 = 0x79;
const ABC_ON: u8 = 0xA0;

/// Upper bound on waiting for the response.
const RESPONSE_TIMEOUT_MS: u32 = 100;
/// Full-scale range of the 5000 ppm variant.
const MAX_PPM: u16 = 5_000;

/// Frame checksum over bytes 1..=7.
pub fn checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    let sum = frame[1..8].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (!sum).wrapping_add(1)
}

/// Build a request frame.
pub fn request(command: u8, arg: u8) -> [u8; FRAME_LEN] {
    let mut frame = [START, SENSOR_NUMBER, command, arg, 0, 0, 0, 0, 0];
    frame[8] = checksum(&frame);
    frame
}

pub struct Mhz19<L: ByteLink> {
    link: L,
}

impl<L: ByteLink> Mhz19<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Enable or disable automatic baseline correction.  The sensor sends
    /// no reply.
    pub fn set_auto_calibration(&mut self, enabled: bool) -> Result<(), SensorError> {
        let frame = request(CMD_AUTO_CALIBRATION, if enabled { ABC_ON } else { 0 });
        self.send(&frame)?;
        info!("mhz19: auto calibration {}", if enabled { "on" } else { "off" });
        Ok(())
    }

    /// CO2 concentration in ppm.
    pub fn read_ppm(&mut self) -> Result<u16, SensorError> {
        self.drain();
        self.send(&request(CMD_READ_CO2, 0))?;

        let mut resp = [0u8; FRAME_LEN];
        let mut got = 0;
        while got < FRAME_LEN {
            match self.link.read_timeout(&mut resp[got..], RESPONSE_TIMEOUT_MS) {
                Ok(0) => {
                    warn!("mhz19: timeout after {} bytes", got);
                    return Err(SensorError::Uart);
                }
                Ok(n) => got += n,
                Err(e) => {
                    warn!("mhz19: rx failed: {:?}", e);
                    return Err(SensorError::Uart);
                }
            }
        }

        if resp[0] != START || resp[1] != CMD_READ_CO2 {
            return Err(SensorError::Uart);
        }
        if checksum(&resp) != resp[8] {
            return Err(SensorError::Checksum);
        }

        let ppm = u16::from_be_bytes([resp[2], resp[3]]);
        if ppm > MAX_PPM {
            return Err(SensorError::OutOfRange);
        }
        Ok(ppm)
    }

    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), SensorError> {
        match self.link.write(frame) {
            Ok(FRAME_LEN) => Ok(()),
            Ok(_) | Err(_) => Err(SensorError::Uart),
        }
    }

    /// Discard stale bytes from an earlier, timed-out exchange.
    fn drain(&mut self) {
        let mut scratch = [0u8; FRAME_LEN];
        while self.link.available() {
            if !matches!(self.link.read(&mut scratch), Ok(n) if n > 0) {
                break;
            }
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}

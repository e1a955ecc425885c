//! TP-UART transceiver link (Siemens TP-UART / NCN5120 compatible).
//!
//! Implements [`BusPort`] on top of any [`ByteLink`] running at
//! 19200 baud, 8E1.
//!
//! ```text
//!  host ──U_L_DataStart|i, b0 … U_L_DataEnd|n, bn──▶ TP-UART ──▶ bus
//!  host ◀──── raw frame bytes / service indications ─── TP-UART ◀── bus
//! ```
//!
//! Inbound bytes are pulled one at a time until a frame completes, so at
//! most one telegram is in flight per poll; anything after it stays in the
//! UART FIFO for the next cycle.

use heapless::Vec;
use log::{debug, warn};

use super::address::{GroupAddress, IndividualAddress};
use super::codec::FrameDecoder;
use super::link::ByteLink;
use super::telegram::{MAX_FRAME_LEN, Telegram};
use crate::app::ports::BusPort;
use crate::error::BusError;

/// U_Reset.request.
pub const U_RESET_REQUEST: u8 = 0x01;
/// U_AckInformation with the "addressed" bit set.
pub const U_ACK_ADDRESSED: u8 = 0x11;
/// U_L_DataStart / U_L_DataContinue (OR'ed with the byte index).
pub const U_DATA_START_CONTINUE: u8 = 0x80;
/// U_L_DataEnd (OR'ed with the frame length minus one).
pub const U_DATA_END: u8 = 0x40;

/// Group addresses the transceiver acknowledges.
pub const MAX_LISTEN: usize = 16;
/// Upper bound of bytes consumed per `poll_frame` call.
const MAX_BYTES_PER_POLL: usize = 64;

/// TP-UART-backed bus transport.
pub struct TpUartBus<L: ByteLink> {
    link: L,
    own_address: IndividualAddress,
    decoder: FrameDecoder,
    listen: Vec<GroupAddress, MAX_LISTEN>,
    tx_errors: u32,
    decode_errors: u32,
}

impl<L: ByteLink> TpUartBus<L> {
    pub fn new(link: L, own_address: IndividualAddress) -> Self {
        Self {
            link,
            own_address,
            decoder: FrameDecoder::new(),
            listen: Vec::new(),
            tx_errors: 0,
            decode_errors: 0,
        }
    }

    /// Send U_Reset.request and drop any partial inbound frame.
    pub fn reset(&mut self) {
        self.decoder.reset();
        if let Err(e) = self.link.write(&[U_RESET_REQUEST]) {
            self.tx_errors = self.tx_errors.wrapping_add(1);
            warn!("TP-UART reset failed: {:?}", e);
        }
    }

    /// Acknowledge telegrams addressed to `address`.
    pub fn listen(&mut self, address: GroupAddress) -> Result<(), BusError> {
        if self.listen.contains(&address) {
            return Ok(());
        }
        self.listen
            .push(address)
            .map_err(|_| BusError::ListenTableFull)
    }

    pub fn is_listening(&self, address: GroupAddress) -> bool {
        self.listen.contains(&address)
    }

    /// Transmit failures since boot.
    pub fn tx_errors(&self) -> u32 {
        self.tx_errors
    }

    /// Frames dropped (checksum, non-group, malformed) since boot.
    pub fn decode_errors(&self) -> u32 {
        self.decode_errors.wrapping_add(self.decoder.rejected())
    }

    pub fn own_address(&self) -> IndividualAddress {
        self.own_address
    }

    /// Borrow the underlying link (tests inspect written bytes).
    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    fn transmit(&mut self, telegram: &Telegram) {
        let mut frame = [0u8; MAX_FRAME_LEN];
        let len = match telegram.encode(&mut frame) {
            Ok(n) => n,
            Err(e) => {
                self.tx_errors = self.tx_errors.wrapping_add(1);
                warn!("knx: cannot encode telegram for {}: {}", telegram.destination, e);
                return;
            }
        };

        let mut wire = [0u8; MAX_FRAME_LEN * 2];
        for (i, byte) in frame[..len].iter().enumerate() {
            let service = if i + 1 == len {
                U_DATA_END | i as u8
            } else {
                U_DATA_START_CONTINUE | i as u8
            };
            wire[2 * i] = service;
            wire[2 * i + 1] = *byte;
        }

        match self.link.write(&wire[..2 * len]) {
            Ok(n) if n == 2 * len => {
                debug!("knx: tx {:?} -> {}", telegram.command, telegram.destination);
            }
            Ok(n) => {
                self.tx_errors = self.tx_errors.wrapping_add(1);
                warn!("knx: short write to {} ({} of {} bytes)", telegram.destination, n, 2 * len);
            }
            Err(e) => {
                self.tx_errors = self.tx_errors.wrapping_add(1);
                warn!("knx: tx to {} failed: {:?}", telegram.destination, e);
            }
        }
    }

    fn acknowledge(&mut self) {
        if let Err(e) = self.link.write(&[U_ACK_ADDRESSED]) {
            self.tx_errors = self.tx_errors.wrapping_add(1);
            warn!("knx: ack failed: {:?}", e);
        }
    }
}

impl<L: ByteLink> BusPort for TpUartBus<L> {
    fn send_value(&mut self, address: GroupAddress, value: f32) {
        let t = Telegram::group_write_f16(self.own_address, address, value);
        self.transmit(&t);
    }

    fn answer_value(&mut self, address: GroupAddress, value: f32) {
        let t = Telegram::group_response_f16(self.own_address, address, value);
        self.transmit(&t);
    }

    fn send_bool(&mut self, address: GroupAddress, value: bool) {
        let t = Telegram::group_write_bool(self.own_address, address, value);
        self.transmit(&t);
    }

    fn poll_frame(&mut self) -> Option<Telegram> {
        let mut byte = [0u8; 1];
        for _ in 0..MAX_BYTES_PER_POLL {
            match self.link.read(&mut byte) {
                Ok(1) => {}
                Ok(_) => return None,
                Err(e) => {
                    warn!("knx: rx failed: {:?}", e);
                    return None;
                }
            }

            let Some(frame) = self.decoder.feed_byte(byte[0]) else {
                continue;
            };

            match Telegram::decode(frame) {
                Ok(telegram) => {
                    if self.is_listening(telegram.destination) {
                        self.acknowledge();
                    }
                    return Some(telegram);
                }
                Err(e) => {
                    self.decode_errors = self.decode_errors.wrapping_add(1);
                    debug!("knx: dropped frame: {}", e);
                }
            }
        }
        None
    }
}

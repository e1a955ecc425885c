//! Streaming TP1 frame decoder.
//!
//! The TP-UART hands us a byte stream that interleaves received frames
//! with its own service indications (reset, state, data confirm).  The
//! decoder accumulates bytes one at a time and yields only complete,
//! checksum-valid standard frames:
//!
//! ```text
//!  Hunting ──ctrl byte──▶ Header (6 B) ──LEN known──▶ Body ──complete──▶ frame
//!     ▲                                                 │
//!     └──────────── bad checksum / resync ◀─────────────┘
//! ```
//!
//! Any byte that does not look like a control field while hunting is
//! dropped, which is how service bytes are skipped.

use super::telegram::{MAX_FRAME_LEN, checksum, frame_len, is_standard_control};

const HEADER_LEN: usize = 6;

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Waiting for a control byte.
    Hunting,
    /// Collecting the fixed header.
    Header { collected: usize },
    /// Header known, collecting the rest.
    Body { expected: usize, collected: usize },
}

/// Byte-at-a-time frame decoder.  Stack-allocated, no heap.
pub struct FrameDecoder {
    state: DecoderState,
    buf: [u8; MAX_FRAME_LEN],
    rejected: u32,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Hunting,
            buf: [0; MAX_FRAME_LEN],
            rejected: 0,
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Some(&[u8])` when a complete checksum-valid frame is
    /// available.  The slice is valid until the next call.
    pub fn feed_byte(&mut self, byte: u8) -> Option<&[u8]> {
        match self.state {
            DecoderState::Hunting => {
                if is_standard_control(byte) {
                    self.buf[0] = byte;
                    self.state = DecoderState::Header { collected: 1 };
                }
                None
            }

            DecoderState::Header { collected } => {
                self.buf[collected] = byte;
                let collected = collected + 1;
                self.state = if collected == HEADER_LEN {
                    DecoderState::Body {
                        expected: frame_len(byte),
                        collected,
                    }
                } else {
                    DecoderState::Header { collected }
                };
                None
            }

            DecoderState::Body { expected, collected } => {
                self.buf[collected] = byte;
                let collected = collected + 1;
                if collected < expected {
                    self.state = DecoderState::Body { expected, collected };
                    return None;
                }

                self.state = DecoderState::Hunting;
                if checksum(&self.buf[..expected - 1]) == self.buf[expected - 1] {
                    Some(&self.buf[..expected])
                } else {
                    self.rejected = self.rejected.wrapping_add(1);
                    log::debug!("knx: dropped frame with bad checksum");
                    None
                }
            }
        }
    }

    /// `true` while a frame is partially received.
    pub fn in_frame(&self) -> bool {
        self.state != DecoderState::Hunting
    }

    /// Frames dropped for a checksum mismatch since boot.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// Discard any partial frame (e.g. after a link reset).
    pub fn reset(&mut self) {
        self.state = DecoderState::Hunting;
    }
}

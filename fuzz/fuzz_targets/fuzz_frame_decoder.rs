//! Fuzz target: `FrameDecoder::feed_byte` + `Telegram::decode`
//!
//! Streams arbitrary bytes through the TP1 frame decoder the way the
//! TP-UART delivers them.  Every yielded frame must be bounded, carry a
//! valid checksum and be parseable without panicking.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use multisensor::knx::codec::FrameDecoder;
use multisensor::knx::telegram::{MAX_FRAME_LEN, Telegram, checksum, frame_len};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();

    for &byte in data {
        if let Some(frame) = decoder.feed_byte(byte) {
            assert!(frame.len() <= MAX_FRAME_LEN, "frame exceeds MAX_FRAME_LEN");
            assert_eq!(frame.len(), frame_len(frame[5]), "length disagrees with LEN nibble");
            let (body, chk) = frame.split_at(frame.len() - 1);
            assert_eq!(checksum(body), chk[0], "decoder yielded a bad checksum");

            if let Ok(telegram) = Telegram::decode(frame) {
                let _ = telegram.as_bool();
                let _ = telegram.as_f16();
            }
        }
    }

    // After a reset the decoder must accept the same stream cleanly again.
    decoder.reset();
    for &byte in data {
        let _ = decoder.feed_byte(byte);
    }
});

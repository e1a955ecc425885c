//! ESP-IDF UART adapter for [`ByteLink`].
//!
//! Used twice: UART1 to the TP-UART transceiver and UART2 to the MH-Z19.
//! Plain `read` never waits; `read_timeout` blocks for at most the given
//! budget and is only used by the CO2 request/response exchange.

#![cfg(target_os = "espidf")]

use esp_idf_hal::delay::{NON_BLOCK, TickType};
use esp_idf_hal::sys::EspError;
use esp_idf_hal::uart::UartDriver;

use crate::knx::link::ByteLink;

pub struct UartLink<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartLink<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl ByteLink for UartLink<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, EspError> {
        self.uart.read(buf, TickType::new_millis(u64::from(timeout_ms)).ticks())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn available(&self) -> bool {
        self.uart.remaining_read().is_ok_and(|n| n > 0)
    }
}

//! GPIO / peripheral pin assignments for the multisensor board (ESP32-S3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// KNX TP-UART transceiver (UART1, 19200 8E1)
// ---------------------------------------------------------------------------

pub const KNX_UART_TX_GPIO: i32 = 17;
pub const KNX_UART_RX_GPIO: i32 = 18;
pub const KNX_UART_BAUD: u32 = 19_200;

// ---------------------------------------------------------------------------
// MH-Z19 CO2 sensor (UART2, 9600 8N1)
// ---------------------------------------------------------------------------

pub const MHZ19_UART_TX_GPIO: i32 = 39;
pub const MHZ19_UART_RX_GPIO: i32 = 40;
pub const MHZ19_UART_BAUD: u32 = 9_600;

// ---------------------------------------------------------------------------
// HTU21D temperature / humidity (I²C0, 100 kHz)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// GL5516 LDR, analog voltage via 1 kΩ divider
// ---------------------------------------------------------------------------

/// ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const LDR_ADC_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Indicator outputs (active HIGH)
// ---------------------------------------------------------------------------

pub const LED_GREEN_GPIO: i32 = 11;
pub const LED_YELLOW_GPIO: i32 = 12;
pub const LED_RED_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// WS2812B feedback strip (RMT channel 0)
// ---------------------------------------------------------------------------

pub const PIXEL_DATA_GPIO: i32 = 48;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 16;

//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                     |
//! |-------------|-------------------|---------------------------------|
//! | `hardware`  | MeasurementPort   | HTU21D (I²C), MH-Z19 (UART), LDR (ADC) |
//! |             | OutputPort        | Indicator GPIOs                 |
//! |             | IndicatorPort     | WS2812B strip (RMT)             |
//! | `log_sink`  | EventSink         | Serial log output               |
//! | `time`      | ClockPort         | ESP32 high-resolution timer     |
//! | `uart_link` | ByteLink          | ESP-IDF UART driver             |

pub mod hardware;
pub mod log_sink;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart_link;

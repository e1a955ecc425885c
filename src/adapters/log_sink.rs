//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured node events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NodeEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Started { address } => {
                info!("START | physical_address={}", address);
            }
            NodeEvent::TelemetryPushed(frame) => {
                let [co2, temp, hum, light] = frame.readings;
                info!(
                    "TELEM | slot={}ms | {}={:.0}{} | {}={:.1}{} | {}={:.1}{} | {}={:.0}{}",
                    frame.scheduled_ms,
                    co2.address,
                    co2.value,
                    co2.quantity.unit(),
                    temp.address,
                    temp.value,
                    temp.quantity.unit(),
                    hum.address,
                    hum.value,
                    hum.quantity.unit(),
                    light.address,
                    light.value,
                    light.quantity.unit(),
                );
            }
            NodeEvent::ReadAnswered {
                address,
                quantity,
                value,
            } => {
                info!("READ | {} {:?}={:.2}{}", address, quantity, value, quantity.unit());
            }
            NodeEvent::OutputSwitched { address, channel, on } => {
                info!("WRITE | {} {:?} -> {}", address, channel, if *on { "ON" } else { "OFF" });
            }
            NodeEvent::ButtonPressed { address } => {
                info!("BUTTON | pressed -> {}", address);
            }
            NodeEvent::FeedbackExpired => {
                debug!("FLASH | expired");
            }
            NodeEvent::TelegramIgnored { address, reason } => {
                debug!("IGNORE | {} {:?}", address, reason);
            }
        }
    }
}

//! Multisensor Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          TpUartBus        Debouncer           │
//! │  (Measurement+Output+     (BusPort)        (ButtonPort)        │
//! │   Indicator)                                                   │
//! │  LogEventSink             MonotonicClock                       │
//! │  (EventSink)              (ClockPort)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  TelemetryScheduler · Dispatcher · FeedbackTimer       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::rmt::TxRmtDriver;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::uart::{UartDriver, config as uart_config};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use multisensor::adapters::hardware::HardwareAdapter;
use multisensor::adapters::log_sink::LogEventSink;
use multisensor::adapters::time::MonotonicClock;
use multisensor::adapters::uart_link::UartLink;
use multisensor::app::ports::ClockPort;
use multisensor::app::service::NodeService;
use multisensor::config::NodeConfig;
use multisensor::drivers::button::Debouncer;
use multisensor::drivers::hw_init;
use multisensor::drivers::outputs::IndicatorOutputs;
use multisensor::drivers::pixels::{PixelStrip, Ws2812Rmt};
use multisensor::error::Error;
use multisensor::knx::tpuart::TpUartBus;
use multisensor::pins;
use multisensor::sensors::SensorHub;
use multisensor::sensors::htu21d::Htu21d;
use multisensor::sensors::ldr::LdrSensor;
use multisensor::sensors::mhz19::Mhz19;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Multisensor v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Build-time config ──────────────────────────────────
    let config = NodeConfig::embedded().unwrap_or_else(|e| {
        warn!("Embedded config rejected ({}), using defaults", e);
        NodeConfig::default()
    });
    let mut node = NodeService::new(config).map_err(Error::from)?;
    let config = node.config().clone();

    // ── 3. Peripherals ────────────────────────────────────────
    let p = Peripherals::take()?;

    // SAFETY (all `::new(gpio)` calls below): every number comes from
    // `pins` and is claimed exactly once.
    let led = |gpio| PinDriver::output(unsafe { AnyOutputPin::new(gpio) });
    let outputs = IndicatorOutputs::new(
        led(pins::LED_GREEN_GPIO)?,
        led(pins::LED_YELLOW_GPIO)?,
        led(pins::LED_RED_GPIO)?,
    );

    let mut button_pin = PinDriver::input(unsafe { AnyInputPin::new(pins::BUTTON_GPIO) })?;
    button_pin.set_pull(Pull::Up)?;
    let mut button = Debouncer::new(button_pin, config.debounce_ms);

    let knx_uart = UartDriver::new(
        p.uart1,
        unsafe { AnyIOPin::new(pins::KNX_UART_TX_GPIO) },
        unsafe { AnyIOPin::new(pins::KNX_UART_RX_GPIO) },
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config::Config::default()
            .baudrate(Hertz(pins::KNX_UART_BAUD))
            .data_bits(uart_config::DataBits::DataBits8)
            .parity_even()
            .stop_bits(uart_config::StopBits::STOP1),
    )?;

    let co2_uart = UartDriver::new(
        p.uart2,
        unsafe { AnyIOPin::new(pins::MHZ19_UART_TX_GPIO) },
        unsafe { AnyIOPin::new(pins::MHZ19_UART_RX_GPIO) },
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config::Config::default().baudrate(Hertz(pins::MHZ19_UART_BAUD)),
    )?;

    let i2c = I2cDriver::new(
        p.i2c0,
        unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) },
        unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) },
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;

    let rmt = TxRmtDriver::new(
        p.rmt.channel0,
        unsafe { AnyOutputPin::new(pins::PIXEL_DATA_GPIO) },
        &TransmitConfig::new().clock_divider(1),
    )?;
    let pixels = PixelStrip::new(Ws2812Rmt::new(rmt)?, config.pixel_count);

    hw_init::init_adc()?;

    // ── 4. Sensors ────────────────────────────────────────────
    let mut climate = Htu21d::new(i2c);
    if let Err(e) = climate.init(&mut FreeRtos) {
        // Not fatal: temperature / humidity go out as "invalid".
        warn!("HTU21D: {}", e);
    }
    let mut co2 = Mhz19::new(UartLink::new(co2_uart));
    if let Err(e) = co2.set_auto_calibration(config.co2_auto_calibration) {
        warn!("MH-Z19: {}", e);
    }
    let sensor_hub = SensorHub::new(climate, co2, LdrSensor::new(pins::LDR_ADC_GPIO));

    let mut hw = HardwareAdapter::new(sensor_hub, outputs, pixels);

    // ── 5. Bus ────────────────────────────────────────────────
    let mut bus = TpUartBus::new(UartLink::new(knx_uart), config.physical_address);
    bus.reset();
    for route in node.dispatcher().routes() {
        bus.listen(route.address).map_err(Error::from)?;
    }

    // ── 6. Start ──────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut log_sink = LogEventSink::new();
    node.start(clock.now_ms(), &mut hw, &mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 7. Main loop ──────────────────────────────────────────
    loop {
        node.cycle(clock.now_ms(), &mut hw, &mut bus, &mut button, &mut log_sink);

        // One tick for the idle task so the task watchdog stays fed.
        FreeRtos::delay_ms(1);
    }
}

//! Standing desk controller firmware
//!
//! Main firmware binary for RP2040 boards wired to a standing desk's
//! handset bus. Polls the control box over UART, tracks height and
//! movement, and presses handset buttons on request.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use standdesk_core::config::parse_config;
use standdesk_core::DeskConfig;

/// Embedded configuration (compiled into firmware)
/// Edit desk.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../desk.toml");

/// GPIOs the board wires UART0 to
const UART_TX_PIN: u8 = 0;
const UART_RX_PIN: u8 = 1;

mod channels;
mod observer;
mod tasks;
mod uart;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static DESK_CONFIG: StaticCell<DeskConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Standdesk firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static DeskConfig = DESK_CONFIG.init(load_config());

    if config.uart.tx_pin != UART_TX_PIN || config.uart.rx_pin != UART_RX_PIN {
        warn!(
            "desk.toml asks for TX=gpio{} RX=gpio{}, board uses gpio{}/gpio{}",
            config.uart.tx_pin, config.uart.rx_pin, UART_TX_PIN, UART_RX_PIN
        );
    }

    // Setup UART for the handset bus
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.uart.baud_rate;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    info!("UART initialized at {} baud", config.uart.baud_rate);

    // Onboard LED and a timer push button to ground
    let led = Output::new(p.PIN_25, Level::Low);
    let timer_button = Input::new(p.PIN_15, Pull::Up);

    spawner.spawn(tasks::desk_task(uart, config)).unwrap();
    spawner.spawn(tasks::indicator_task(led)).unwrap();
    spawner.spawn(tasks::timer_button_task(timer_button)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded desk.toml
///
/// build.rs already validated the file, so failure here means the two
/// parsers disagree; fall back to stock defaults rather than refuse to boot.
fn load_config() -> DeskConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            return DeskConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Configuration loaded");
            debug!("  uart: {:?}", config.uart);
            debug!("  timing: {:?}", config.timing);
            debug!("  {} buttons bound", config.buttons.bound());
            config
        }
        Err(e) => {
            error!("Invalid embedded config: {:?}", e);
            DeskConfig::default()
        }
    }
}

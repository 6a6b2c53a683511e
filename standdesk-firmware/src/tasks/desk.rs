//! Desk task
//!
//! Polls the desk controller on a fixed cadence and applies commands from
//! other tasks between polls.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUart;
use embassy_time::{Duration, Instant, Ticker};

use standdesk_core::{DeskConfig, DeskController, DeskUart};

use crate::channels::{DeskCommand, DESK_COMMANDS};
use crate::observer::ChannelObserver;
use crate::uart::IoUart;

/// Desk task - owns the UART and the desk controller
#[embassy_executor::task]
pub async fn desk_task(uart: BufferedUart, config: &'static DeskConfig) {
    info!("Desk task started");

    let mut desk = DeskController::new(IoUart::new(uart), config);
    let mut observer = ChannelObserver;

    let poll_interval = Duration::from_millis(config.timing.poll_interval_ms as u64);
    let mut ticker = Ticker::every(poll_interval);
    let start = Instant::now();

    loop {
        match select(ticker.next(), DESK_COMMANDS.receive()).await {
            Either::First(()) => {
                let now_ms = start.elapsed().as_millis() as u32;
                let report = desk.poll(now_ms, &mut observer);
                if report.bytes_read > 0 {
                    trace!("Poll: {:?}", report);
                }
            }
            Either::Second(command) => {
                let now_ms = start.elapsed().as_millis() as u32;
                handle_command(&mut desk, command, now_ms);
            }
        }
    }
}

/// Apply one command; failures are logged and the loop carries on
fn handle_command<U: DeskUart>(desk: &mut DeskController<U>, command: DeskCommand, now_ms: u32) {
    debug!("Command: {:?}", command);

    let result = match command {
        DeskCommand::Press(button) => desk.press(button),
        DeskCommand::SetTimer(seconds) => desk.set_timer(seconds, now_ms),
        DeskCommand::CancelTimer => {
            if !desk.cancel_timer() {
                debug!("No timer running");
            }
            Ok(())
        }
        DeskCommand::ProgramAlarm(minutes) => desk.program_alarm(minutes),
    };

    if let Err(e) = result {
        warn!("Command {:?} failed: {:?}", command, e);
    }
}

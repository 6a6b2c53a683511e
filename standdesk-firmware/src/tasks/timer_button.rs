//! Timer button task
//!
//! A push button wired to ground: a short press starts the local countdown,
//! a long press cancels it.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use crate::channels::{DeskCommand, DESK_COMMANDS};

/// Countdown started by a short press (seconds)
pub const TIMER_BUTTON_SECONDS: u8 = 60;

/// Contact bounce settle time (ms)
const DEBOUNCE_MS: u64 = 20;

/// Hold time that counts as a long press (ms)
const LONG_PRESS_MS: u64 = 1000;

/// Timer button task - turns presses into timer commands
#[embassy_executor::task]
pub async fn timer_button_task(mut button: Input<'static>) {
    info!("Timer button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if button.is_high() {
            continue;
        }

        let released = select(button.wait_for_high(), Timer::after_millis(LONG_PRESS_MS)).await;
        let command = match released {
            Either::First(()) => DeskCommand::SetTimer(TIMER_BUTTON_SECONDS),
            Either::Second(()) => {
                button.wait_for_high().await;
                DeskCommand::CancelTimer
            }
        };

        debug!("Timer button: {:?}", command);
        DESK_COMMANDS.send(command).await;
    }
}

//! Indicator task
//!
//! Logs desk events and flashes the status LED when a countdown or the
//! desk alarm finishes.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Timer;

use crate::channels::{DeskEvent, DESK_EVENTS};

/// Flashes per done event
const DONE_FLASHES: u8 = 3;

/// Half period of a flash (ms)
const FLASH_MS: u64 = 150;

/// Indicator task - consumes desk events
#[embassy_executor::task]
pub async fn indicator_task(mut led: Output<'static>) {
    info!("Indicator task started");

    loop {
        let event = DESK_EVENTS.receive().await;
        match event {
            DeskEvent::Connected(connected) => {
                if connected {
                    info!("Desk connected");
                } else {
                    warn!("Desk disconnected");
                }
            }
            DeskEvent::Height(height_cm) => debug!("Height {} cm", height_cm),
            DeskEvent::ControlStatus(status) => info!("Control status {}", status.as_str()),
            DeskEvent::TimerDone | DeskEvent::AlarmDone => {
                info!("{:?}", event);
                flash(&mut led).await;
            }
            other => debug!("{:?}", other),
        }
    }
}

async fn flash(led: &mut Output<'static>) {
    for _ in 0..DONE_FLASHES {
        led.set_high();
        Timer::after_millis(FLASH_MS).await;
        led.set_low();
        Timer::after_millis(FLASH_MS).await;
    }
}

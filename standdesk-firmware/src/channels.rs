//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use standdesk_core::ControlStatus;
use standdesk_protocol::Button;

/// Channel capacity for desk commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for desk events
const EVENT_CHANNEL_SIZE: usize = 16;

/// Actions requested of the desk task
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum DeskCommand {
    /// Press a handset button once
    Press(Button),
    /// Start the local countdown (seconds)
    SetTimer(u8),
    CancelTimer,
    /// Program the desk's own alarm (minutes)
    ProgramAlarm(u8),
}

/// Desk state changes published by the desk task
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum DeskEvent {
    Connected(bool),
    Moving(bool),
    Height(f32),
    TimerActive(bool),
    TimerSeconds(u8),
    ControlStatus(ControlStatus),
    AlarmActive(bool),
    AlarmMinutes(u8),
    AlarmSeconds(u16),
    TimerDone,
    AlarmDone,
}

/// Commands for the desk task
pub static DESK_COMMANDS: Channel<CriticalSectionRawMutex, DeskCommand, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// State changes from the desk task
pub static DESK_EVENTS: Channel<CriticalSectionRawMutex, DeskEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

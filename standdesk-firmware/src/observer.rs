//! Observer that forwards desk state changes to the event channel

use defmt::*;

use standdesk_core::{ControlStatus, DeskObserver};

use crate::channels::{DeskEvent, DESK_EVENTS};

/// Publishes every change on [`DESK_EVENTS`]
///
/// Runs inside the poll, so it never waits: events are dropped when the
/// channel is full.
pub struct ChannelObserver;

impl ChannelObserver {
    fn send(&self, event: DeskEvent) {
        if DESK_EVENTS.try_send(event).is_err() {
            warn!("Event channel full, dropping {:?}", event);
        }
    }
}

impl DeskObserver for ChannelObserver {
    fn on_connected(&mut self, connected: bool) {
        self.send(DeskEvent::Connected(connected));
    }

    fn on_moving(&mut self, moving: bool) {
        self.send(DeskEvent::Moving(moving));
    }

    fn on_height(&mut self, height_cm: f32) {
        self.send(DeskEvent::Height(height_cm));
    }

    fn on_timer_active(&mut self, active: bool) {
        self.send(DeskEvent::TimerActive(active));
    }

    fn on_timer_seconds(&mut self, seconds: u8) {
        self.send(DeskEvent::TimerSeconds(seconds));
    }

    fn on_control_status(&mut self, status: ControlStatus) {
        self.send(DeskEvent::ControlStatus(status));
    }

    fn on_alarm_active(&mut self, active: bool) {
        self.send(DeskEvent::AlarmActive(active));
    }

    fn on_alarm_minutes(&mut self, minutes: u8) {
        self.send(DeskEvent::AlarmMinutes(minutes));
    }

    fn on_alarm_seconds(&mut self, seconds: u16) {
        self.send(DeskEvent::AlarmSeconds(seconds));
    }

    fn on_timer_done(&mut self) {
        self.send(DeskEvent::TimerDone);
    }

    fn on_alarm_done(&mut self) {
        self.send(DeskEvent::AlarmDone);
    }
}

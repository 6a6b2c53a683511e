//! Observer for desk state changes

use core::ops::BitOr;

use crate::state::ControlStatus;

/// Set of state fields an observer wants to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fields(u16);

impl Fields {
    pub const NONE: Fields = Fields(0);
    pub const CONNECTED: Fields = Fields(1 << 0);
    pub const MOVING: Fields = Fields(1 << 1);
    pub const HEIGHT: Fields = Fields(1 << 2);
    pub const TIMER_ACTIVE: Fields = Fields(1 << 3);
    pub const TIMER_SECONDS: Fields = Fields(1 << 4);
    pub const CONTROL_STATUS: Fields = Fields(1 << 5);
    pub const ALARM_ACTIVE: Fields = Fields(1 << 6);
    pub const ALARM_MINUTES: Fields = Fields(1 << 7);
    pub const TIMER_DONE: Fields = Fields(1 << 8);
    pub const ALARM_DONE: Fields = Fields(1 << 9);
    pub const ALARM_SECONDS: Fields = Fields(1 << 10);
    pub const ALL: Fields = Fields((1 << 11) - 1);

    /// Check if every field in `other` is included
    pub const fn contains(self, other: Fields) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Fields) -> Fields {
        Fields(self.0 | other.0)
    }
}

impl BitOr for Fields {
    type Output = Fields;

    fn bitor(self, rhs: Fields) -> Fields {
        self.union(rhs)
    }
}

/// Receives desk state changes from the polling component
///
/// Only changed fields are reported, and only those listed in
/// [`interests`](DeskObserver::interests). All methods default to no-ops so
/// an observer implements just what it publishes.
pub trait DeskObserver {
    /// Fields this observer subscribes to
    fn interests(&self) -> Fields {
        Fields::ALL
    }

    fn on_connected(&mut self, _connected: bool) {}

    fn on_moving(&mut self, _moving: bool) {}

    fn on_height(&mut self, _height_cm: f32) {}

    fn on_timer_active(&mut self, _active: bool) {}

    fn on_timer_seconds(&mut self, _seconds: u8) {}

    fn on_control_status(&mut self, _status: ControlStatus) {}

    fn on_alarm_active(&mut self, _active: bool) {}

    fn on_alarm_minutes(&mut self, _minutes: u8) {}

    /// Estimated seconds left on the desk's alarm
    fn on_alarm_seconds(&mut self, _seconds: u16) {}

    /// Local countdown reached zero; called once per countdown
    fn on_timer_done(&mut self) {}

    /// Desk's own alarm reached zero
    fn on_alarm_done(&mut self) {}
}

/// Observer that subscribes to nothing
impl DeskObserver for () {
    fn interests(&self) -> Fields {
        Fields::NONE
    }
}

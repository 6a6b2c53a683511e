//! Control status state machine
//!
//! Follows what the handset display is doing to infer what the user (or
//! this controller) is doing with the desk: idle, moving, browsing memory
//! slots, or setting and running the built-in alarm.

use standdesk_protocol::DisplayState;

/// Desk control states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlStatus {
    /// Nothing decoded yet
    #[default]
    Unknown,
    /// Handset display asleep
    Off,
    /// Memory prompt shown
    Memory,
    /// Height shown and stable
    Height,
    /// Height shown and changing
    Moving,
    /// Alarm button pressed, " ON" shown
    TimerStarting,
    /// Alarm duration being edited
    TimerChange,
    /// Alarm counting down
    TimerOn,
    /// Alarm disabled ("OFF" shown)
    TimerOff,
    /// Desk moving while the alarm runs
    TimerMoving,
    /// Alarm reached zero
    TimerDone,
}

/// Inputs besides the display state that steer a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionContext {
    /// Height differs from the previous height reading
    pub height_changed: bool,
    /// Alarm minutes on the display reached zero
    pub alarm_elapsed: bool,
}

impl ControlStatus {
    /// Upper-case name reported to observers
    pub fn as_str(self) -> &'static str {
        match self {
            ControlStatus::Unknown => "UNKNOWN",
            ControlStatus::Off => "OFF",
            ControlStatus::Memory => "MEMORY",
            ControlStatus::Height => "HEIGHT",
            ControlStatus::Moving => "MOVING",
            ControlStatus::TimerStarting => "TIMER_STARTING",
            ControlStatus::TimerChange => "TIMER_CHANGE",
            ControlStatus::TimerOn => "TIMER_ON",
            ControlStatus::TimerOff => "TIMER_OFF",
            ControlStatus::TimerMoving => "TIMER_MOVING",
            ControlStatus::TimerDone => "TIMER_DONE",
        }
    }

    /// Check if the desk is moving in this state
    pub fn is_moving(self) -> bool {
        matches!(self, ControlStatus::Moving | ControlStatus::TimerMoving)
    }

    /// Process a display update and return the next state
    ///
    /// Returns `None` when the display state is not expected here. Staying
    /// in the same state is a valid transition.
    pub fn transition(self, trigger: DisplayState, ctx: TransitionContext) -> Option<Self> {
        use ControlStatus::*;
        use DisplayState as D;

        let duration_shown = trigger.shows_duration();

        match (self, trigger) {
            (Unknown, D::Off) => Some(Off),
            (Unknown, _) if duration_shown => Some(TimerOn),

            (Off, D::Off) => Some(Off),
            (Off, D::Memory) => Some(Memory),
            (Off, D::Height) => Some(Height),
            (Off, D::TimerOn) => Some(TimerStarting),

            (Memory, D::Memory) => Some(Memory),
            (Memory, D::Height) => Some(Height),

            (Height, D::Off) => Some(Off),
            (Height, D::Memory) => Some(Memory),
            (Height, D::Height) if ctx.height_changed => Some(Moving),
            (Height, D::Height) => Some(Height),
            (Height, D::TimerOn) => Some(TimerStarting),
            (Height, _) if duration_shown => Some(TimerOn),

            (Moving, D::Height) if ctx.height_changed => Some(Moving),
            (Moving, D::Height) => Some(Height),

            (TimerStarting, D::TimerOn) => Some(TimerStarting),
            (TimerStarting, D::TimerDurationOn | D::TimerDurationOff) => Some(TimerChange),

            (TimerChange, D::TimerDurationOn | D::TimerDurationOff) => Some(TimerChange),
            (TimerChange, D::TimerDurationOnly) => Some(TimerOn),
            (TimerChange, D::TimerOff) => Some(TimerOff),

            (TimerOn, _) if duration_shown && ctx.alarm_elapsed => Some(TimerDone),
            (TimerOn, _) if duration_shown => Some(TimerOn),
            (TimerOn, D::TimerDurationOff) => Some(TimerChange),
            (TimerOn, D::Height) => Some(TimerMoving),
            (TimerOn, D::TimerOff) => Some(TimerOff),
            (TimerOn, D::Memory) => Some(Memory),

            (TimerMoving, D::Height) => Some(TimerMoving),
            (TimerMoving, _) if duration_shown => Some(TimerOn),

            (TimerDone, _) if duration_shown => Some(TimerDone),
            (TimerDone, D::Height) => Some(Height),
            (TimerDone, D::TimerDurationOff) => Some(TimerChange),
            (TimerDone, D::TimerOff) => Some(TimerOff),

            (TimerOff, D::TimerOff) => Some(TimerOff),
            (TimerOff, D::Height) => Some(Height),

            _ => None,
        }
    }
}

/// Result of feeding one display state into the [`ControlMachine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Moved to a new state
    Changed {
        from: ControlStatus,
        to: ControlStatus,
    },
    /// Accepted, same state
    Unchanged,
    /// No transition from the current state on this trigger
    Rejected,
}

/// Control status plus the readings its transitions depend on
#[derive(Debug, Clone, Default)]
pub struct ControlMachine {
    status: ControlStatus,
    height_current: f32,
    height_previous: f32,
    alarm_minutes: u8,
}

impl ControlMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ControlStatus {
        self.status
    }

    pub fn height(&self) -> f32 {
        self.height_current
    }

    pub fn set_height(&mut self, height_cm: f32) {
        self.height_current = height_cm;
    }

    pub fn alarm_minutes(&self) -> u8 {
        self.alarm_minutes
    }

    pub fn set_alarm_minutes(&mut self, minutes: u8) {
        self.alarm_minutes = minutes;
    }

    /// Feed a display state
    pub fn transition(&mut self, trigger: DisplayState) -> Transition {
        let ctx = TransitionContext {
            height_changed: self.height_current != self.height_previous,
            alarm_elapsed: self.alarm_minutes == 0,
        };
        let next = self.status.transition(trigger, ctx);

        if trigger == DisplayState::Height {
            self.height_previous = self.height_current;
        }

        match next {
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "No transition available from {} on {}",
                    self.status.as_str(),
                    trigger.as_str()
                );
                Transition::Rejected
            }
            Some(to) if to == self.status => Transition::Unchanged,
            Some(to) => {
                let from = self.status;
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "Control state changed from {} to {} on trigger {}",
                    from.as_str(),
                    to.as_str(),
                    trigger.as_str()
                );
                self.status = to;
                Transition::Changed { from, to }
            }
        }
    }
}

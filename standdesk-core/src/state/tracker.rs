//! Desk state tracker
//!
//! Owns [`DeskState`]. Frames, link checks and timer updates go in, a
//! [`StateDelta`] listing the fields that actually changed comes out.

use standdesk_protocol::{DeskMessage, DisplayState, Frame, SegmentDisplay};

use super::link::LinkMonitor;
use super::machine::{ControlMachine, ControlStatus, Transition};

/// Default window in which an unchanged display is not re-processed (ms)
pub const DEFAULT_DEBOUNCE_MS: u32 = 1000;

/// Snapshot of everything known about the desk
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeskState {
    /// Valid frames arriving within the link timeout
    pub connected: bool,
    /// Desk is changing height
    pub moving: bool,
    /// Last height reading (cm)
    pub height_cm: f32,
    /// Local countdown timer running
    pub timer_active: bool,
    /// Seconds left on the local countdown
    pub timer_seconds: u8,
    /// Inferred control status
    pub control_status: ControlStatus,
    /// Desk's built-in alarm counting down
    pub alarm_active: bool,
    /// Minutes shown by the desk's alarm
    pub alarm_minutes: u8,
    /// Estimated seconds left on the desk's alarm
    pub alarm_seconds: u16,
}

/// Fields changed by one update; `None` means unchanged
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateDelta {
    pub connected: Option<bool>,
    pub moving: Option<bool>,
    pub height_cm: Option<f32>,
    pub timer_active: Option<bool>,
    pub timer_seconds: Option<u8>,
    pub control_status: Option<ControlStatus>,
    pub alarm_active: Option<bool>,
    pub alarm_minutes: Option<u8>,
    pub alarm_seconds: Option<u16>,
    /// The desk's alarm just reached zero
    pub alarm_done: bool,
}

impl StateDelta {
    /// True when nothing changed
    pub fn is_empty(&self) -> bool {
        *self == StateDelta::default()
    }

    /// Fold a later delta into this one; later values win
    pub fn merge(&mut self, later: StateDelta) {
        self.connected = later.connected.or(self.connected);
        self.moving = later.moving.or(self.moving);
        self.height_cm = later.height_cm.or(self.height_cm);
        self.timer_active = later.timer_active.or(self.timer_active);
        self.timer_seconds = later.timer_seconds.or(self.timer_seconds);
        self.control_status = later.control_status.or(self.control_status);
        self.alarm_active = later.alarm_active.or(self.alarm_active);
        self.alarm_minutes = later.alarm_minutes.or(self.alarm_minutes);
        self.alarm_seconds = later.alarm_seconds.or(self.alarm_seconds);
        self.alarm_done |= later.alarm_done;
    }
}

/// Write `value` into `slot` and return it if it differs
fn update<T: PartialEq + Copy>(slot: &mut T, value: T) -> Option<T> {
    if *slot == value {
        None
    } else {
        *slot = value;
        Some(value)
    }
}

/// Applies decoded frames to the desk state
#[derive(Debug, Clone)]
pub struct DeskTracker {
    state: DeskState,
    machine: ControlMachine,
    link: LinkMonitor,
    debounce_ms: u32,
    display: SegmentDisplay,
    /// When each display state was last processed
    triggered_at: [Option<u32>; DisplayState::COUNT],
    /// Start of the current alarm countdown estimate
    alarm_started_ms: u32,
    /// Alarm length at that start (s)
    alarm_total_s: u16,
}

impl DeskTracker {
    pub fn new(link_timeout_ms: u32, debounce_ms: u32) -> Self {
        Self {
            state: DeskState::default(),
            machine: ControlMachine::new(),
            link: LinkMonitor::new(link_timeout_ms),
            debounce_ms,
            display: SegmentDisplay::default(),
            triggered_at: [None; DisplayState::COUNT],
            alarm_started_ms: 0,
            alarm_total_s: 0,
        }
    }

    /// Current desk state
    pub fn state(&self) -> &DeskState {
        &self.state
    }

    /// Last display contents processed
    pub fn display(&self) -> SegmentDisplay {
        self.display
    }

    /// Apply one valid frame
    pub fn apply(&mut self, frame: &Frame, now_ms: u32) -> StateDelta {
        let mut delta = StateDelta::default();

        self.link.frame_received(now_ms);
        delta.connected = update(&mut self.state.connected, true);

        match DeskMessage::from_frame(frame) {
            Ok(DeskMessage::Display(display)) => {
                delta.merge(self.apply_display(display, now_ms));
            }
            Ok(DeskMessage::Key(_button)) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Key press on bus: {:?}", _button);
            }
            Ok(DeskMessage::Chatter(_msg_type)) => {}
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "Ignoring frame {=[u8]:02x}: {:?}",
                    frame.encode_to_vec().as_slice(),
                    _e
                );
            }
        }

        delta
    }

    fn apply_display(&mut self, display: SegmentDisplay, now_ms: u32) -> StateDelta {
        let mut delta = StateDelta::default();

        if display == self.display {
            let previous = self.triggered_at[display.state().index()];
            if let Some(at) = previous {
                if now_ms.wrapping_sub(at) < self.debounce_ms {
                    return delta;
                }
            }
        }

        let display_state = display.state();
        if display_state == DisplayState::Unknown && display != self.display {
            #[cfg(feature = "defmt")]
            defmt::debug!("Unrecognised display {=[u8]:02x}", &display.segments[..]);
        }
        self.display = display;
        self.triggered_at[display_state.index()] = Some(now_ms);

        match display_state {
            DisplayState::Height => {
                if let Some(height) = display.height_cm() {
                    self.machine.set_height(height);
                    delta.height_cm = update(&mut self.state.height_cm, height);
                }
            }
            DisplayState::TimerDurationOn | DisplayState::TimerDurationOnly => {
                if let Some(minutes) = display.alarm_minutes() {
                    self.machine.set_alarm_minutes(minutes);
                    delta.alarm_minutes = update(&mut self.state.alarm_minutes, minutes);
                }
            }
            DisplayState::TimerOff => {
                self.machine.set_alarm_minutes(0);
                delta.alarm_minutes = update(&mut self.state.alarm_minutes, 0);
            }
            _ => {}
        }

        if let Transition::Changed { to, .. } = self.machine.transition(display_state) {
            delta.control_status = update(&mut self.state.control_status, to);
            match to {
                ControlStatus::Off | ControlStatus::TimerOff => {
                    delta.alarm_active = update(&mut self.state.alarm_active, false);
                    delta.alarm_seconds = update(&mut self.state.alarm_seconds, 0);
                }
                ControlStatus::TimerOn => {
                    delta.alarm_active = update(&mut self.state.alarm_active, true);
                    delta.alarm_seconds = self.restart_alarm_countdown(now_ms);
                }
                ControlStatus::TimerDone => delta.alarm_done = true,
                _ => {}
            }
        } else if self.machine.status() == ControlStatus::TimerOn && delta.alarm_minutes.is_some() {
            // Display moved on a minute: resync the estimate
            delta.alarm_seconds = self.restart_alarm_countdown(now_ms);
        }

        let moving = self.machine.status().is_moving();
        delta.moving = update(&mut self.state.moving, moving);

        delta
    }

    /// Mark the link lost if no frame arrived within the timeout
    pub fn check_link(&mut self, now_ms: u32) -> StateDelta {
        let mut delta = StateDelta::default();
        if self.state.connected && !self.link.is_healthy(now_ms) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Desk link lost after {} ms of silence", self.link.silence_ms(now_ms));
            delta.connected = update(&mut self.state.connected, false);
            delta.moving = update(&mut self.state.moving, false);
        }
        delta
    }

    fn restart_alarm_countdown(&mut self, now_ms: u32) -> Option<u16> {
        self.alarm_started_ms = now_ms;
        self.alarm_total_s = self.state.alarm_minutes as u16 * 60;
        update(&mut self.state.alarm_seconds, self.alarm_total_s)
    }

    /// Advance the estimate of seconds left on the desk's alarm
    ///
    /// The desk only shows whole minutes, so the estimate counts down from
    /// the last time the displayed minutes changed.
    pub fn update_alarm_countdown(&mut self, now_ms: u32) -> StateDelta {
        if !matches!(
            self.state.control_status,
            ControlStatus::TimerOn | ControlStatus::TimerDone
        ) {
            return StateDelta::default();
        }

        let remaining = if self.state.alarm_minutes == 0 {
            0
        } else {
            let elapsed_s = now_ms.wrapping_sub(self.alarm_started_ms) / 1000;
            self.alarm_total_s
                .saturating_sub(elapsed_s.min(u16::MAX as u32) as u16)
        };

        StateDelta {
            alarm_seconds: update(&mut self.state.alarm_seconds, remaining),
            ..StateDelta::default()
        }
    }

    /// Mirror the local countdown into the state
    pub fn set_timer(&mut self, active: bool, seconds: u8) -> StateDelta {
        StateDelta {
            timer_active: update(&mut self.state.timer_active, active),
            timer_seconds: update(&mut self.state.timer_seconds, seconds),
            ..StateDelta::default()
        }
    }
}

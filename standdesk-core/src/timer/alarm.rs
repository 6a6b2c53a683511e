//! Desk alarm programming
//!
//! The control box has its own reminder alarm, set through a menu: `timer`
//! opens the duration editor, `up`/`down` step the minutes and a final
//! `timer` starts it. [`AlarmProgrammer`] walks that menu one press at a
//! time, reacting to what the display shows after each press.

use standdesk_protocol::Button;

use super::validate_duration;
use crate::error::DeskError;
use crate::state::ControlStatus;

/// Default delay before the next step when the display moved but is not yet
/// on target (ms)
pub const DEFAULT_ALARM_RETRY_MS: u32 = 108;

/// Drives the desk's alarm menu towards a target duration
#[derive(Debug, Clone)]
pub struct AlarmProgrammer {
    retry_ms: u32,
    /// Minutes being programmed, None when idle
    target: Option<u8>,
    /// Scheduled retry time
    retry_at: Option<u32>,
}

impl Default for AlarmProgrammer {
    fn default() -> Self {
        Self::new(DEFAULT_ALARM_RETRY_MS)
    }
}

impl AlarmProgrammer {
    pub fn new(retry_ms: u32) -> Self {
        Self {
            retry_ms,
            target: None,
            retry_at: None,
        }
    }

    /// Minutes being programmed
    pub fn target(&self) -> Option<u8> {
        self.target
    }

    /// Check if programming is in progress
    pub fn is_busy(&self) -> bool {
        self.target.is_some()
    }

    /// Abandon programming
    pub fn cancel(&mut self) {
        self.target = None;
        self.retry_at = None;
    }

    /// Start programming `minutes` into the desk alarm
    ///
    /// Returns the first button to press, if the desk is ready for one.
    pub fn start(
        &mut self,
        minutes: u8,
        status: ControlStatus,
        displayed: u8,
    ) -> Result<Option<Button>, DeskError> {
        let minutes = validate_duration(minutes)?;
        self.target = Some(minutes);
        self.retry_at = None;

        #[cfg(feature = "defmt")]
        defmt::info!("Programming desk alarm to {} minutes", minutes);

        Ok(self.step(status, displayed))
    }

    /// React to a control-status change
    pub fn on_status_changed(&mut self, status: ControlStatus, displayed: u8) -> Option<Button> {
        let target = self.target?;
        match status {
            ControlStatus::TimerOn if target == displayed => {
                self.cancel();
                None
            }
            ControlStatus::TimerOn
            | ControlStatus::TimerChange
            | ControlStatus::TimerDone
            | ControlStatus::Height
            | ControlStatus::Off => self.step(status, displayed),
            _ => None,
        }
    }

    /// React to the alarm minutes changing while the status stayed put
    pub fn on_minutes_changed(
        &mut self,
        status: ControlStatus,
        displayed: u8,
        now_ms: u32,
    ) -> Option<Button> {
        let target = self.target?;
        if status != ControlStatus::TimerChange {
            return None;
        }
        if displayed == target {
            self.retry_at = None;
            self.step(status, displayed)
        } else {
            // Let the display settle before stepping again
            self.retry_at = Some(now_ms.wrapping_add(self.retry_ms));
            None
        }
    }

    /// Run a scheduled retry once it is due
    pub fn poll(&mut self, now_ms: u32, status: ControlStatus, displayed: u8) -> Option<Button> {
        let due = self.retry_at?;
        // Wrapping compare: due is at most retry_ms in the future
        if now_ms.wrapping_sub(due) > u32::MAX / 2 {
            return None;
        }
        self.retry_at = None;
        self.step(status, displayed)
    }

    /// Next press for the current desk status
    fn step(&mut self, status: ControlStatus, displayed: u8) -> Option<Button> {
        let target = self.target?;
        match status {
            ControlStatus::Off
            | ControlStatus::Height
            | ControlStatus::TimerOn
            | ControlStatus::TimerDone => {
                // Opens the duration editor
                Some(Button::Timer)
            }
            ControlStatus::TimerChange => {
                if target > displayed {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Alarm is {} (target: {})", displayed, target);
                    Some(Button::Up)
                } else if target < displayed {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Alarm is {} (target: {})", displayed, target);
                    Some(Button::Down)
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::info!("Desk alarm set to {} minutes", target);
                    self.cancel();
                    Some(Button::Timer)
                }
            }
            // Wait for the desk to settle into a state that leads to the editor
            ControlStatus::TimerOff
            | ControlStatus::TimerStarting
            | ControlStatus::Memory
            | ControlStatus::Moving
            | ControlStatus::TimerMoving
            | ControlStatus::Unknown => None,
        }
    }
}

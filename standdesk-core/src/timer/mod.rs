//! Countdown timers
//!
//! - [`TimerController`]: local countdown with a one-shot done trigger
//! - [`alarm::AlarmProgrammer`]: sets the desk's own reminder alarm by
//!   pressing its buttons

pub mod alarm;

pub use alarm::AlarmProgrammer;

use crate::error::DeskError;

/// Shortest accepted duration
pub const MIN_DURATION: u8 = 1;

/// Longest accepted duration
pub const MAX_DURATION: u8 = 99;

/// Check a requested duration
pub fn validate_duration(duration: u8) -> Result<u8, DeskError> {
    if (MIN_DURATION..=MAX_DURATION).contains(&duration) {
        Ok(duration)
    } else {
        Err(DeskError::InvalidDuration(duration))
    }
}

/// Timer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// Not counting
    #[default]
    Idle,
    /// Counting down
    Running { remaining: u8 },
    /// Reached zero on the last tick
    Done,
    /// Stopped before reaching zero
    Cancelled,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerTick {
    /// Nothing running
    Idle,
    /// Still counting; seconds left
    Counting(u8),
    /// Countdown reached zero; fires once per started countdown
    Fired,
}

/// Local countdown timer
#[derive(Debug, Clone, Default)]
pub struct TimerController {
    state: TimerState,
}

impl TimerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Check if a countdown is running
    pub fn is_active(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Seconds left, 0 when not running
    pub fn remaining(&self) -> u8 {
        match self.state {
            TimerState::Running { remaining } => remaining,
            _ => 0,
        }
    }

    /// Start or restart the countdown
    ///
    /// Out-of-range durations leave the timer untouched.
    pub fn set_timer(&mut self, duration: u8) -> Result<(), DeskError> {
        let remaining = validate_duration(duration)?;
        self.state = TimerState::Running { remaining };
        Ok(())
    }

    /// Stop a running countdown without firing
    ///
    /// The timer parks in `Cancelled` until the next tick. Returns false if
    /// nothing was running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = TimerState::Cancelled;
        true
    }

    /// Advance by one second
    pub fn tick(&mut self) -> TimerTick {
        match self.state {
            TimerState::Running { remaining } if remaining > 1 => {
                self.state = TimerState::Running {
                    remaining: remaining - 1,
                };
                TimerTick::Counting(remaining - 1)
            }
            TimerState::Running { .. } => {
                self.state = TimerState::Done;
                TimerTick::Fired
            }
            TimerState::Done | TimerState::Cancelled => {
                self.state = TimerState::Idle;
                TimerTick::Idle
            }
            TimerState::Idle => TimerTick::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_timer_starts_running() {
        let mut timer = TimerController::new();
        timer.set_timer(30).unwrap();
        assert_eq!(timer.state(), TimerState::Running { remaining: 30 });
        assert!(timer.is_active());
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn test_invalid_duration_leaves_state() {
        let mut timer = TimerController::new();
        assert_eq!(timer.set_timer(0), Err(DeskError::InvalidDuration(0)));
        assert_eq!(timer.state(), TimerState::Idle);

        timer.set_timer(10).unwrap();
        assert_eq!(timer.set_timer(100), Err(DeskError::InvalidDuration(100)));
        assert_eq!(timer.state(), TimerState::Running { remaining: 10 });
    }

    #[test]
    fn test_set_timer_resets_running_countdown() {
        let mut timer = TimerController::new();
        timer.set_timer(5).unwrap();
        timer.tick();
        timer.tick();
        timer.set_timer(5).unwrap();
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn test_one_second_timer() {
        let mut timer = TimerController::new();
        timer.set_timer(1).unwrap();
        assert_eq!(timer.tick(), TimerTick::Fired);
        assert_eq!(timer.state(), TimerState::Done);
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_cancel() {
        let mut timer = TimerController::new();
        timer.set_timer(3).unwrap();
        timer.tick();
        assert!(timer.cancel());
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert!(!timer.is_active());
        assert_eq!(timer.remaining(), 0);

        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.state(), TimerState::Idle);
        for _ in 0..5 {
            assert_eq!(timer.tick(), TimerTick::Idle);
        }
        assert!(!timer.cancel());
    }

    proptest! {
        #[test]
        fn prop_fires_once_after_exactly_d_ticks(d in MIN_DURATION..=MAX_DURATION) {
            let mut timer = TimerController::new();
            timer.set_timer(d).unwrap();
            prop_assert_eq!(timer.remaining(), d);

            let mut previous = d;
            for _ in 1..d {
                match timer.tick() {
                    TimerTick::Counting(left) => {
                        prop_assert!(left < previous);
                        previous = left;
                    }
                    other => prop_assert!(false, "early {:?}", other),
                }
            }

            prop_assert_eq!(timer.tick(), TimerTick::Fired);
            prop_assert_eq!(timer.state(), TimerState::Done);

            let mut fired = 0;
            for _ in 0..200 {
                if timer.tick() == TimerTick::Fired {
                    fired += 1;
                }
            }
            prop_assert_eq!(fired, 0);
            prop_assert_eq!(timer.state(), TimerState::Idle);
        }

        #[test]
        fn prop_out_of_range_rejected(d in any::<u8>().prop_filter("out of range", |d| *d == 0 || *d > MAX_DURATION)) {
            let mut timer = TimerController::new();
            prop_assert_eq!(timer.set_timer(d), Err(DeskError::InvalidDuration(d)));
            prop_assert_eq!(timer.state(), TimerState::Idle);
        }
    }
}

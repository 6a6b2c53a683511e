//! Board-agnostic core logic for the standing desk controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - UART and observer traits
//! - Desk state tracking and the control-status state machine
//! - Local countdown timer and desk alarm programming
//! - Button dispatch
//! - The polling component tying it together
//! - Configuration type definitions and parsing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod poller;
pub mod state;
pub mod timer;
pub mod traits;

#[cfg(test)]
mod mock;

pub use config::DeskConfig;
pub use dispatch::ButtonDispatcher;
pub use error::DeskError;
pub use poller::{DeskController, LogThrottle, PollReport};
pub use state::{ControlStatus, DeskState};
pub use timer::{AlarmProgrammer, TimerController};
pub use traits::{DeskObserver, DeskUart, Fields};

//! Hardware and integration traits
//!
//! These traits define the interface between the desk logic and the
//! board-specific UART and whatever publishes state changes.

pub mod observer;
pub mod uart;

pub use observer::{DeskObserver, Fields};
pub use uart::DeskUart;

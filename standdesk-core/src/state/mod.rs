//! Desk state tracking
//!
//! Decoded frames drive an explicit, finite control-status machine; the
//! tracker folds its output, height readings and link health into a single
//! [`DeskState`].

pub mod link;
pub mod machine;
pub mod tracker;

pub use link::LinkMonitor;
pub use machine::{ControlMachine, ControlStatus, Transition};
pub use tracker::{DeskState, DeskTracker, StateDelta};

//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod desk;
pub mod indicator;
pub mod timer_button;

pub use desk::desk_task;
pub use indicator::indicator_task;
pub use timer_button::timer_button_task;

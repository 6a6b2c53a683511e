//! Configuration types
//!
//! Board-agnostic configuration structures plus the `desk.toml` parser.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;

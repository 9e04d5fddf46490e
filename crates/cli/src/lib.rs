//! Library half of the `settle` command
//!
//! Commands are implemented against generic readers and writers so they can
//! be driven from tests without a terminal.

pub mod cmd;
pub mod config;
pub mod script;
pub mod util;

//! CLI command implementations

pub mod replay;
pub mod run;
pub mod search;

//! Debounced value propagation
//!
//! This crate provides:
//! - `Debouncer<T>`, a handle that re-publishes a changing value only after
//!   it has been quiet for a configured delay (trailing edge)
//! - Serde/TOML configuration for the delay
//! - The shared error type

pub mod config;
pub mod debounce;
pub mod error;

// Re-exports
pub use config::{DebounceConfig, DEFAULT_DELAY_MS, MAX_DELAY_MS};
pub use debounce::Debouncer;
pub use error::{Error, Result};

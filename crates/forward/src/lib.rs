//! Driving debouncers from async channels
//!
//! This crate provides:
//! - `Forwarder`, which pumps observed values from an mpsc channel through a
//!   `Debouncer` and forwards settled values downstream
//! - `SearchQuery`, the validated list-view query schema
//! - `SearchDispatcher`, which issues a search only after typing pauses

pub mod dispatch;
pub mod forward;
pub mod query;

pub use dispatch::{DispatchConfig, DispatchStats, SearchBackend, SearchDispatcher};
pub use forward::{ClosePolicy, ForwardStats, Forwarder};
pub use query::{QueryError, SearchQuery};

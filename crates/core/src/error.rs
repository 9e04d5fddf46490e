//! Error types shared by the settle crates

use thiserror::Error;

/// Errors raised while setting up or driving a debouncer
#[derive(Debug, Error)]
pub enum Error {
    /// Timers need a tokio runtime; none was entered on this thread
    #[error("no tokio runtime available to schedule debounce timers")]
    NoRuntime,

    /// A configuration value is outside its valid range
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The downstream side of a forwarding channel went away
    #[error("downstream channel closed")]
    ChannelClosed,
}

/// Result type for settle operations
pub type Result<T> = std::result::Result<T, Error>;

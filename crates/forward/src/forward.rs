//! Channel-driven debouncing
//!
//! Reads observed values from an mpsc channel, runs them through a
//! [`Debouncer`], and sends every settled value downstream.

use serde::{Deserialize, Serialize};
use settle_core::{Debouncer, Error, Result};
use std::fmt;
use std::str::FromStr;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// What to do with a pending value once the input channel closes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosePolicy {
    /// Propagate the pending value immediately
    #[default]
    Flush,
    /// Wait for the pending timer to fire
    Settle,
    /// Drop the pending value
    Discard,
}

impl FromStr for ClosePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "flush" => Ok(Self::Flush),
            "settle" => Ok(Self::Settle),
            "discard" => Ok(Self::Discard),
            other => Err(format!(
                "unknown close policy '{}' (expected flush, settle or discard)",
                other
            )),
        }
    }
}

impl fmt::Display for ClosePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flush => "flush",
            Self::Settle => "settle",
            Self::Discard => "discard",
        };
        f.write_str(name)
    }
}

/// Counters reported when a forwarder stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardStats {
    /// Values read from the input channel
    pub received: u64,
    /// Settled values sent downstream
    pub forwarded: u64,
}

/// Pumps an input channel through a debouncer into an output channel
pub struct Forwarder<T> {
    /// Debouncer owned for the lifetime of the loop
    debouncer: Debouncer<T>,

    /// Observed values
    input: mpsc::Receiver<T>,

    /// Settled values
    output: mpsc::Sender<T>,

    /// Applied when `input` closes (default: flush)
    close_policy: ClosePolicy,
}

impl<T> Forwarder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a forwarder around `debouncer`
    pub fn new(debouncer: Debouncer<T>, input: mpsc::Receiver<T>, output: mpsc::Sender<T>) -> Self {
        Self {
            debouncer,
            input,
            output,
            close_policy: ClosePolicy::default(),
        }
    }

    /// Set what happens to a pending value when the input closes
    pub fn with_close_policy(mut self, close_policy: ClosePolicy) -> Self {
        self.close_policy = close_policy;
        self
    }

    /// Run until the input channel closes
    ///
    /// Fails with [`Error::ChannelClosed`] if the output receiver is dropped
    /// while a settled value is being forwarded.
    pub async fn run(self) -> Result<ForwardStats> {
        let Self {
            debouncer,
            mut input,
            output,
            close_policy,
        } = self;

        let mut settled = debouncer.subscribe();
        let mut stats = ForwardStats::default();

        info!("Starting forwarder (delay: {:?}, on close: {})", debouncer.delay(), close_policy);

        loop {
            tokio::select! {
                value = input.recv() => match value {
                    Some(value) => {
                        stats.received += 1;
                        debouncer.update(value);
                    }
                    None => break,
                },
                changed = settled.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    forward_latest(&mut settled, &output, &mut stats).await?;
                }
            }
        }

        debug!("Input closed, applying '{}' close policy", close_policy);

        match close_policy {
            ClosePolicy::Flush => {
                debouncer.flush();
            }
            ClosePolicy::Settle => {
                while debouncer.is_pending() {
                    if settled.changed().await.is_err() {
                        break;
                    }
                    forward_latest(&mut settled, &output, &mut stats).await?;
                }
            }
            ClosePolicy::Discard => {
                if debouncer.cancel() {
                    debug!("Discarded pending value on close");
                }
            }
        }

        // A value may have settled after the last select iteration
        if settled.has_changed().unwrap_or(false) {
            forward_latest(&mut settled, &output, &mut stats).await?;
        }

        debouncer.destroy();

        info!(
            "Forwarder stopped: {} received, {} forwarded",
            stats.received, stats.forwarded
        );
        Ok(stats)
    }
}

async fn forward_latest<T: Clone>(
    settled: &mut watch::Receiver<T>,
    output: &mpsc::Sender<T>,
    stats: &mut ForwardStats,
) -> Result<()> {
    let value = settled.borrow_and_update().clone();
    if output.send(value).await.is_err() {
        warn!("Downstream receiver dropped, stopping forwarder");
        return Err(Error::ChannelClosed);
    }
    stats.forwarded += 1;
    Ok(())
}

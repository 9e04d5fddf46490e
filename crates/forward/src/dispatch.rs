//! Debounced search dispatch
//!
//! Raw search box contents arrive on every keystroke; a search request is
//! issued only after typing pauses for the configured delay.

use crate::forward::{ClosePolicy, Forwarder};
use crate::query::{SearchQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use settle_core::{DebounceConfig, Debouncer, Error, Result, DEFAULT_DELAY_MS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the channel between the debouncer and the backend
const SETTLED_BUFFER: usize = 16;

/// Downstream effect of a settled search term
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run the query, returning the number of hits
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<usize>;
}

#[async_trait]
impl<B: SearchBackend + ?Sized> SearchBackend for Arc<B> {
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<usize> {
        (**self).search(query).await
    }
}

/// Dispatcher configuration
///
/// ```toml
/// [search]
/// delay_ms = 300
/// page_size = 25
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Typing pause required before searching (default: 500)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Rows requested per page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DispatchConfig {
    /// Check that values are within their valid ranges
    pub fn validate(&self) -> Result<()> {
        DebounceConfig::with_delay_ms(self.delay_ms).validate()?;
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "page_size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Counters reported when a dispatcher stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Raw inputs received
    pub keystrokes: u64,
    /// Searches that completed
    pub dispatched: u64,
    /// Searches the backend rejected
    pub failed: u64,
    /// Sum of hits over completed searches
    pub hits: u64,
}

/// Issues a search whenever the typed term settles
pub struct SearchDispatcher<B> {
    backend: B,
    config: DispatchConfig,
}

impl<B: SearchBackend> SearchDispatcher<B> {
    /// Create a dispatcher; fails if `config` is out of range
    pub fn new(backend: B, config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// Run until `input` closes
    ///
    /// Every settled term is searched from page 1. A term still pending when
    /// the input closes is searched immediately. Backend errors are logged and
    /// counted; they do not stop the dispatcher.
    pub async fn run(self, input: mpsc::Receiver<String>) -> Result<DispatchStats> {
        let debouncer = Debouncer::new(String::new(), self.config.delay())?;
        let (settled_tx, mut settled_rx) = mpsc::channel(SETTLED_BUFFER);
        let forwarder = Forwarder::new(debouncer, input, settled_tx)
            .with_close_policy(ClosePolicy::Flush);

        info!(
            "Search dispatcher started (delay: {}ms, page size: {})",
            self.config.delay_ms, self.config.page_size
        );

        let consume = async {
            let mut stats = DispatchStats::default();
            while let Some(term) = settled_rx.recv().await {
                self.dispatch(&term, &mut stats).await;
            }
            stats
        };

        let (forwarded, mut stats) = tokio::join!(forwarder.run(), consume);
        stats.keystrokes = forwarded?.received;

        info!(
            "Search dispatcher stopped: {} keystrokes, {} searches, {} failed",
            stats.keystrokes, stats.dispatched, stats.failed
        );
        Ok(stats)
    }

    async fn dispatch(&self, raw_term: &str, stats: &mut DispatchStats) {
        let query = match SearchQuery::first_page(raw_term, self.config.page_size) {
            Ok(query) => query,
            Err(e) => {
                warn!("Skipping invalid search query: {}", e);
                stats.failed += 1;
                return;
            }
        };

        debug!("Dispatching search: {}", query.to_query_string());

        match self.backend.search(&query).await {
            Ok(hits) => {
                stats.dispatched += 1;
                stats.hits += hits as u64;
            }
            Err(e) => {
                warn!("Search for {:?} failed: {:#}", query.term, e);
                stats.failed += 1;
            }
        }
    }
}

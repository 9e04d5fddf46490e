//! Treat stdin lines as search box contents and print each dispatched query

use crate::config::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use settle_forward::{DispatchConfig, DispatchStats, SearchBackend, SearchDispatcher, SearchQuery};
use std::io::Write;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

/// Backend that prints each query as a JSON line
pub struct JsonLinesBackend<W> {
    out: Mutex<W>,
}

impl<W> JsonLinesBackend<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> SearchBackend for JsonLinesBackend<W> {
    async fn search(&self, query: &SearchQuery) -> Result<usize> {
        let line = serde_json::to_string(query).context("Failed to encode query")?;
        let mut out = self.out.lock();
        writeln!(out, "{}", line).context("Failed to write query")?;
        out.flush()?;
        // Printing only; no hits to report
        Ok(0)
    }
}

pub async fn run(settings: &Settings, delay_ms: Option<u64>, page_size: Option<u32>) -> Result<()> {
    let config = settings.search_with(delay_ms, page_size)?;
    let stdin = BufReader::new(tokio::io::stdin());

    let stats = run_with(stdin, JsonLinesBackend::new(std::io::stdout()), config).await?;
    info!(
        "{} keystrokes, {} searches, {} failed",
        stats.keystrokes, stats.dispatched, stats.failed
    );
    Ok(())
}

/// Dispatch searches for lines read from `reader` against `backend`
pub async fn run_with<R, B>(reader: R, backend: B, config: DispatchConfig) -> Result<DispatchStats>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    B: SearchBackend,
{
    let input = crate::util::spawn_line_reader(reader);
    let dispatcher = SearchDispatcher::new(backend, config)?;
    Ok(dispatcher.run(input).await?)
}

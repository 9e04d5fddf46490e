//! Debounce stdin lines and print each settled line

use crate::config::Settings;
use crate::util;
use anyhow::{Context, Result};
use settle_core::{DebounceConfig, Debouncer};
use settle_forward::{ClosePolicy, ForwardStats, Forwarder};
use std::io::Write;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tracing::info;

/// Settled lines buffered before they are written out
const OUTPUT_BUFFER: usize = 64;

pub async fn run(settings: &Settings, delay_ms: Option<u64>, on_close: Option<ClosePolicy>) -> Result<()> {
    let config = settings.debounce_with(delay_ms)?;
    let close_policy = on_close.unwrap_or(settings.forward.on_close);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let stats = run_with(stdin, &mut stdout, &config, close_policy).await?;
    info!("{} lines read, {} settled", stats.received, stats.forwarded);
    Ok(())
}

/// Debounce lines from `reader`, writing each settled line to `out`
pub async fn run_with<R, W>(
    reader: R,
    out: &mut W,
    config: &DebounceConfig,
    close_policy: ClosePolicy,
) -> Result<ForwardStats>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    let input = util::spawn_line_reader(reader);
    let (output_tx, mut output_rx) = mpsc::channel(OUTPUT_BUFFER);

    let debouncer = Debouncer::from_config(String::new(), config)?;
    let forwarder = tokio::spawn(
        Forwarder::new(debouncer, input, output_tx)
            .with_close_policy(close_policy)
            .run(),
    );

    if let Err(e) = write_lines(&mut output_rx, out).await {
        forwarder.abort();
        let _ = forwarder.await;
        return Err(e);
    }

    let stats = forwarder.await.context("Forwarder task failed")??;
    Ok(stats)
}

async fn write_lines<W: Write>(output_rx: &mut mpsc::Receiver<String>, out: &mut W) -> Result<()> {
    while let Some(line) = output_rx.recv().await {
        writeln!(out, "{}", line).context("Failed to write settled line")?;
        out.flush()?;
    }
    Ok(())
}

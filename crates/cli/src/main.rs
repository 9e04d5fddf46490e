//! Settle CLI - settle command

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::{cmd, config::Settings, util};
use settle_forward::ClosePolicy;
use std::path::PathBuf;

/// Settle - propagate a changing value only once it stops changing
#[derive(Parser)]
#[command(name = "settle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./settle.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Debounce stdin lines and print each settled line
    Run {
        /// Quiet period in milliseconds (default: 500)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Pending line at end of input: flush, settle or discard
        #[arg(long)]
        on_close: Option<ClosePolicy>,
    },
    /// Treat stdin lines as search box input and print each search issued
    Search {
        /// Typing pause in milliseconds before searching (default: 500)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Rows per page, 1-100 (default: 10)
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Replay a timed TOML script and print when values settle
    Replay {
        /// Script file
        script: PathBuf,

        /// Quiet period in milliseconds (overrides the script)
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let _log_guard = util::init_logging(cli.log_file.as_deref())?;

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { delay_ms, on_close } => cmd::run::run(&settings, delay_ms, on_close).await,
        Commands::Search { delay_ms, page_size } => {
            cmd::search::run(&settings, delay_ms, page_size).await
        }
        Commands::Replay { script, delay_ms } => {
            cmd::replay::run(&settings, &script, delay_ms).await
        }
    }
}

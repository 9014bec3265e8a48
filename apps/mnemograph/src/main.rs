//! # mnemograph
//!
//! Command-line entry point for the association graph.
//!
//! ## Usage
//!
//! ```bash
//! # Commit a batch to the corpus and fold it into the live graph
//! mnemograph ingest -f batch.json
//!
//! # Regenerate the graph from the corpus
//! mnemograph rebuild
//!
//! # Inspect
//! mnemograph status
//! mnemograph neighbors -n asset-42
//! mnemograph export -o graph.json
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // MNEMOGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("MNEMOGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mnemograph=info".into());

    // Logs go to stderr so --json-mode output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

//! # mnemograph CLI Module
//!
//! ## Available Commands
//!
//! - `ingest` - Commit a batch to the corpus and apply it to the graph
//! - `rebuild` - Regenerate the graph from the corpus
//! - `status` - Show graph status
//! - `neighbors` - List the edges of one node
//! - `export` - Export the graph as JSON

mod commands;

use clap::{Parser, Subcommand};
use mnemograph::{AppError, Settings};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// mnemograph - association graph over cognitive assets
#[derive(Parser, Debug)]
#[command(name = "mnemograph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph snapshot path (overrides config and environment)
    #[arg(short = 'G', long, global = true)]
    pub graph: Option<PathBuf>,

    /// Corpus database path (overrides config and environment)
    #[arg(short = 'C', long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Structural similarity threshold in [0, 1]
    #[arg(short, long, global = true)]
    pub threshold: Option<f64>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Commit a JSON batch to the corpus and fold it into the graph
    Ingest {
        /// Path to the batch file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Discard the graph and regenerate it from the corpus
    Rebuild,

    /// Show graph status
    Status,

    /// List the edges touching a node
    Neighbors {
        /// Node id
        #[arg(short, long)]
        node: String,
    },

    /// Export the graph as JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    /// Resolve settings: defaults, config file, environment, then flags.
    pub fn settings(&self) -> Result<Settings, AppError> {
        let mut settings = Settings::load(self.config.as_deref())?;
        settings.apply_env(|key| std::env::var(key).ok())?;

        if let Some(path) = &self.graph {
            settings.graph_path.clone_from(path);
        }
        if let Some(path) = &self.corpus {
            settings.corpus_path.clone_from(path);
        }
        if let Some(threshold) = self.threshold {
            settings.structural_threshold = threshold;
        }
        Ok(settings)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let settings = cli.settings()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Ingest { file }) => cmd_ingest(&settings, json_mode, &file).await,
        Some(Commands::Rebuild) => cmd_rebuild(&settings, json_mode).await,
        Some(Commands::Neighbors { node }) => cmd_neighbors(&settings, json_mode, &node).await,
        Some(Commands::Export { output }) => cmd_export(&settings, &output).await,
        Some(Commands::Status) | None => cmd_status(&settings, json_mode).await,
    }
}

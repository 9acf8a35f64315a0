//! Keyscribe CLI - generate virtual documents from topic keywords.
//!
//! Keyscribe reads a caption table, turns each record's keywords into a
//! multi-hot vector, and asks a trained decoder to write a sentence for it.
//!
//! # Usage
//!
//! ```bash
//! # Generate documents for every caption record
//! keyscribe generate --model models/decoder.onnx --vocab data/vocab.json \
//!     --dictionary data/dict.csv --captions data/captions.csv
//!
//! # Inspect artifacts and vectorize a keyword string
//! keyscribe inspect --keywords "sport travel"
//!
//! # View configuration
//! keyscribe config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Keyscribe - generate virtual documents from topic keywords.
#[derive(Parser, Debug)]
#[command(name = "keyscribe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate documents for the caption table's keyword sets
    Generate(cli::generate::GenerateArgs),

    /// Show dictionary/vocabulary statistics and preview vectors and batches
    Inspect(cli::inspect::InspectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match keyscribe_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `keyscribe config path`."
            );
            keyscribe_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Keyscribe v{}", keyscribe_core::VERSION);

    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Inspect(args) => cli::inspect::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

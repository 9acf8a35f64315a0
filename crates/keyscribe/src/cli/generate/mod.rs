//! The `keyscribe generate` command for decoding keyword sets into documents.

mod setup;
pub mod types;

pub use types::OutputFormat;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use keyscribe_core::{Config, GeneratedDocument, OutputWriter, ProcessingStats};

use setup::setup_generator;

/// Arguments for the `generate` command.
///
/// Every option is an override: unset flags fall back to the config file.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Decoder model (ONNX)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Vocabulary JSON file
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Keyword dictionary CSV (column `keys`)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Caption table CSV (columns `val` and `tk`)
    #[arg(long)]
    pub captions: Option<PathBuf>,

    /// Samples per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Number of passes over the caption table
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Keep caption-table order instead of shuffling each epoch
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for the epoch shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum words per generated document
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Skip keywords missing from the dictionary instead of failing
    #[arg(long)]
    pub ignore_unknown_keywords: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Include the record's reference caption next to each document
    #[arg(long)]
    pub include_reference: bool,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_generator(&args, config).await?;
    let pipeline = &ctx.pipeline;

    if pipeline.dataset().is_empty() {
        tracing::warn!("No caption records to generate from");
        return Ok(());
    }
    tracing::info!(
        "Generating {} document(s) over {} epoch(s)",
        pipeline.total_documents(),
        pipeline.config().processing.num_epochs
    );

    let destination = args
        .output
        .as_deref()
        .map(|raw| PathBuf::from(shellexpand::tilde(raw).as_ref()));
    let sink: Box<dyn Write> = match &destination {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = OutputWriter::new(sink, ctx.output_format, pipeline.config().output.pretty);
    let collect = writer.needs_collection();
    let mut collected: Vec<GeneratedDocument> = Vec::new();

    let progress = create_progress_bar(pipeline.total_documents() as u64);
    let start_time = std::time::Instant::now();

    let stats = pipeline
        .run(|doc| {
            if collect {
                collected.push(doc);
            } else {
                writer.write(&doc)?;
            }

            progress.inc(1);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.1} docs/sec", progress.position() as f64 / elapsed));
            }
            Ok(())
        })
        .await;

    progress.finish_and_clear();
    let stats = stats?;

    if collect {
        writer.write_all(&collected)?;
    }
    writer.flush()?;

    if let Some(path) = destination {
        tracing::info!("Output written to {:?}", path);
    }
    print_summary(&stats);

    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    match ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        Ok(style) => pb.set_style(style.progress_chars("##-")),
        Err(e) => tracing::debug!("Progress template rejected: {e}"),
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after generation.
fn print_summary(stats: &ProcessingStats) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Documents:    {:>8}", stats.documents);
    if stats.truncated > 0 {
        eprintln!("    Truncated:    {:>8}", stats.truncated);
    }
    eprintln!("    Batches:      {:>8}", stats.batches);
    eprintln!("    Epochs:       {:>8}", stats.epochs);
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", stats.elapsed_ms as f64 / 1000.0);
    eprintln!("    Rate:         {:>7.1} docs/sec", stats.rate());
    eprintln!("  ====================================");
}

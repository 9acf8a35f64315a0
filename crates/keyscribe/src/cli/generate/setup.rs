//! Generator setup: config overrides, artifact checks, model loading.

use std::path::Path;
use std::sync::Arc;

use keyscribe_core::config::UnknownKeywordPolicy;
use keyscribe_core::{Config, OnnxPredictor, OutputFormat as CoreOutputFormat, Pipeline};

use super::GenerateArgs;

/// Everything `execute` needs once setup has succeeded.
pub(crate) struct GenerateContext {
    pub pipeline: Pipeline,
    pub output_format: CoreOutputFormat,
}

/// Apply CLI overrides, load the decoder and prepare the pipeline.
pub async fn setup_generator(args: &GenerateArgs, config: Config) -> anyhow::Result<GenerateContext> {
    let config = apply_overrides(args, config)?;

    for (label, path) in [
        ("Model", config.model_path()),
        ("Vocabulary", config.vocab_path()),
        ("Dictionary", config.dictionary_path()),
        ("Caption table", config.caption_path()),
    ] {
        ensure_exists(label, &path)?;
    }

    let output_format = resolve_format(&config)?;

    let model_path = config.model_path();
    let predictor = tokio::task::spawn_blocking(move || OnnxPredictor::load(&model_path))
        .await
        .map_err(|e| anyhow::anyhow!("Model loading task failed: {e}"))??;
    tracing::info!("Decoder loaded from {:?}", config.model_path());

    let pipeline = Pipeline::load(config, Arc::new(predictor)).await?;

    Ok(GenerateContext {
        pipeline,
        output_format,
    })
}

/// Merge command-line flags into the loaded config and validate the result.
pub(crate) fn apply_overrides(args: &GenerateArgs, mut config: Config) -> anyhow::Result<Config> {
    if let Some(path) = &args.model {
        config.general.model_path = path.clone();
    }
    if let Some(path) = &args.vocab {
        config.general.vocab_path = path.clone();
    }
    if let Some(path) = &args.dictionary {
        config.general.dictionary_path = path.clone();
    }
    if let Some(path) = &args.captions {
        config.general.caption_path = path.clone();
    }

    if let Some(batch_size) = args.batch_size {
        config.processing.batch_size = batch_size;
    }
    if let Some(workers) = args.workers {
        config.processing.parallel_workers = workers;
    }
    if let Some(epochs) = args.epochs {
        config.processing.num_epochs = epochs;
    }
    if args.no_shuffle {
        config.processing.shuffle = false;
    }
    if args.seed.is_some() {
        config.processing.seed = args.seed;
    }
    if let Some(max_len) = args.max_len {
        config.limits.max_decode_len = max_len;
    }
    if args.ignore_unknown_keywords {
        config.keywords.unknown = UnknownKeywordPolicy::Ignore;
    }

    if let Some(format) = args.format {
        config.output.format = format.to_string();
    }
    if args.include_reference {
        config.output.include_reference = true;
    }

    config.validate()?;
    Ok(config)
}

fn resolve_format(config: &Config) -> anyhow::Result<CoreOutputFormat> {
    CoreOutputFormat::parse(&config.output.format)
        .ok_or_else(|| anyhow::anyhow!("Unsupported output format: {}", config.output.format))
}

fn ensure_exists(label: &str, path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!(
            "{label} not found: {:?}\n\n  Hint: Pass the path on the command line or set it in `keyscribe config show`.",
            path
        );
    }
    Ok(())
}

//! The `keyscribe inspect` command: artifact statistics and previews.
//!
//! Nothing here touches the decoder, so it works before a model exists.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use keyscribe_core::config::UnknownKeywordPolicy;
use keyscribe_core::data::{DatasetOptions, LoadReport};
use keyscribe_core::{
    collate, CaptionDataset, Config, KeywordDictionary, PipelineError, RecordStore, Vectorizer,
    VocabularyIndex,
};
use serde::Serialize;

/// Arguments for the `inspect` command.
#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Vocabulary JSON file
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Keyword dictionary CSV
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Caption table CSV (enables record stats and the batch preview)
    #[arg(long)]
    pub captions: Option<PathBuf>,

    /// Vectorize this whitespace-separated keyword string
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Collate and describe the first batch of the caption table
    #[arg(long)]
    pub preview_batch: bool,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    dictionary_size: usize,
    vocabulary_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<LoadReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<VectorPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch: Option<BatchPreview>,
}

#[derive(Debug, Serialize)]
struct VectorPreview {
    input: String,
    active_positions: Vec<usize>,
    keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BatchPreview {
    rows: usize,
    max_len: usize,
    lengths: Vec<usize>,
    record_indices: Vec<usize>,
    packed_targets: usize,
}

/// Execute the inspect command.
pub async fn execute(args: InspectArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(path) = &args.vocab {
        config.general.vocab_path = path.clone();
    }
    if let Some(path) = &args.dictionary {
        config.general.dictionary_path = path.clone();
    }
    if let Some(path) = &args.captions {
        config.general.caption_path = path.clone();
    }

    let timeout_ms = config.limits.load_timeout_ms;
    let dictionary_path = config.dictionary_path();
    let vocab_path = config.vocab_path();
    let (dictionary, vocab) = tokio::try_join!(
        KeywordDictionary::load(&dictionary_path, timeout_ms),
        VocabularyIndex::load(&vocab_path, timeout_ms),
    )?;

    let vector = match &args.keywords {
        Some(input) => Some(preview_vector(&dictionary, config.keywords.unknown, input)?),
        None => None,
    };

    let (records, batch) = if args.captions.is_some() || args.preview_batch {
        let store = RecordStore::load(&config.caption_path(), timeout_ms).await?;
        let report = store.report();
        let batch = if args.preview_batch {
            Some(preview_batch(store, dictionary.clone(), vocab.clone(), &config).await?)
        } else {
            None
        };
        (Some(report), batch)
    } else {
        (None, None)
    };

    let report = InspectReport {
        dictionary_size: dictionary.len(),
        vocabulary_size: vocab.len(),
        records,
        vector,
        batch,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn preview_vector(
    dictionary: &KeywordDictionary,
    policy: UnknownKeywordPolicy,
    input: &str,
) -> anyhow::Result<VectorPreview> {
    let vector = match Vectorizer::new(dictionary, policy).vectorize(input, 0) {
        Ok(vector) => vector,
        Err(PipelineError::UnknownKeyword { keyword, .. }) => {
            anyhow::bail!("'{keyword}' is not in the keyword dictionary")
        }
        Err(e) => return Err(e.into()),
    };
    let active_positions = vector
        .iter()
        .enumerate()
        .filter(|(_, bit)| **bit > 0.5)
        .map(|(position, _)| position)
        .collect();

    Ok(VectorPreview {
        input: input.to_string(),
        active_positions,
        keywords: dictionary
            .keywords_for(&vector)
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

async fn preview_batch(
    store: RecordStore,
    dictionary: KeywordDictionary,
    vocab: VocabularyIndex,
    config: &Config,
) -> anyhow::Result<BatchPreview> {
    let dataset = CaptionDataset::build(
        Arc::new(store),
        Arc::new(dictionary),
        Arc::new(vocab),
        &DatasetOptions {
            parallel: config.processing.parallel_workers,
            unknown_keywords: config.keywords.unknown,
        },
    )
    .await?;

    let order = dataset.epoch_order(None);
    let Some(samples) = dataset.batches(&order, config.processing.batch_size).next() else {
        anyhow::bail!("Caption table has no usable records");
    };
    let batch = collate(&samples)?;

    Ok(BatchPreview {
        rows: batch.len(),
        max_len: batch.max_len(),
        lengths: batch.lengths.clone(),
        record_indices: batch.record_indices.clone(),
        packed_targets: batch.packed_targets().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_preview_lists_dictionary_order() {
        let dictionary = KeywordDictionary::from_keywords(["sport", "music", "travel"]);
        let preview =
            preview_vector(&dictionary, UnknownKeywordPolicy::Fatal, "travel sport travel").unwrap();
        assert_eq!(preview.active_positions, vec![0, 2]);
        assert_eq!(preview.keywords, vec!["sport", "travel"]);
    }

    #[test]
    fn vector_preview_respects_unknown_policy() {
        let dictionary = KeywordDictionary::from_keywords(["sport"]);
        let err = preview_vector(&dictionary, UnknownKeywordPolicy::Fatal, "chess").unwrap_err();
        assert!(err.to_string().contains("'chess' is not in the keyword dictionary"));
        let preview = preview_vector(&dictionary, UnknownKeywordPolicy::Ignore, "chess").unwrap();
        assert!(preview.active_positions.is_empty());
    }

    #[tokio::test]
    async fn batch_preview_sorts_longest_first() {
        use keyscribe_core::CaptionRecord;

        let store = RecordStore::from_records(vec![
            CaptionRecord::new("a cat", "cat"),
            CaptionRecord::new("a dog in the park", "dog park"),
            CaptionRecord::new("the park", "park"),
        ]);
        let dictionary = KeywordDictionary::from_keywords(["cat", "dog", "park"]);
        let vocab = VocabularyIndex::from_tokens(["a", "cat", "dog", "in", "the", "park"]);

        let preview = preview_batch(store, dictionary, vocab, &Config::default())
            .await
            .unwrap();
        assert_eq!(preview.rows, 3);
        assert_eq!(preview.lengths, vec![7, 4, 4]);
        assert_eq!(preview.record_indices, vec![1, 0, 2]);
        assert_eq!(preview.max_len, 7);
        assert_eq!(preview.packed_targets, 15);
    }
}

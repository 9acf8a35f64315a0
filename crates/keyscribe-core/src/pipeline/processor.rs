//! Pipeline orchestration: load artifacts, prepare samples, decode batches.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::data::{
    collate, CaptionDataset, DatasetOptions, KeywordDictionary, RecordStore, VocabularyIndex,
};
use crate::decode::{GenerateOptions, Generator, Predictor};
use crate::error::Result;
use crate::types::{GeneratedDocument, ProcessingStats};

/// The generation pipeline, built once from a resolved `Config`.
pub struct Pipeline {
    config: Config,
    dictionary: Arc<KeywordDictionary>,
    records: Arc<RecordStore>,
    dataset: CaptionDataset,
    generator: Generator,
}

impl Pipeline {
    /// Load dictionary, vocabulary and caption table from the configured
    /// paths, then prepare every sample.
    pub async fn load(config: Config, predictor: Arc<dyn Predictor>) -> Result<Self> {
        let timeout_ms = config.limits.load_timeout_ms;
        let dictionary_path = config.dictionary_path();
        let vocab_path = config.vocab_path();
        let caption_path = config.caption_path();

        let (dictionary, vocab, records) = tokio::try_join!(
            KeywordDictionary::load(&dictionary_path, timeout_ms),
            VocabularyIndex::load(&vocab_path, timeout_ms),
            RecordStore::load(&caption_path, timeout_ms),
        )?;

        Self::from_parts(config, dictionary, vocab, records, predictor).await
    }

    /// Build from already-loaded artifacts.
    pub async fn from_parts(
        config: Config,
        dictionary: KeywordDictionary,
        vocab: VocabularyIndex,
        records: RecordStore,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self> {
        config.validate()?;

        let dictionary = Arc::new(dictionary);
        let vocab = Arc::new(vocab);
        let records = Arc::new(records);

        let dataset = CaptionDataset::build(
            records.clone(),
            dictionary.clone(),
            vocab.clone(),
            &DatasetOptions {
                parallel: config.processing.parallel_workers,
                unknown_keywords: config.keywords.unknown,
            },
        )
        .await?;

        let generator = Generator::new(
            predictor,
            vocab,
            GenerateOptions {
                parallel: config.processing.parallel_workers,
                timeout_ms: config.limits.decode_timeout_ms,
                max_len: config.limits.max_decode_len,
            },
        );

        tracing::info!(
            "Pipeline ready: {} samples, vector width {}, batch size {}",
            dataset.len(),
            dictionary.len(),
            config.processing.batch_size
        );

        Ok(Self {
            config,
            dictionary,
            records,
            dataset,
            generator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dataset(&self) -> &CaptionDataset {
        &self.dataset
    }

    pub fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    /// Documents a full run produces (samples × epochs).
    pub fn total_documents(&self) -> usize {
        self.dataset.len() * self.config.processing.num_epochs
    }

    /// Run every epoch, handing each generated document to `on_document`.
    ///
    /// Documents arrive batch by batch in collated (length-sorted) order.
    /// An error from `on_document` stops the run.
    pub async fn run<F>(&self, mut on_document: F) -> Result<ProcessingStats>
    where
        F: FnMut(GeneratedDocument) -> Result<()>,
    {
        let start = std::time::Instant::now();
        let processing = &self.config.processing;
        let mut rng = if processing.shuffle {
            Some(match processing.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            })
        } else {
            None
        };

        let mut stats = ProcessingStats::default();
        let num_batches = self.dataset.num_batches(processing.batch_size);

        for epoch in 1..=processing.num_epochs {
            let order = self.dataset.epoch_order(rng.as_mut());

            for (step, samples) in self
                .dataset
                .batches(&order, processing.batch_size)
                .enumerate()
            {
                let batch = collate(&samples)?;
                let captions = self.generator.generate_batch(&batch).await?;

                for (row, caption) in captions.into_iter().enumerate() {
                    let record_index = batch.record_indices[row];
                    let vector = batch.vector(row);
                    let keywords = match vector.as_slice() {
                        Some(bits) => self.dictionary.keywords_for(bits).join(" "),
                        None => self.dictionary.keywords_for(&vector.to_vec()).join(" "),
                    };
                    let reference = if self.config.output.include_reference {
                        self.records.get(record_index).map(|r| r.caption.clone())
                    } else {
                        None
                    };

                    if caption.is_truncated() {
                        stats.truncated += 1;
                    }
                    stats.documents += 1;

                    on_document(GeneratedDocument {
                        epoch,
                        record_index,
                        keywords,
                        token_count: caption.words().len(),
                        truncated: caption.is_truncated(),
                        text: caption.text(),
                        reference,
                    })?;
                }

                stats.batches += 1;
                tracing::debug!(
                    "Epoch [{}/{}], Step [{}/{}]",
                    epoch,
                    processing.num_epochs,
                    step + 1,
                    num_batches
                );
            }

            stats.epochs += 1;
        }

        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }
}

//! Prepared samples and epoch-wise batching.
//!
//! Samples are built from caption records on blocking worker threads, with
//! at most `parallel_workers` chunks in flight. The dictionary and vocabulary
//! are shared read-only; chunk results are reassembled in record order.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::sync::Semaphore;

use super::dictionary::KeywordDictionary;
use super::records::RecordStore;
use super::tokenize::tokenize;
use super::vectorize::Vectorizer;
use super::vocabulary::VocabularyIndex;
use crate::config::UnknownKeywordPolicy;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Sample;

/// Records handled by one worker task.
const MIN_CHUNK_SIZE: usize = 256;

/// Options for building a dataset.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Maximum concurrent preparation tasks
    pub parallel: usize,
    /// Unknown keyword handling
    pub unknown_keywords: UnknownKeywordPolicy,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            parallel: 2,
            unknown_keywords: UnknownKeywordPolicy::Fatal,
        }
    }
}

/// All samples for one caption table.
#[derive(Debug, Clone, Default)]
pub struct CaptionDataset {
    samples: Vec<Sample>,
}

impl CaptionDataset {
    /// Vectorize and tokenize every record.
    ///
    /// The first fatal error (e.g. an unknown keyword) aborts the build.
    pub async fn build(
        records: Arc<RecordStore>,
        dictionary: Arc<KeywordDictionary>,
        vocab: Arc<VocabularyIndex>,
        options: &DatasetOptions,
    ) -> PipelineResult<Self> {
        let start = std::time::Instant::now();
        let total = records.len();
        let parallel = options.parallel.max(1);
        let chunk_size = total.div_ceil(parallel * 4).max(MIN_CHUNK_SIZE);

        let semaphore = Arc::new(Semaphore::new(parallel));
        let mut handles = Vec::with_capacity(total.div_ceil(chunk_size));

        for chunk_start in (0..total).step_by(chunk_size) {
            let chunk_end = (chunk_start + chunk_size).min(total);
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Worker {
                    message: format!("dataset semaphore closed: {e}"),
                })?;

            let records = records.clone();
            let dictionary = dictionary.clone();
            let vocab = vocab.clone();
            let policy = options.unknown_keywords;

            handles.push(tokio::task::spawn_blocking(move || {
                let result = prepare_range(
                    &records,
                    &dictionary,
                    &vocab,
                    policy,
                    chunk_start..chunk_end,
                );
                drop(permit);
                result
            }));
        }

        let mut samples = Vec::with_capacity(total);
        for handle in handles {
            let chunk = handle.await.map_err(|e| PipelineError::Worker {
                message: format!("sample preparation task failed: {e}"),
            })??;
            samples.extend(chunk);
        }

        tracing::debug!(
            "Prepared {} samples in {:?} ({} workers)",
            samples.len(),
            start.elapsed(),
            parallel
        );

        Ok(Self { samples })
    }

    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of batches one epoch yields.
    pub fn num_batches(&self, batch_size: usize) -> usize {
        self.samples.len().div_ceil(batch_size.max(1))
    }

    /// Sample visiting order for one epoch.
    ///
    /// Every sample appears exactly once. With `rng` the order is shuffled.
    pub fn epoch_order(&self, rng: Option<&mut StdRng>) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.samples.len()).collect();
        if let Some(rng) = rng {
            order.shuffle(rng);
        }
        order
    }

    /// Split an epoch order into batches of sample references.
    ///
    /// The last batch may be smaller than `batch_size`.
    pub fn batches<'a>(
        &'a self,
        order: &'a [usize],
        batch_size: usize,
    ) -> impl Iterator<Item = Vec<&'a Sample>> + 'a {
        order
            .chunks(batch_size.max(1))
            .map(move |chunk| chunk.iter().map(|&i| &self.samples[i]).collect())
    }
}

fn prepare_range(
    records: &RecordStore,
    dictionary: &KeywordDictionary,
    vocab: &VocabularyIndex,
    policy: UnknownKeywordPolicy,
    range: std::ops::Range<usize>,
) -> PipelineResult<Vec<Sample>> {
    let vectorizer = Vectorizer::new(dictionary, policy);
    records.records()[range.clone()]
        .iter()
        .zip(range)
        .map(|(record, index)| {
            let vector = vectorizer.vectorize(&record.keywords, record.line)?;
            let tokens = tokenize(&record.caption, vocab)?;
            Ok(Sample::new(vector, tokens, index))
        })
        .collect()
}

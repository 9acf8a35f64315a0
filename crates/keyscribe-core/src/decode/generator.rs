//! Batch decoding with bounded concurrency.
//!
//! Each row of a batch is decoded independently: the predictor runs on a
//! blocking worker thread, bounded by a semaphore, and every call is guarded
//! by a timeout. Results come back in row order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::caption::{decode_caption, GeneratedCaption};
use super::predictor::Predictor;
use crate::data::VocabularyIndex;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Batch;

/// Configuration for the generator.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Maximum concurrent predictor calls
    pub parallel: usize,
    /// Per-vector timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum words per caption
    pub max_len: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            parallel: 2,
            timeout_ms: 10_000,
            max_len: 20,
        }
    }
}

/// Turns keyword vectors into captions through a predictor.
pub struct Generator {
    predictor: Arc<dyn Predictor>,
    vocab: Arc<VocabularyIndex>,
    options: GenerateOptions,
}

impl Generator {
    /// `options.parallel` is lowered to the predictor's own concurrency
    /// limit when it has one.
    pub fn new(
        predictor: Arc<dyn Predictor>,
        vocab: Arc<VocabularyIndex>,
        mut options: GenerateOptions,
    ) -> Self {
        if let Some(limit) = predictor.max_concurrency() {
            if limit.max(1) < options.parallel {
                tracing::debug!(
                    "Predictor allows {} concurrent call(s); lowering decode workers from {}",
                    limit.max(1),
                    options.parallel
                );
                options.parallel = limit.max(1);
            }
        }
        Self {
            predictor,
            vocab,
            options,
        }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Decode a single keyword vector.
    pub async fn generate(&self, vector: Vec<f32>) -> PipelineResult<GeneratedCaption> {
        let ids = predict_bounded(self.predictor.clone(), vector, self.options.timeout_ms).await?;
        decode_caption(&ids, &self.vocab, self.options.max_len)
    }

    /// Decode every row of a batch. Output index `i` belongs to batch row `i`.
    ///
    /// The first failing row fails the whole batch.
    pub async fn generate_batch(&self, batch: &Batch) -> PipelineResult<Vec<GeneratedCaption>> {
        let start = std::time::Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.options.parallel.max(1)));
        let mut handles = Vec::with_capacity(batch.len());

        for row in 0..batch.len() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Worker {
                    message: format!("decode semaphore closed: {e}"),
                })?;

            let predictor = self.predictor.clone();
            let vector = batch.vector(row).to_vec();
            let timeout_ms = self.options.timeout_ms;

            handles.push(tokio::spawn(async move {
                let result = predict_bounded(predictor, vector, timeout_ms).await;
                drop(permit);
                result
            }));
        }

        let mut captions = Vec::with_capacity(handles.len());
        for handle in handles {
            let ids = handle.await.map_err(|e| PipelineError::Worker {
                message: format!("decode task failed: {e}"),
            })??;
            captions.push(decode_caption(&ids, &self.vocab, self.options.max_len)?);
        }

        tracing::debug!("Decoded batch of {} in {:?}", batch.len(), start.elapsed());
        Ok(captions)
    }
}

/// Run the predictor on a blocking thread, bounded by `timeout_ms`.
///
/// A timed-out call is abandoned; its thread finishes in the background.
async fn predict_bounded(
    predictor: Arc<dyn Predictor>,
    vector: Vec<f32>,
    timeout_ms: u64,
) -> PipelineResult<Vec<u32>> {
    let task = tokio::task::spawn_blocking(move || predictor.generate(&vector));
    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(PipelineError::Worker {
            message: format!("predictor task failed: {e}"),
        }),
        Err(_) => Err(PipelineError::Timeout {
            stage: "decode".to_string(),
            timeout_ms,
        }),
    }
}

//! The sequence model seen as a black box: keyword vector in, token ids out.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::{PipelineError, PipelineResult};

/// A trained decoder that greedily generates token ids for a keyword vector.
///
/// The stopping policy inside `generate` belongs to the model; callers still
/// cap the output length when translating ids to words.
pub trait Predictor: Send + Sync {
    fn generate(&self, vector: &[f32]) -> PipelineResult<Vec<u32>>;

    /// How many `generate` calls can make progress at once. `None` means
    /// no internal limit.
    ///
    /// The generator never runs more calls than this, so its per-call
    /// timeout does not count time spent queued behind a lock.
    fn max_concurrency(&self) -> Option<usize> {
        None
    }
}

impl<F> Predictor for F
where
    F: Fn(&[f32]) -> PipelineResult<Vec<u32>> + Send + Sync,
{
    fn generate(&self, vector: &[f32]) -> PipelineResult<Vec<u32>> {
        self(vector)
    }
}

/// Decoder exported to ONNX.
///
/// The graph takes one `f32` input of shape `[1, D]` and returns sampled ids
/// (`i64` or `i32`) shaped `[1, T]` or `[T]`. Uses a `Mutex` because
/// `Session::run` requires `&mut self`.
pub struct OnnxPredictor {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxPredictor {
    /// Load a decoder graph from an ONNX file.
    pub fn load(model_path: &Path) -> PipelineResult<Self> {
        if !model_path.exists() {
            return Err(PipelineError::FileNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to load decoder model {:?}: {e}", model_path),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "features".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "sampled_ids".to_string());

        tracing::debug!(
            "Loaded decoder from {:?} (input: {:?}, output: {:?})",
            model_path,
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl Predictor for OnnxPredictor {
    /// Runs serialize on the session mutex.
    fn max_concurrency(&self) -> Option<usize> {
        Some(1)
    }

    fn generate(&self, vector: &[f32]) -> PipelineResult<Vec<u32>> {
        let input = Value::from_array((vec![1i64, vector.len() as i64], vector.to_vec()))
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let mut session = self.session.lock().map_err(|e| PipelineError::Model {
            message: format!("Decoder session lock poisoned: {e}"),
        })?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| PipelineError::Model {
                message: format!("Decoder inference failed: {e}"),
            })?;

        let sampled = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| PipelineError::Model {
                message: format!("Decoder did not produce {}", self.output_name),
            })?
            .1;

        let (shape, ids): (Vec<i64>, Vec<i64>) = if let Ok((shape, data)) =
            sampled.try_extract_tensor::<i64>()
        {
            (shape.to_vec(), data.to_vec())
        } else {
            let (shape, data) =
                sampled
                    .try_extract_tensor::<i32>()
                    .map_err(|e| PipelineError::Model {
                        message: format!("Decoder output is not an integer tensor: {e}"),
                    })?;
            (shape.to_vec(), data.iter().map(|&id| id as i64).collect())
        };

        match shape.len() {
            1 => {}
            2 if shape[0] == 1 => {}
            _ => {
                return Err(PipelineError::Model {
                    message: format!("Unexpected decoder output shape: {:?}", shape),
                });
            }
        }

        ids.into_iter()
            .map(|id| {
                u32::try_from(id).map_err(|_| PipelineError::Model {
                    message: format!("Decoder produced invalid token id {id}"),
                })
            })
            .collect()
    }
}

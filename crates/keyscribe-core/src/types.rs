//! Core data types flowing through the Keyscribe pipeline.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// One prepared record: keyword vector plus caption token ids.
///
/// Built once per caption record and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    vector: Vec<f32>,
    tokens: Vec<u32>,
    record_index: usize,
}

impl Sample {
    /// `tokens` must include both markers, so it is never shorter than 2.
    pub fn new(vector: Vec<f32>, tokens: Vec<u32>, record_index: usize) -> Self {
        debug_assert!(
            tokens.len() >= 2,
            "sample for record {record_index} has {} token(s), expected at least 2",
            tokens.len()
        );
        Self {
            vector,
            tokens,
            record_index,
        }
    }

    /// Multi-hot keyword vector (width `D`).
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Token ids including `<start>` and `<end>`.
    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// Sequence length, counting both markers.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Zero-based index of the source caption record.
    pub fn record_index(&self) -> usize {
        self.record_index
    }
}

/// A collated, padded batch. Rows are sorted by length, longest first.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `batch_size × D` keyword vectors
    pub vectors: Array2<f32>,
    /// `batch_size × max_len` token ids, zero-padded
    pub targets: Array2<u32>,
    /// True (unpadded) length of each row
    pub lengths: Vec<usize>,
    /// Source record of each row
    pub record_indices: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Padded sequence width.
    pub fn max_len(&self) -> usize {
        self.targets.ncols()
    }

    /// Keyword vector of row `i`.
    pub fn vector(&self, i: usize) -> ArrayView1<'_, f32> {
        self.vectors.row(i)
    }

    /// Targets flattened time-major, skipping padding.
    ///
    /// At step `t` this emits `targets[i, t]` for every row still longer
    /// than `t`. Relies on lengths being non-increasing.
    pub fn packed_targets(&self) -> Vec<u32> {
        let mut packed = Vec::with_capacity(self.lengths.iter().sum());
        for t in 0..self.max_len() {
            for (i, &len) in self.lengths.iter().enumerate() {
                if len <= t {
                    break;
                }
                packed.push(self.targets[[i, t]]);
            }
        }
        packed
    }
}

/// One generated virtual document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    /// 1-based epoch this document was generated in
    pub epoch: usize,

    /// Source caption record
    pub record_index: usize,

    /// Topic keywords (dictionary order, space-joined)
    pub keywords: String,

    /// Generated sentence
    pub text: String,

    /// Number of words in `text`
    pub token_count: usize,

    /// True when decoding hit the length cap before `<end>`
    pub truncated: bool,

    /// Source caption, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub epochs: usize,
    pub batches: usize,
    pub documents: usize,
    pub truncated: usize,
    pub elapsed_ms: u64,
}

impl ProcessingStats {
    /// Documents per second.
    pub fn rate(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            self.documents as f64 / (self.elapsed_ms as f64 / 1000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_packed_targets_time_major() {
        let batch = Batch {
            vectors: Array2::zeros((3, 2)),
            targets: array![[1, 10, 11, 2], [1, 20, 2, 0], [1, 2, 0, 0]],
            lengths: vec![4, 3, 2],
            record_indices: vec![0, 1, 2],
        };
        assert_eq!(
            batch.packed_targets(),
            vec![1, 1, 1, 10, 20, 2, 11, 2, 2]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "expected at least 2")]
    fn test_sample_without_markers_is_rejected() {
        Sample::new(vec![1.0], vec![1], 0);
    }

    #[test]
    fn test_generated_document_skips_missing_reference() {
        let doc = GeneratedDocument {
            epoch: 1,
            record_index: 0,
            keywords: "sport".into(),
            text: "a game".into(),
            token_count: 2,
            truncated: false,
            reference: None,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("reference"));
    }

    #[test]
    fn test_stats_rate() {
        let stats = ProcessingStats {
            documents: 50,
            elapsed_ms: 2000,
            ..Default::default()
        };
        assert!((stats.rate() - 25.0).abs() < 1e-9);
        assert_eq!(ProcessingStats::default().rate(), 0.0);
    }
}

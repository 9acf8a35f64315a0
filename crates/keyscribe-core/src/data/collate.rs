//! Batch collation: sort by length, stack vectors, zero-pad sequences.

use std::borrow::Borrow;
use std::cmp::Reverse;

use ndarray::{s, Array2, ArrayView1};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Batch, Sample};

/// Collate samples into one padded batch.
///
/// Rows are stably sorted by sequence length, longest first, because packed
/// sequence consumers need non-increasing lengths. `lengths` and
/// `record_indices` follow the sorted order, not the input order. Padding
/// uses id 0 (`<pad>`).
pub fn collate<S: Borrow<Sample>>(samples: &[S]) -> PipelineResult<Batch> {
    if samples.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by_key(|&i| Reverse(samples[i].borrow().len()));

    let first = samples[order[0]].borrow();
    let width = first.vector().len();
    let max_len = first.len();

    let mut vectors = Array2::<f32>::zeros((samples.len(), width));
    let mut targets = Array2::<u32>::zeros((samples.len(), max_len));
    let mut lengths = Vec::with_capacity(samples.len());
    let mut record_indices = Vec::with_capacity(samples.len());

    for (row, &i) in order.iter().enumerate() {
        let sample = samples[i].borrow();
        if sample.vector().len() != width {
            return Err(PipelineError::ShapeMismatch {
                expected: width,
                found: sample.vector().len(),
                record: sample.record_index(),
            });
        }

        vectors
            .row_mut(row)
            .assign(&ArrayView1::from(sample.vector()));
        targets
            .slice_mut(s![row, ..sample.len()])
            .assign(&ArrayView1::from(sample.tokens()));

        lengths.push(sample.len());
        record_indices.push(sample.record_index());
    }

    tracing::trace!(
        "Collated batch of {} (max_len {}, width {})",
        samples.len(),
        max_len,
        width
    );

    Ok(Batch {
        vectors,
        targets,
        lengths,
        record_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize, marker: u32, record: usize) -> Sample {
        let mut tokens = vec![1];
        tokens.extend(std::iter::repeat(marker).take(len - 2));
        tokens.push(2);
        Sample::new(vec![marker as f32, 0.0, 1.0], tokens, record)
    }

    #[test]
    fn test_sorts_descending_and_reorders_rows() {
        let samples = vec![sample(5, 50, 0), sample(2, 20, 1), sample(8, 80, 2)];
        let batch = collate(&samples).unwrap();

        assert_eq!(batch.lengths, vec![8, 5, 2]);
        assert_eq!(batch.record_indices, vec![2, 0, 1]);
        assert_eq!(batch.vectors.row(0)[0], 80.0);
        assert_eq!(batch.vectors.row(1)[0], 50.0);
        assert_eq!(batch.vectors.row(2)[0], 20.0);
        assert_eq!(batch.targets.dim(), (3, 8));
    }

    #[test]
    fn test_rows_reproduce_sequences_and_pad_with_zero() {
        let samples = vec![sample(5, 50, 0), sample(2, 20, 1), sample(8, 80, 2)];
        let batch = collate(&samples).unwrap();

        assert_eq!(
            batch.targets.slice(s![0, ..8]).to_vec(),
            samples[2].tokens().to_vec()
        );
        assert_eq!(
            batch.targets.slice(s![1, ..5]).to_vec(),
            samples[0].tokens().to_vec()
        );
        assert!(batch.targets.slice(s![1, 5..]).iter().all(|&id| id == 0));
        assert!(batch.targets.slice(s![2, 2..]).iter().all(|&id| id == 0));
    }

    #[test]
    fn test_equal_lengths_keep_input_order() {
        let samples = vec![sample(3, 10, 0), sample(4, 40, 1), sample(3, 30, 2), sample(3, 20, 3)];
        let batch = collate(&samples).unwrap();
        assert_eq!(batch.record_indices, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_accepts_borrowed_samples() {
        let samples = [sample(3, 10, 0), sample(4, 40, 1)];
        let refs: Vec<&Sample> = samples.iter().collect();
        let batch = collate(&refs).unwrap();
        assert_eq!(batch.lengths, vec![4, 3]);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let samples: Vec<Sample> = vec![];
        assert!(matches!(collate(&samples), Err(PipelineError::EmptyBatch)));
    }

    #[test]
    fn test_mismatched_vector_width_is_rejected() {
        let samples = vec![
            sample(3, 10, 0),
            Sample::new(vec![1.0], vec![1, 2], 7),
        ];
        let err = collate(&samples).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShapeMismatch { expected: 3, found: 1, record: 7 }
        ));
    }
}

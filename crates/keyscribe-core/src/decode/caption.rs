//! Predicted ids → words.

use serde::Serialize;

use crate::data::VocabularyIndex;
use crate::error::{PipelineError, PipelineResult};

/// Why decoding stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The predictor produced `<end>`
    EndToken,
    /// `max_len` words were emitted without `<end>`
    LengthCap,
    /// The predictor's sequence ran out before `<end>`
    Exhausted,
}

/// Words generated for one keyword vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCaption {
    words: Vec<String>,
    stop: StopReason,
}

impl GeneratedCaption {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop
    }

    /// True if the length cap cut the caption short.
    pub fn is_truncated(&self) -> bool {
        self.stop == StopReason::LengthCap
    }

    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

enum State {
    Accumulating,
    Done(StopReason),
}

/// Translate predicted ids into a caption.
///
/// Stops at the first `<end>` (not emitted) or after `max_len` words; ids
/// after the stop point are ignored. `<start>` is skipped if the predictor
/// echoes it.
pub fn decode_caption(
    ids: &[u32],
    vocab: &VocabularyIndex,
    max_len: usize,
) -> PipelineResult<GeneratedCaption> {
    let mut words = Vec::new();
    let mut state = State::Accumulating;

    for &id in ids {
        if id == vocab.end_id() {
            state = State::Done(StopReason::EndToken);
            break;
        }
        if words.len() >= max_len {
            state = State::Done(StopReason::LengthCap);
            break;
        }
        if id == vocab.start_id() && words.is_empty() {
            continue;
        }
        let word = vocab.token(id).ok_or_else(|| PipelineError::Vocabulary {
            message: format!("predicted id {} is outside the vocabulary ({} tokens)", id, vocab.len()),
        })?;
        words.push(word.to_string());
    }

    let stop = match state {
        State::Done(reason) => reason,
        State::Accumulating if words.len() >= max_len => StopReason::LengthCap,
        State::Accumulating => StopReason::Exhausted,
    };

    Ok(GeneratedCaption { words, stop })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> VocabularyIndex {
        VocabularyIndex::from_tokens(["a", "cat", "sat", "on", "mat"])
    }

    #[test]
    fn test_stops_before_end_and_ignores_trailing_ids() {
        let vocab = vocab();
        let ids = [vocab.id("a"), vocab.id("cat"), vocab.end_id(), vocab.id("sat")];
        let caption = decode_caption(&ids, &vocab, 20).unwrap();
        assert_eq!(caption.text(), "a cat");
        assert_eq!(caption.stop_reason(), StopReason::EndToken);
        assert!(!caption.is_truncated());
    }

    #[test]
    fn test_caps_runaway_sequence() {
        let vocab = vocab();
        let ids = vec![vocab.id("cat"); 100];
        let caption = decode_caption(&ids, &vocab, 5).unwrap();
        assert_eq!(caption.words().len(), 5);
        assert!(caption.is_truncated());
    }

    #[test]
    fn test_end_right_at_cap_is_not_truncated() {
        let vocab = vocab();
        let ids = [vocab.id("a"), vocab.id("cat"), vocab.end_id()];
        let caption = decode_caption(&ids, &vocab, 2).unwrap();
        assert_eq!(caption.text(), "a cat");
        assert_eq!(caption.stop_reason(), StopReason::EndToken);

        let ids = [vocab.id("a"), vocab.id("cat"), vocab.id("sat")];
        let caption = decode_caption(&ids, &vocab, 2).unwrap();
        assert_eq!(caption.text(), "a cat");
        assert!(caption.is_truncated());
    }

    #[test]
    fn test_leading_start_is_skipped() {
        let vocab = vocab();
        let ids = [vocab.start_id(), vocab.id("a"), vocab.id("mat"), vocab.end_id()];
        assert_eq!(decode_caption(&ids, &vocab, 20).unwrap().text(), "a mat");
    }

    #[test]
    fn test_sequence_without_end_is_exhausted() {
        let vocab = vocab();
        let ids = [vocab.id("on"), vocab.id("mat")];
        let caption = decode_caption(&ids, &vocab, 20).unwrap();
        assert_eq!(caption.text(), "on mat");
        assert_eq!(caption.stop_reason(), StopReason::Exhausted);
    }

    #[test]
    fn test_immediate_end_gives_empty_text() {
        let vocab = vocab();
        let caption = decode_caption(&[vocab.end_id()], &vocab, 20).unwrap();
        assert_eq!(caption.text(), "");
    }

    #[test]
    fn test_out_of_range_id_is_error() {
        let vocab = vocab();
        let err = decode_caption(&[vocab.id("a"), 9999], &vocab, 20).unwrap_err();
        assert!(matches!(err, PipelineError::Vocabulary { .. }));
    }
}

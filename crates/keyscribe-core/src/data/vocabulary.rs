//! Frozen bidirectional token ↔ id map.
//!
//! The vocabulary is built elsewhere and shipped as a JSON artifact. It is
//! validated once on load and never mutated afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::table::read_bounded;
use crate::error::{PipelineError, PipelineResult};

pub const PAD_TOKEN: &str = "<pad>";
pub const START_TOKEN: &str = "<start>";
pub const END_TOKEN: &str = "<end>";
pub const UNK_TOKEN: &str = "<unk>";

/// On-disk layouts accepted for the vocabulary artifact.
#[derive(Deserialize)]
#[serde(untagged)]
enum VocabFile {
    Wrapped { word2idx: HashMap<String, u32> },
    Bare(HashMap<String, u32>),
}

/// Immutable bidirectional vocabulary with the four reserved tokens.
///
/// Ids are dense (`0..len`) and `<pad>` is always id 0, which is what the
/// batch collator pads with.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    word2idx: HashMap<String, u32>,
    idx2word: Vec<String>,
    start: u32,
    end: u32,
    unk: u32,
}

impl VocabularyIndex {
    /// Build a vocabulary from plain tokens.
    ///
    /// Reserved tokens take ids 0..4 (`<pad>`, `<start>`, `<end>`, `<unk>`);
    /// the remaining tokens follow in order, skipping repeats.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut idx2word: Vec<String> = [PAD_TOKEN, START_TOKEN, END_TOKEN, UNK_TOKEN]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let mut word2idx: HashMap<String, u32> = idx2word
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();

        for token in tokens {
            let token = token.as_ref();
            if !word2idx.contains_key(token) {
                word2idx.insert(token.to_string(), idx2word.len() as u32);
                idx2word.push(token.to_string());
            }
        }

        Self {
            word2idx,
            idx2word,
            start: 1,
            end: 2,
            unk: 3,
        }
    }

    /// Build from an explicit token -> id map, validating it.
    pub fn from_map(word2idx: HashMap<String, u32>) -> PipelineResult<Self> {
        let mut slots: Vec<Option<String>> = vec![None; word2idx.len()];
        for (token, &id) in &word2idx {
            let slot = slots.get_mut(id as usize).ok_or_else(|| PipelineError::Vocabulary {
                message: format!(
                    "id {} for '{}' is out of range (ids must be dense 0..{})",
                    id,
                    token,
                    word2idx.len()
                ),
            })?;
            if let Some(existing) = slot {
                return Err(PipelineError::Vocabulary {
                    message: format!("id {} assigned to both '{}' and '{}'", id, existing, token),
                });
            }
            *slot = Some(token.clone());
        }
        // Every slot is filled: ids are unique and in range, and there are len of them.
        let idx2word: Vec<String> = slots.into_iter().flatten().collect();

        let reserved = |token: &str| {
            word2idx
                .get(token)
                .copied()
                .ok_or_else(|| PipelineError::Vocabulary {
                    message: format!("missing reserved token {}", token),
                })
        };
        let pad = reserved(PAD_TOKEN)?;
        if pad != 0 {
            return Err(PipelineError::Vocabulary {
                message: format!("{} must have id 0, found {}", PAD_TOKEN, pad),
            });
        }
        let start = reserved(START_TOKEN)?;
        let end = reserved(END_TOKEN)?;
        let unk = reserved(UNK_TOKEN)?;

        Ok(Self {
            word2idx,
            idx2word,
            start,
            end,
            unk,
        })
    }

    /// Parse the JSON artifact: `{"word2idx": {...}}` or a bare token -> id object.
    pub fn from_json(content: &[u8]) -> PipelineResult<Self> {
        let file: VocabFile =
            serde_json::from_slice(content).map_err(|e| PipelineError::Vocabulary {
                message: format!("invalid vocabulary JSON: {e}"),
            })?;
        let word2idx = match file {
            VocabFile::Wrapped { word2idx } => word2idx,
            VocabFile::Bare(map) => map,
        };
        Self::from_map(word2idx)
    }

    /// Load the vocabulary artifact from disk.
    pub async fn load(path: &Path, timeout_ms: u64) -> PipelineResult<Self> {
        let bytes = read_bounded(path, timeout_ms, "vocabulary load").await?;
        let vocab = Self::from_json(&bytes)?;
        tracing::info!("Loaded vocabulary: {} tokens from {:?}", vocab.len(), path);
        Ok(vocab)
    }

    /// Id for a token, falling back to `<unk>`.
    pub fn id(&self, token: &str) -> u32 {
        self.word2idx.get(token).copied().unwrap_or(self.unk)
    }

    /// Id for a token, if present.
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.word2idx.get(token).copied()
    }

    /// Token for an id, if in range.
    pub fn token(&self, id: u32) -> Option<&str> {
        self.idx2word.get(id as usize).map(String::as_str)
    }

    pub fn pad_id(&self) -> u32 {
        0
    }

    pub fn start_id(&self) -> u32 {
        self.start
    }

    pub fn end_id(&self) -> u32 {
        self.end
    }

    pub fn unk_id(&self) -> u32 {
        self.unk
    }

    pub fn len(&self) -> usize {
        self.idx2word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx2word.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tokens_reserves_first_ids() {
        let vocab = VocabularyIndex::from_tokens(["a", "cat", "a", "sat"]);
        assert_eq!(vocab.len(), 7);
        assert_eq!(vocab.pad_id(), 0);
        assert_eq!(vocab.id(PAD_TOKEN), 0);
        assert_eq!(vocab.start_id(), 1);
        assert_eq!(vocab.end_id(), 2);
        assert_eq!(vocab.unk_id(), 3);
        assert_eq!(vocab.id("cat"), 5);
    }

    #[test]
    fn test_both_directions_are_consistent() {
        let vocab = VocabularyIndex::from_tokens(["the", "dog", "runs"]);
        for id in 0..vocab.len() as u32 {
            let token = vocab.token(id).unwrap();
            assert_eq!(vocab.id(token), id);
        }
    }

    #[test]
    fn test_unknown_token_maps_to_unk() {
        let vocab = VocabularyIndex::from_tokens(["dog"]);
        assert_eq!(vocab.id("zebra"), vocab.unk_id());
        assert_eq!(vocab.get_id("zebra"), None);
        assert_eq!(vocab.token(999), None);
    }

    #[test]
    fn test_from_json_wrapped_and_bare() {
        let wrapped = br#"{"word2idx": {"<pad>": 0, "<start>": 1, "<end>": 2, "<unk>": 3, "dog": 4}}"#;
        let vocab = VocabularyIndex::from_json(wrapped).unwrap();
        assert_eq!(vocab.token(4), Some("dog"));

        let bare = br#"{"<pad>": 0, "<unk>": 1, "<start>": 2, "<end>": 3}"#;
        let vocab = VocabularyIndex::from_json(bare).unwrap();
        assert_eq!(vocab.start_id(), 2);
        assert_eq!(vocab.unk_id(), 1);
    }

    #[test]
    fn test_rejects_missing_reserved_token() {
        let json = br#"{"<pad>": 0, "<start>": 1, "<end>": 2}"#;
        let err = VocabularyIndex::from_json(json).unwrap_err();
        assert!(err.to_string().contains("<unk>"));
    }

    #[test]
    fn test_rejects_nonzero_pad() {
        let json = br#"{"<start>": 0, "<pad>": 1, "<end>": 2, "<unk>": 3}"#;
        let err = VocabularyIndex::from_json(json).unwrap_err();
        assert!(err.to_string().contains("must have id 0"));
    }

    #[test]
    fn test_rejects_sparse_or_duplicate_ids() {
        let sparse = br#"{"<pad>": 0, "<start>": 1, "<end>": 2, "<unk>": 9}"#;
        assert!(VocabularyIndex::from_json(sparse).is_err());

        let duplicate = br#"{"<pad>": 0, "<start>": 1, "<end>": 1, "<unk>": 3}"#;
        assert!(VocabularyIndex::from_json(duplicate).is_err());
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(
            &path,
            r#"{"word2idx": {"<pad>": 0, "<start>": 1, "<end>": 2, "<unk>": 3}}"#,
        )
        .unwrap();

        let vocab = VocabularyIndex::load(&path, 1000).await.unwrap();
        assert_eq!(vocab.len(), 4);
    }
}

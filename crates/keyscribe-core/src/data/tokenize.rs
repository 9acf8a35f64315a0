//! Caption → token-id sequence.

use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use super::vocabulary::VocabularyIndex;
use crate::error::{PipelineError, PipelineResult};

/// Lowercase `text` and split it into word and punctuation tokens.
///
/// Runs of word characters and runs of punctuation each become one token,
/// so `"Hello, world!"` yields `["hello", ",", "world", "!"]`. This is close
/// to NLTK's word tokenizer but splits contractions at the apostrophe:
/// `"don't"` gives `["don", "'", "t"]`, not `["do", "n't"]`.
pub fn split_words(text: &str) -> PipelineResult<Vec<String>> {
    let lowered = text.to_lowercase();
    let mut pretokenized = PreTokenizedString::from(lowered.as_str());
    Whitespace::default()
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| PipelineError::Tokenize {
            message: e.to_string(),
        })?;

    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(word, _, _)| word.to_string())
        .collect())
}

/// Token ids for a caption: `<start>`, one id per word, `<end>`.
///
/// Words missing from the vocabulary map to `<unk>`. The result always has
/// at least two ids.
pub fn tokenize(caption: &str, vocab: &VocabularyIndex) -> PipelineResult<Vec<u32>> {
    let words = split_words(caption)?;
    let mut ids = Vec::with_capacity(words.len() + 2);
    ids.push(vocab.start_id());
    ids.extend(words.iter().map(|word| vocab.id(word)));
    ids.push(vocab.end_id());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocabulary::UNK_TOKEN;

    #[test]
    fn test_split_words_lowercases_and_separates_punctuation() {
        let words = split_words("Hello, World! A DOG.").unwrap();
        assert_eq!(words, vec!["hello", ",", "world", "!", "a", "dog", "."]);
    }

    #[test]
    fn test_contractions_split_at_the_apostrophe() {
        let words = split_words("Don't stop").unwrap();
        assert_eq!(words, vec!["don", "'", "t", "stop"]);
    }

    #[test]
    fn test_tokenize_is_bounded_by_markers() {
        let vocab = VocabularyIndex::from_tokens(["a", "dog", "runs"]);
        let ids = tokenize("A dog runs", &vocab).unwrap();
        assert_eq!(ids.first(), Some(&vocab.start_id()));
        assert_eq!(ids.last(), Some(&vocab.end_id()));
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_empty_caption_has_length_two() {
        let vocab = VocabularyIndex::from_tokens(["a"]);
        let ids = tokenize("", &vocab).unwrap();
        assert_eq!(ids, vec![vocab.start_id(), vocab.end_id()]);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let vocab = VocabularyIndex::from_tokens(["a", "dog"]);
        let ids = tokenize("a zebra", &vocab).unwrap();
        assert_eq!(ids[1], vocab.id("a"));
        assert_eq!(ids[2], vocab.unk_id());
    }

    #[test]
    fn test_round_trip_reproduces_lowercased_words() {
        let vocab = VocabularyIndex::from_tokens(["the", "cat", "sat", "on", "mat", "."]);
        let caption = "The Cat sat on the purple mat.";
        let ids = tokenize(caption, &vocab).unwrap();

        let decoded: Vec<&str> = ids[1..]
            .iter()
            .map(|&id| vocab.token(id).unwrap())
            .take_while(|&t| t != "<end>")
            .collect();
        let expected: Vec<String> = split_words(caption)
            .unwrap()
            .into_iter()
            .map(|w| {
                if vocab.get_id(&w).is_some() {
                    w
                } else {
                    UNK_TOKEN.to_string()
                }
            })
            .collect();
        assert_eq!(decoded, expected);
        assert_eq!(decoded[5], UNK_TOKEN);
    }
}

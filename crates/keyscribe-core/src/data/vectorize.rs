//! Keyword string → multi-hot vector.

use super::dictionary::KeywordDictionary;
use crate::config::UnknownKeywordPolicy;
use crate::error::{PipelineError, PipelineResult};

/// Turns whitespace-separated keyword strings into set-indicator vectors.
#[derive(Debug, Clone, Copy)]
pub struct Vectorizer<'a> {
    dictionary: &'a KeywordDictionary,
    policy: UnknownKeywordPolicy,
}

impl<'a> Vectorizer<'a> {
    pub fn new(dictionary: &'a KeywordDictionary, policy: UnknownKeywordPolicy) -> Self {
        Self { dictionary, policy }
    }

    /// Vector of width `D` with a 1 at every listed keyword's position.
    ///
    /// Repeated keywords have no extra effect. `line` only feeds the error
    /// for an unknown keyword.
    pub fn vectorize(&self, keywords: &str, line: u64) -> PipelineResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dictionary.len()];
        for keyword in keywords.split_whitespace() {
            match self.dictionary.position(keyword) {
                Some(position) => vector[position] = 1.0,
                None => match self.policy {
                    UnknownKeywordPolicy::Fatal => {
                        return Err(PipelineError::UnknownKeyword {
                            keyword: keyword.to_string(),
                            line,
                        });
                    }
                    UnknownKeywordPolicy::Ignore => {
                        tracing::debug!("Ignoring unknown keyword '{}' on line {}", keyword, line);
                    }
                },
            }
        }
        Ok(vector)
    }

    pub fn width(&self) -> usize {
        self.dictionary.len()
    }
}

//! Keyword dictionary: the ordered set of known topic keywords.
//!
//! A keyword's position in the dictionary is its bit in the multi-hot vector,
//! so the order is fixed for the lifetime of the process.

use std::collections::HashMap;
use std::path::Path;

use super::table::Table;
use crate::error::PipelineResult;

/// Column holding one keyword per row.
pub const KEYS_COLUMN: &str = "keys";

/// Ordered, de-duplicated keyword list with O(1) position lookup.
#[derive(Debug, Clone, Default)]
pub struct KeywordDictionary {
    keywords: Vec<String>,
    by_keyword: HashMap<String, usize>,
}

impl KeywordDictionary {
    /// Build a dictionary from keywords in order.
    ///
    /// Blank entries are skipped; a repeated keyword keeps its first position.
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::default();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                continue;
            }
            if dictionary.by_keyword.contains_key(keyword) {
                tracing::warn!("Duplicate dictionary keyword '{}' ignored", keyword);
                continue;
            }
            dictionary
                .by_keyword
                .insert(keyword.to_string(), dictionary.keywords.len());
            dictionary.keywords.push(keyword.to_string());
        }
        dictionary
    }

    /// Load the dictionary table (column `keys`).
    pub async fn load(path: &Path, timeout_ms: u64) -> PipelineResult<Self> {
        let table = Table::load(path, timeout_ms).await?;
        let dictionary = Self::from_table(&table)?;
        tracing::info!(
            "Loaded keyword dictionary: {} keywords ({} rows skipped)",
            dictionary.len(),
            table.skipped()
        );
        Ok(dictionary)
    }

    /// Build from an already-parsed table.
    pub fn from_table(table: &Table) -> PipelineResult<Self> {
        let column = table.column(KEYS_COLUMN)?;
        Ok(Self::from_keywords(
            table.rows().iter().map(|row| row.field(column)),
        ))
    }

    /// Vector dimensionality `D`.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Position of a keyword, if known.
    pub fn position(&self, keyword: &str) -> Option<usize> {
        self.by_keyword.get(keyword).copied()
    }

    /// Keyword at a position.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.keywords.get(index).map(String::as_str)
    }

    /// All keywords in dictionary order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords whose bit is set in `vector`, in dictionary order.
    pub fn keywords_for(&self, vector: &[f32]) -> Vec<&str> {
        vector
            .iter()
            .zip(&self.keywords)
            .filter(|(bit, _)| **bit > 0.5)
            .map(|(_, keyword)| keyword.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_input_order() {
        let dict = KeywordDictionary::from_keywords(["sport", "music", "travel"]);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.position("sport"), Some(0));
        assert_eq!(dict.position("travel"), Some(2));
        assert_eq!(dict.position("cooking"), None);
        assert_eq!(dict.get(1), Some("music"));
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let dict = KeywordDictionary::from_keywords(["a", "b", "a", " ", "c"]);
        assert_eq!(dict.keywords(), &["a", "b", "c"]);
        assert_eq!(dict.position("c"), Some(2));
    }

    #[test]
    fn test_keywords_for_vector() {
        let dict = KeywordDictionary::from_keywords(["sport", "music", "travel"]);
        assert_eq!(dict.keywords_for(&[1.0, 0.0, 1.0]), vec!["sport", "travel"]);
        assert!(dict.keywords_for(&[0.0, 0.0, 0.0]).is_empty());
    }

    #[test]
    fn test_from_table_requires_keys_column() {
        let table = Table::parse(Path::new("dict.csv"), b"words\nsport\n").unwrap();
        assert!(KeywordDictionary::from_table(&table).is_err());

        let table = Table::parse(Path::new("dict.csv"), b"keys\nsport\nmusic\n").unwrap();
        let dict = KeywordDictionary::from_table(&table).unwrap();
        assert_eq!(dict.len(), 2);
    }
}

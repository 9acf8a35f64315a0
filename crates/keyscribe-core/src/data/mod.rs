//! Data preparation: tables in, padded batches out.
//!
//! - **table**: forgiving CSV reader with header checks
//! - **records**: caption/keyword records (`val`, `tk` columns)
//! - **dictionary**: ordered keyword set defining vector width
//! - **vocabulary**: frozen token ↔ id map
//! - **vectorize**: keyword string → multi-hot vector
//! - **tokenize**: caption → token ids bounded by `<start>`/`<end>`
//! - **collate**: samples → sorted, zero-padded batch
//! - **dataset**: parallel sample preparation and epoch batching

pub mod collate;
pub mod dataset;
pub mod dictionary;
pub mod records;
pub mod table;
pub mod tokenize;
pub mod vectorize;
pub mod vocabulary;

pub use collate::collate;
pub use dataset::{CaptionDataset, DatasetOptions};
pub use dictionary::KeywordDictionary;
pub use records::{CaptionRecord, LoadReport, RecordStore};
pub use table::Table;
pub use tokenize::{split_words, tokenize};
pub use vectorize::Vectorizer;
pub use vocabulary::VocabularyIndex;

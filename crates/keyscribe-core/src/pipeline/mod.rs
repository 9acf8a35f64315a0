//! Pipeline orchestration.
//!
//! ```text
//! RecordStore → {Vectorizer, Tokenizer} → CaptionDataset → collate → Generator → documents
//! ```

pub mod processor;

pub use processor::Pipeline;

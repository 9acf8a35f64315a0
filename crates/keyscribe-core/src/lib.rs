//! Keyscribe Core - keyword-to-document generation library.
//!
//! Keyscribe turns a bag of topic keywords into a generated sentence using a
//! trained sequence decoder. The library owns the data preparation around the
//! model and the translation of its output back into text.
//!
//! # Architecture
//!
//! ```text
//! captions.csv ─┐
//! dict.csv ─────┼→ Vectorize + Tokenize → Collate → Predictor → Decode → Documents
//! vocab.json ───┘
//! ```
//!
//! The model itself is a black box behind the [`Predictor`] trait.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use keyscribe_core::{Config, OnnxPredictor, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> keyscribe_core::Result<()> {
//!     let config = Config::load()?;
//!     let predictor = Arc::new(OnnxPredictor::load(&config.model_path())?);
//!     let pipeline = Pipeline::load(config, predictor).await?;
//!
//!     pipeline
//!         .run(|doc| {
//!             println!("{} => {}", doc.keywords, doc.text);
//!             Ok(())
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use data::{
    collate, tokenize, CaptionDataset, CaptionRecord, KeywordDictionary, RecordStore,
    VocabularyIndex, Vectorizer,
};
pub use decode::{
    decode_caption, GenerateOptions, GeneratedCaption, Generator, OnnxPredictor, Predictor,
    StopReason,
};
pub use error::{ConfigError, KeyscribeError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::Pipeline;
pub use types::{Batch, GeneratedDocument, ProcessingStats, Sample};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Decoding: keyword vector → predictor → words.

pub mod caption;
pub mod generator;
pub mod predictor;

pub use caption::{decode_caption, GeneratedCaption, StopReason};
pub use generator::{GenerateOptions, Generator};
pub use predictor::{OnnxPredictor, Predictor};

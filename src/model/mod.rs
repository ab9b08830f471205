//! The language-model oracle interface.
//!
//! The sampler and trainer are written against [`LanguageModel`], an
//! opaque scoring boundary: token-id matrices in, next-token logits out.
//! Which concrete model sits behind it is irrelevant to the decoding
//! algorithm; [`EmbeddingBigramLm`] is the built-in trainable backend.

mod bigram;

use std::path::Path;

use ndarray::{Array2, Array3};
use thiserror::Error;

pub use bigram::EmbeddingBigramLm;

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("token id {id} is outside the vocabulary of {vocab_size} entries")]
    TokenOutOfRange { id: u32, vocab_size: usize },

    #[error("input batch is empty")]
    EmptyInput,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// An autoregressive scoring oracle.
///
/// `forward` maps a `(rows x len)` id matrix to `(rows x len x vocab)`
/// logits; the sampler only consumes the last-position slice. Failures are
/// fatal to the calling operation and propagate.
pub trait LanguageModel {
    /// Vocabulary size the logit axis is indexed by
    fn vocab_size(&self) -> usize;

    /// Score every position of every row
    fn forward(&self, input_ids: &Array2<u32>) -> Result<Array3<f32>>;

    /// One optimizer step on a padded batch; returns the mean next-token
    /// cross-entropy loss measured before the update.
    fn train_step(&mut self, batch: &Array2<u32>, lr: f32) -> Result<f32>;

    /// Mean next-token loss without a parameter update (validation)
    fn evaluate(&self, batch: &Array2<u32>) -> Result<f32>;

    /// Persist the model weights
    fn save(&self, path: &Path) -> Result<()>;
}

//! Resumen: train tiny language models on TV episode summaries and sample
//! new ones.
//!
//! The pipeline runs in three stages:
//!
//! 1. **Dataset** - scraped episode records are cleansed, chopped to a word
//!    budget at sentence boundaries, and framed with a sentinel token
//!    ([`text`], [`data`], [`tokenizer`]).
//! 2. **Train** - a [`model::LanguageModel`] is fit with SGD, validation
//!    checkpointing, and early stopping ([`train`]).
//! 3. **Generate** - batched autoregressive decoding with repetition
//!    penalty, temperature, top-k, and nucleus filtering ([`generate`]).
//!
//! # Example
//!
//! ```
//! use resumen::text::ChopPolicy;
//!
//! let summary = "Dr. Smith met Mr. Jones. He left. They all talked.";
//! let chopped = ChopPolicy::AtSentenceEnd.apply(summary, 6);
//! assert_eq!(chopped.as_deref(), Some("Dr. Smith met Mr. Jones."));
//! ```

pub mod cli;
pub mod data;
pub mod generate;
pub mod model;
pub mod text;
pub mod tokenizer;
pub mod train;

pub use generate::{generate_sequences, SamplingParams};
pub use model::LanguageModel;
pub use text::ChopPolicy;
pub use tokenizer::{SummaryTokenizer, Tokenizer};

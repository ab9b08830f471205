//! Tokenization for episode summaries.
//!
//! A byte-level BPE vocabulary ([`BpeTokenizer`]) maps text to integer
//! token ids, and [`SummaryTokenizer`] layers the dataset policy on top:
//! word-budget chopping, sentinel framing, and batch padding.
//!
//! One reserved **sentinel token** marks sequence start and end and doubles
//! as the padding filler, mirroring GPT-2's `<|endoftext|>` convention.
//!
//! # Example
//!
//! ```
//! use resumen::text::ChopPolicy;
//! use resumen::tokenizer::{BpeTokenizer, SummaryTokenizer, Tokenizer, TokenizerConfig};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TokenizerConfig::default().with_vocab_size(300);
//!     let mut bpe = BpeTokenizer::new(config);
//!     bpe.train(&["The probe arrives. The crew leaves."])?;
//!
//!     let tokenizer = SummaryTokenizer::new(Box::new(bpe), ChopPolicy::AtSentenceEnd, 96)?;
//!     let ids = tokenizer.preprocess("The probe arrives.")?;
//!     assert!(ids.is_some());
//!     Ok(())
//! }
//! ```

mod adapter;
mod bpe;
mod error;
mod traits;

pub use adapter::SummaryTokenizer;
pub use bpe::{BpeTokenizer, TokenizerConfig};
pub use error::{Result, TokenizerError};
pub use traits::{TokenId, Tokenizer};

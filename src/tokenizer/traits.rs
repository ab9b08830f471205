//! Tokenizer trait definition.

use super::error::Result;

/// Token ID type
pub type TokenId = u32;

/// A fixed mapping between text and integer token ids.
///
/// The vocabulary must contain the sentinel token as a unit: `encode` maps
/// every occurrence of the sentinel text to its single id, and `decode`
/// emits the sentinel text back, so callers can strip it from generated
/// output.
pub trait Tokenizer: Send + Sync {
    /// Build the vocabulary from a corpus
    fn train(&mut self, corpus: &[&str]) -> Result<()>;

    /// Encode text to token ids
    fn encode(&self, text: &str) -> Result<Vec<TokenId>>;

    /// Decode token ids to text
    fn decode(&self, ids: &[TokenId]) -> Result<String>;

    /// Vocabulary size
    fn vocab_size(&self) -> usize;

    /// Whether the vocabulary has been built
    fn is_trained(&self) -> bool;

    /// The sentinel token text (start/end marker and pad filler)
    fn sentinel(&self) -> &str;

    /// Get id for a token
    fn token_to_id(&self, token: &str) -> Option<TokenId>;
}

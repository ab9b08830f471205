//! Summary tokenizer: chopping, sentinel framing, and batch padding.

use ndarray::Array2;

use crate::text::ChopPolicy;

use super::error::{Result, TokenizerError};
use super::traits::{TokenId, Tokenizer};

/// Tokenizer adapter for episode summaries.
///
/// Wraps a vocabulary [`Tokenizer`] and applies the dataset policy on top:
/// every summary is chopped to `max_num_words` under the configured
/// [`ChopPolicy`], then framed as `"<SENTINEL> {text} <SENTINEL>"` before
/// encoding. The chop policy is fixed for the adapter's lifetime.
pub struct SummaryTokenizer {
    inner: Box<dyn Tokenizer>,
    policy: ChopPolicy,
    max_num_words: usize,
    sentinel_id: TokenId,
}

impl SummaryTokenizer {
    /// Wrap a trained vocabulary tokenizer.
    ///
    /// Fails if the vocabulary does not contain the sentinel token.
    pub fn new(
        inner: Box<dyn Tokenizer>,
        policy: ChopPolicy,
        max_num_words: usize,
    ) -> Result<Self> {
        let sentinel_id = inner
            .token_to_id(inner.sentinel())
            .ok_or_else(|| TokenizerError::MissingSentinel(inner.sentinel().to_string()))?;
        Ok(Self { inner, policy, max_num_words, sentinel_id })
    }

    /// The sentinel token id (start/end marker and pad filler)
    pub fn sentinel_id(&self) -> TokenId {
        self.sentinel_id
    }

    /// Vocabulary size of the wrapped tokenizer
    pub fn vocab_size(&self) -> usize {
        self.inner.vocab_size()
    }

    /// Chop and encode one summary for training.
    ///
    /// Returns `Ok(None)` when the chop policy signals "unchoppable"; the
    /// caller drops the record and counts it.
    pub fn preprocess(&self, text: &str) -> Result<Option<Vec<TokenId>>> {
        let Some(chopped) = self.policy.apply(text, self.max_num_words) else {
            return Ok(None);
        };

        let sentinel = self.inner.sentinel();
        let framed = format!("{sentinel} {chopped} {sentinel}");
        Ok(Some(self.inner.encode(&framed)?))
    }

    /// Encode a generation prompt: sentinel followed by the context.
    pub fn encode_prompt(&self, context: &str) -> Result<Vec<TokenId>> {
        let sentinel = self.inner.sentinel();
        self.inner.encode(&format!("{sentinel} {context}"))
    }

    /// Decode a generated id sequence, stripping all sentinel occurrences
    /// and surrounding whitespace.
    pub fn decode_stripped(&self, ids: &[TokenId]) -> Result<String> {
        let text = self.inner.decode(ids)?;
        Ok(text.replace(self.inner.sentinel(), "").trim().to_string())
    }

    /// Right-pad a batch of id sequences to a common length with the
    /// sentinel id.
    ///
    /// The common length is the longest sequence in the batch; every input
    /// sequence is an unmodified prefix of its output row. An empty batch
    /// is a precondition violation and fails loudly.
    pub fn pad_batch(&self, batch: &[Vec<TokenId>]) -> Result<Array2<TokenId>> {
        if batch.is_empty() {
            return Err(TokenizerError::EmptyBatch);
        }

        let block_size = batch.iter().map(Vec::len).max().unwrap_or(0);
        let mut padded = Array2::from_elem((batch.len(), block_size), self.sentinel_id);
        for (row, sequence) in batch.iter().enumerate() {
            for (col, &id) in sequence.iter().enumerate() {
                padded[[row, col]] = id;
            }
        }
        Ok(padded)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::tokenizer::bpe::{BpeTokenizer, TokenizerConfig};
    use proptest::prelude::*;

    fn adapter() -> SummaryTokenizer {
        let config = TokenizerConfig::default()
            .with_vocab_size(280)
            .with_min_frequency(1);
        let mut bpe = BpeTokenizer::new(config);
        bpe.train(&["abc"]).unwrap();
        SummaryTokenizer::new(Box::new(bpe), ChopPolicy::Ignore, 96).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_pad_batch_rows_share_max_length_and_keep_prefixes(
            batch in proptest::collection::vec(
                proptest::collection::vec(1u32..200, 1..24),
                1..8,
            )
        ) {
            let tokenizer = adapter();
            let padded = tokenizer.pad_batch(&batch).unwrap();
            let block_size = batch.iter().map(Vec::len).max().unwrap();

            prop_assert_eq!(padded.ncols(), block_size);
            prop_assert_eq!(padded.nrows(), batch.len());
            for (row, sequence) in batch.iter().enumerate() {
                let out = padded.row(row);
                prop_assert_eq!(&out.to_vec()[..sequence.len()], &sequence[..]);
                for &filler in &out.to_vec()[sequence.len()..] {
                    prop_assert_eq!(filler, tokenizer.sentinel_id());
                }
            }
        }
    }
}

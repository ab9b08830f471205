//! Byte-level BPE vocabulary.
//!
//! Tokens are hex-encoded byte strings merged bottom-up by pair frequency.
//! Id 0 is reserved for the sentinel token, which `encode` recognizes as a
//! literal substring and `decode` emits back as text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{Result, TokenizerError};
use super::traits::{TokenId, Tokenizer};

/// Default sentinel text, following the GPT-2 convention.
pub const DEFAULT_SENTINEL: &str = "<|endoftext|>";

/// Configuration for [`BpeTokenizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Target vocabulary size (sentinel + 256 bytes + merges)
    pub vocab_size: usize,
    /// Minimum pair frequency for a merge to be learned
    pub min_frequency: usize,
    /// Sentinel token text (start/end marker and pad filler)
    pub sentinel: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1000,
            min_frequency: 2,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl TokenizerConfig {
    /// Set target vocabulary size
    pub fn with_vocab_size(mut self, size: usize) -> Self {
        self.vocab_size = size;
        self
    }

    /// Set minimum merge frequency
    pub fn with_min_frequency(mut self, freq: usize) -> Self {
        self.min_frequency = freq;
        self
    }
}

/// Byte-level BPE tokenizer with a single reserved sentinel token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BpeTokenizer {
    config: TokenizerConfig,
    vocab: HashMap<String, TokenId>,
    id_to_token: HashMap<TokenId, String>,
    merges: Vec<(String, String)>,
    trained: bool,
}

impl BpeTokenizer {
    /// Create an untrained tokenizer
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            vocab: HashMap::new(),
            id_to_token: HashMap::new(),
            merges: Vec::new(),
            trained: false,
        }
    }

    /// Sentinel token id (always 0 once trained)
    pub fn sentinel_id(&self) -> TokenId {
        0
    }

    /// Seed the vocabulary with the sentinel and all 256 byte tokens
    fn init_vocab(&mut self) {
        let mut id: TokenId = 0;

        self.vocab.insert(self.config.sentinel.clone(), id);
        self.id_to_token.insert(id, self.config.sentinel.clone());
        id += 1;

        for byte in 0..=255u8 {
            let token = format!("{byte:02x}");
            self.vocab.insert(token.clone(), id);
            self.id_to_token.insert(id, token);
            id += 1;
        }
    }

    /// Initial byte-level tokenization of a text segment
    fn to_byte_tokens(text: &str) -> Vec<String> {
        text.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Count adjacent-pair frequencies across the working corpus
    fn pair_frequencies(tokenized: &[Vec<String>]) -> HashMap<(String, String), usize> {
        let mut freqs = HashMap::new();
        for tokens in tokenized {
            for pair in tokens.windows(2) {
                *freqs.entry((pair[0].clone(), pair[1].clone())).or_insert(0) += 1;
            }
        }
        freqs
    }

    /// Replace every occurrence of `pair` with its merged token
    fn merge_in_place(tokenized: &mut [Vec<String>], pair: &(String, String), merged: &str) {
        for tokens in tokenized.iter_mut() {
            let mut i = 0;
            while i + 1 < tokens.len() {
                if tokens[i] == pair.0 && tokens[i + 1] == pair.1 {
                    tokens[i] = merged.to_string();
                    tokens.remove(i + 1);
                } else {
                    i += 1;
                }
            }
        }
    }

    /// Apply the learned merge sequence to a fresh byte tokenization
    fn apply_merges(&self, mut tokens: Vec<String>) -> Vec<String> {
        for (a, b) in &self.merges {
            let merged = format!("{a}{b}");
            let mut i = 0;
            while i + 1 < tokens.len() {
                if &tokens[i] == a && &tokens[i + 1] == b {
                    tokens[i] = merged.clone();
                    tokens.remove(i + 1);
                } else {
                    i += 1;
                }
            }
        }
        tokens
    }

    /// Encode one sentinel-free text segment
    fn encode_segment(&self, segment: &str, ids: &mut Vec<TokenId>) {
        let tokens = self.apply_merges(Self::to_byte_tokens(segment));
        for token in &tokens {
            // Every byte token is in the vocabulary, and merges only add
            // concatenations of existing tokens, so the lookup cannot miss.
            if let Some(&id) = self.vocab.get(token) {
                ids.push(id);
            }
        }
    }

    /// Save the trained vocabulary as JSON
    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TokenizerError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a vocabulary saved with [`BpeTokenizer::save`]
    pub fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| TokenizerError::Serialization(e.to_string()))
    }
}

impl Tokenizer for BpeTokenizer {
    fn train(&mut self, corpus: &[&str]) -> Result<()> {
        self.init_vocab();

        let mut tokenized: Vec<Vec<String>> =
            corpus.iter().map(|text| Self::to_byte_tokens(text)).collect();

        while self.vocab.len() < self.config.vocab_size {
            let freqs = Self::pair_frequencies(&tokenized);
            let best = freqs
                .iter()
                .filter(|(_, &count)| count >= self.config.min_frequency)
                .max_by_key(|(_, &count)| count);

            match best {
                Some((pair, _)) => {
                    let pair = pair.clone();
                    let merged = format!("{}{}", pair.0, pair.1);
                    let id = self.vocab.len() as TokenId;
                    self.vocab.insert(merged.clone(), id);
                    self.id_to_token.insert(id, merged.clone());
                    self.merges.push(pair.clone());
                    Self::merge_in_place(&mut tokenized, &pair, &merged);
                }
                None => break,
            }
        }

        self.trained = true;
        Ok(())
    }

    fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        if !self.trained {
            return Err(TokenizerError::NotTrained);
        }

        let sentinel = &self.config.sentinel;
        let sentinel_id = self.sentinel_id();

        let mut ids = Vec::new();
        let mut rest = text;
        while let Some(pos) = rest.find(sentinel.as_str()) {
            self.encode_segment(&rest[..pos], &mut ids);
            ids.push(sentinel_id);
            rest = &rest[pos + sentinel.len()..];
        }
        self.encode_segment(rest, &mut ids);

        Ok(ids)
    }

    fn decode(&self, ids: &[TokenId]) -> Result<String> {
        if !self.trained {
            return Err(TokenizerError::NotTrained);
        }

        let mut out = String::new();
        let mut bytes: Vec<u8> = Vec::new();

        let flush = |bytes: &mut Vec<u8>, out: &mut String| -> Result<()> {
            if !bytes.is_empty() {
                let chunk = String::from_utf8(std::mem::take(bytes))
                    .map_err(|e| TokenizerError::InvalidUtf8(e.to_string()))?;
                out.push_str(&chunk);
            }
            Ok(())
        };

        for &id in ids {
            let token = self
                .id_to_token
                .get(&id)
                .ok_or(TokenizerError::InvalidTokenId(id))?;

            if token == &self.config.sentinel {
                flush(&mut bytes, &mut out)?;
                out.push_str(token);
            } else {
                for i in (0..token.len()).step_by(2) {
                    if let Ok(byte) = u8::from_str_radix(&token[i..i + 2], 16) {
                        bytes.push(byte);
                    }
                }
            }
        }
        flush(&mut bytes, &mut out)?;

        Ok(out)
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn sentinel(&self) -> &str {
        &self.config.sentinel
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.vocab.get(token).copied()
    }
}

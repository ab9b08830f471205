//! End-to-end generation tests against stub model and tokenizer backends.

use std::cell::Cell;
use std::path::Path;

use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use resumen::generate::{generate_sequences, SamplingParams};
use resumen::model::{LanguageModel, Result as ModelResult};
use resumen::text::ChopPolicy;
use resumen::tokenizer::{
    Result as TokenizerResult, SummaryTokenizer, TokenId, Tokenizer, TokenizerError,
};

/// Whitespace tokenizer over a fixed word list; the sentinel is a word.
struct WordVocab {
    words: Vec<String>,
}

impl WordVocab {
    fn new(words: &[&str]) -> Self {
        let mut all = vec!["<s>".to_string()];
        all.extend(words.iter().map(|w| w.to_string()));
        Self { words: all }
    }
}

impl Tokenizer for WordVocab {
    fn train(&mut self, _corpus: &[&str]) -> TokenizerResult<()> {
        Ok(())
    }

    fn encode(&self, text: &str) -> TokenizerResult<Vec<TokenId>> {
        text.split_whitespace()
            .map(|word| {
                self.words
                    .iter()
                    .position(|w| w == word)
                    .map(|i| i as TokenId)
                    .ok_or_else(|| TokenizerError::MissingSentinel(word.to_string()))
            })
            .collect()
    }

    fn decode(&self, ids: &[TokenId]) -> TokenizerResult<String> {
        let words: Vec<&str> = ids
            .iter()
            .map(|&id| {
                self.words
                    .get(id as usize)
                    .map(String::as_str)
                    .ok_or(TokenizerError::InvalidTokenId(id))
            })
            .collect::<TokenizerResult<_>>()?;
        Ok(words.join(" "))
    }

    fn vocab_size(&self) -> usize {
        self.words.len()
    }

    fn is_trained(&self) -> bool {
        true
    }

    fn sentinel(&self) -> &str {
        "<s>"
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.words.iter().position(|w| w == token).map(|i| i as TokenId)
    }
}

/// Stub model that always scores one favorite token highest and counts
/// forward passes.
struct FavoriteTokenModel {
    vocab_size: usize,
    favorite: u32,
    forward_calls: Cell<usize>,
}

impl LanguageModel for FavoriteTokenModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn forward(&self, input_ids: &Array2<u32>) -> ModelResult<Array3<f32>> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        let (rows, len) = input_ids.dim();
        let mut logits = Array3::zeros((rows, len, self.vocab_size));
        for r in 0..rows {
            for t in 0..len {
                logits[[r, t, self.favorite as usize]] = 10.0;
            }
        }
        Ok(logits)
    }

    fn train_step(&mut self, _batch: &Array2<u32>, _lr: f32) -> ModelResult<f32> {
        Ok(0.0)
    }

    fn evaluate(&self, _batch: &Array2<u32>) -> ModelResult<f32> {
        Ok(0.0)
    }

    fn save(&self, _path: &Path) -> ModelResult<()> {
        Ok(())
    }
}

fn word_tokenizer() -> SummaryTokenizer {
    let vocab = WordVocab::new(&["the", "crew", "arrives", "leaves", "probe"]);
    SummaryTokenizer::new(Box::new(vocab), ChopPolicy::Ignore, 96).unwrap()
}

#[test]
fn greedy_decoding_repeats_favorite_and_stops_early() {
    let tokenizer = word_tokenizer();
    let model = FavoriteTokenModel {
        vocab_size: tokenizer.vocab_size(),
        favorite: 5,
        forward_calls: Cell::new(0),
    };
    let params = SamplingParams::default()
        .with_temperature(0.0)
        .with_num_samples(3)
        .with_max_length(50);
    let mut rng = StdRng::seed_from_u64(0);

    let outputs =
        generate_sequences(&model, &tokenizer, &params, "the crew", &mut rng).unwrap();

    // Prompt is 3 ids; the favorite token ("probe") repeats after two
    // steps, so decoding stops after exactly two forward passes.
    assert_eq!(model.forward_calls.get(), 2);
    assert_eq!(outputs.len(), 3);
    for output in &outputs {
        assert_eq!(output, "the crew probe probe");
    }
}

#[test]
fn sentinel_is_stripped_from_decoded_output() {
    let tokenizer = word_tokenizer();
    let model = FavoriteTokenModel {
        vocab_size: tokenizer.vocab_size(),
        // Favorite is the sentinel itself: output should strip it all.
        favorite: 0,
        forward_calls: Cell::new(0),
    };
    let params = SamplingParams::default()
        .with_temperature(0.0)
        .with_num_samples(1)
        .with_max_length(20);
    let mut rng = StdRng::seed_from_u64(0);

    let outputs =
        generate_sequences(&model, &tokenizer, &params, "the crew", &mut rng).unwrap();
    assert_eq!(outputs[0], "the crew");
}

#[test]
fn max_length_caps_generation() {
    let tokenizer = word_tokenizer();
    let model = FavoriteTokenModel {
        vocab_size: tokenizer.vocab_size(),
        favorite: 5,
        forward_calls: Cell::new(0),
    };
    // max_length equal to the prompt length: no forward pass at all.
    let params = SamplingParams::default()
        .with_temperature(0.0)
        .with_num_samples(1)
        .with_max_length(3);
    let mut rng = StdRng::seed_from_u64(0);

    let outputs =
        generate_sequences(&model, &tokenizer, &params, "the crew", &mut rng).unwrap();
    assert_eq!(model.forward_calls.get(), 0);
    assert_eq!(outputs[0], "the crew");
}

//! Autoregressive sequence generation.
//!
//! [`generate_sequences`] runs batched decoding against any
//! [`LanguageModel`]: all candidate rows share the prompt and advance in
//! lock-step, one forward pass per emitted position. Per row, the
//! last-position logits pass through repetition penalty, temperature,
//! top-k, then top-p before selection. Temperature zero means greedy.

pub mod sampling;

use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use thiserror::Error;

use crate::model::{LanguageModel, ModelError};
use crate::tokenizer::{SummaryTokenizer, TokenizerError};

use sampling::{
    apply_repetition_penalty, argmax, sample_index, softmax, top_k_filter, top_p_filter,
};

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("prompt encoded to an empty id sequence")]
    EmptyPrompt,
}

/// Result type for generation
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Sampling hyperparameters.
///
/// Filters compose: repetition penalty, then temperature, then top-k, then
/// top-p. `top_k == 0` and `top_p == 0.0` disable the respective filter.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    /// Hard cap on total sequence length, prompt included
    pub max_length: usize,
    /// Number of candidate sequences decoded in parallel
    pub num_samples: usize,
    /// Softmax temperature; `0.0` selects greedily
    pub temperature: f32,
    /// Keep only the k most likely tokens (0 disables)
    pub top_k: usize,
    /// Nucleus threshold (0.0 disables)
    pub top_p: f32,
    /// Divisor applied to logits of already-emitted tokens (1.0 disables)
    pub repetition_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_length: 192,
            num_samples: 5,
            temperature: 1.0,
            top_k: 20,
            top_p: 0.0,
            repetition_penalty: 1.0,
        }
    }
}

impl SamplingParams {
    /// Set the total length cap
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the number of parallel candidates
    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Set the softmax temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the top-k cutoff
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the nucleus threshold
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the repetition penalty divisor
    pub fn with_repetition_penalty(mut self, repetition_penalty: f32) -> Self {
        self.repetition_penalty = repetition_penalty;
        self
    }
}

/// Decode `num_samples` continuations of `context` and return them as
/// sentinel-stripped text.
///
/// Decoding stops at `max_length` or as soon as every row repeated its own
/// last token, which on a short-context model signals degenerate output
/// with no prospect of recovery.
pub fn generate_sequences(
    model: &dyn LanguageModel,
    tokenizer: &SummaryTokenizer,
    params: &SamplingParams,
    context: &str,
    rng: &mut StdRng,
) -> Result<Vec<String>> {
    let prompt = tokenizer.encode_prompt(context)?;
    if prompt.is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }

    let rows = params.num_samples.max(1);
    let mut generated = Array2::from_shape_fn((rows, prompt.len()), |(_, col)| prompt[col]);

    while generated.ncols() < params.max_length {
        let logits = model.forward(&generated)?;
        let last = logits.index_axis(Axis(1), generated.ncols() - 1);

        let mut next = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut row_logits: Array1<f32> = last.row(row).to_owned();

            apply_repetition_penalty(
                &mut row_logits,
                generated.row(row),
                params.repetition_penalty,
            );
            if params.temperature > 0.0 {
                row_logits /= params.temperature;
            }
            top_k_filter(&mut row_logits, params.top_k);
            top_p_filter(&mut row_logits, params.top_p);

            let choice = if params.temperature == 0.0 {
                argmax(&row_logits)
            } else {
                sample_index(&softmax(&row_logits), rng)
            };
            next.push(choice as u32);
        }

        let old_len = generated.ncols();
        let mut grown = Array2::zeros((rows, old_len + 1));
        grown.slice_mut(s![.., ..old_len]).assign(&generated);
        for (row, &id) in next.iter().enumerate() {
            grown[[row, old_len]] = id;
        }
        generated = grown;

        let degenerate = (0..rows).all(|row| {
            let len = generated.ncols();
            generated[[row, len - 1]] == generated[[row, len - 2]]
        });
        if degenerate {
            break;
        }
    }

    let mut outputs = Vec::with_capacity(rows);
    for row in generated.rows() {
        let ids = row.to_vec();
        outputs.push(tokenizer.decode_stripped(&ids)?);
    }
    Ok(outputs)
}

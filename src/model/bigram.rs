//! A small trainable neural bigram language model.
//!
//! Each token is embedded and projected straight to next-token logits:
//! `logits_t = E[x_t] @ W`. The softmax cross-entropy gradient has the
//! closed form `probs - one_hot(target)`, so training is plain SGD with no
//! autograd machinery. Deliberately tiny - the point of this backend is an
//! end-to-end train/generate loop, not model quality.

use std::path::Path;

use ndarray::{s, Array1, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{LanguageModel, ModelError, Result};

/// Embedding + output-projection bigram language model.
pub struct EmbeddingBigramLm {
    vocab_size: usize,
    hidden_size: usize,
    /// Token embedding, `(vocab x hidden)`
    embedding: Array2<f32>,
    /// Output projection, `(hidden x vocab)`
    w_out: Array2<f32>,
}

/// Serialized weight state
#[derive(Serialize, Deserialize)]
struct WeightState {
    vocab_size: usize,
    hidden_size: usize,
    embedding: Vec<f32>,
    w_out: Vec<f32>,
}

impl EmbeddingBigramLm {
    /// Create a model with uniform `±1/sqrt(hidden)` initialization.
    pub fn new(vocab_size: usize, hidden_size: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (hidden_size as f32).sqrt();
        let mut init = |shape: (usize, usize)| {
            Array2::from_shape_fn(shape, |_| rng.gen_range(-bound..bound))
        };
        let embedding = init((vocab_size, hidden_size));
        let w_out = init((hidden_size, vocab_size));
        Self { vocab_size, hidden_size, embedding, w_out }
    }

    /// Hidden dimension
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Load weights saved with [`LanguageModel::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let state: WeightState =
            serde_json::from_str(&json).map_err(|e| ModelError::Serialization(e.to_string()))?;

        let embedding =
            Array2::from_shape_vec((state.vocab_size, state.hidden_size), state.embedding)
                .map_err(|e| ModelError::Serialization(e.to_string()))?;
        let w_out = Array2::from_shape_vec((state.hidden_size, state.vocab_size), state.w_out)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;

        Ok(Self {
            vocab_size: state.vocab_size,
            hidden_size: state.hidden_size,
            embedding,
            w_out,
        })
    }

    fn check_ids(&self, input_ids: &Array2<u32>) -> Result<()> {
        if input_ids.nrows() == 0 || input_ids.ncols() == 0 {
            return Err(ModelError::EmptyInput);
        }
        for &id in input_ids.iter() {
            if id as usize >= self.vocab_size {
                return Err(ModelError::TokenOutOfRange { id, vocab_size: self.vocab_size });
            }
        }
        Ok(())
    }

    fn logits_for(&self, id: u32) -> Array1<f32> {
        self.embedding.row(id as usize).dot(&self.w_out)
    }

    fn softmax(logits: &Array1<f32>) -> Array1<f32> {
        let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        let exp = logits.mapv(|v| (v - max).exp());
        let sum = exp.sum();
        exp / sum
    }

    /// Shared forward/backward pass over all next-token positions.
    ///
    /// Accumulates gradients into the provided buffers when present and
    /// returns `(total_loss, position_count)`.
    fn accumulate(
        &self,
        batch: &Array2<u32>,
        mut grads: Option<(&mut Array2<f32>, &mut Array2<f32>)>,
    ) -> (f32, usize) {
        let mut total_loss = 0.0;
        let mut count = 0usize;

        for row in batch.rows() {
            for t in 0..row.len().saturating_sub(1) {
                let input = row[t];
                let target = row[t + 1] as usize;

                let hidden = self.embedding.row(input as usize);
                let logits = hidden.dot(&self.w_out);
                let probs = Self::softmax(&logits);

                total_loss -= probs[target].max(1e-10).ln();
                count += 1;

                if let Some((d_embedding, d_w_out)) = grads.as_mut() {
                    // d_logits = probs - one_hot(target)
                    let mut d_logits = probs;
                    d_logits[target] -= 1.0;

                    // d_w_out += outer(hidden, d_logits)
                    let outer = hidden
                        .to_owned()
                        .insert_axis(Axis(1))
                        .dot(&d_logits.view().insert_axis(Axis(0)));
                    **d_w_out += &outer;

                    // d_embedding[input] += W @ d_logits
                    let d_hidden = self.w_out.dot(&d_logits);
                    let mut row_grad = d_embedding.row_mut(input as usize);
                    row_grad += &d_hidden;
                }
            }
        }

        (total_loss, count)
    }
}

impl LanguageModel for EmbeddingBigramLm {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn forward(&self, input_ids: &Array2<u32>) -> Result<Array3<f32>> {
        self.check_ids(input_ids)?;

        let (rows, len) = input_ids.dim();
        let mut logits = Array3::zeros((rows, len, self.vocab_size));
        for r in 0..rows {
            for t in 0..len {
                logits
                    .slice_mut(s![r, t, ..])
                    .assign(&self.logits_for(input_ids[[r, t]]));
            }
        }
        Ok(logits)
    }

    fn train_step(&mut self, batch: &Array2<u32>, lr: f32) -> Result<f32> {
        self.check_ids(batch)?;

        let mut d_embedding = Array2::zeros((self.vocab_size, self.hidden_size));
        let mut d_w_out = Array2::zeros((self.hidden_size, self.vocab_size));
        let (total_loss, count) = self.accumulate(batch, Some((&mut d_embedding, &mut d_w_out)));

        if count == 0 {
            return Ok(0.0);
        }

        let scale = lr / count as f32;
        self.embedding -= &(&d_embedding * scale);
        self.w_out -= &(&d_w_out * scale);

        Ok(total_loss / count as f32)
    }

    fn evaluate(&self, batch: &Array2<u32>) -> Result<f32> {
        self.check_ids(batch)?;
        let (total_loss, count) = self.accumulate(batch, None);
        if count == 0 {
            return Ok(0.0);
        }
        Ok(total_loss / count as f32)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let state = WeightState {
            vocab_size: self.vocab_size,
            hidden_size: self.hidden_size,
            embedding: self.embedding.iter().copied().collect(),
            w_out: self.w_out.iter().copied().collect(),
        };
        let json = serde_json::to_string(&state)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;

    fn model(vocab: usize) -> EmbeddingBigramLm {
        let mut rng = StdRng::seed_from_u64(7);
        EmbeddingBigramLm::new(vocab, 8, &mut rng)
    }

    #[test]
    fn test_forward_shape() {
        let model = model(16);
        let input = array![[0u32, 1, 2], [3, 4, 5]];
        let logits = model.forward(&input).unwrap();
        assert_eq!(logits.shape(), &[2, 3, 16]);
        assert!(logits.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_forward_rejects_out_of_vocab_ids() {
        let model = model(16);
        let input = array![[0u32, 99]];
        assert!(matches!(
            model.forward(&input),
            Err(ModelError::TokenOutOfRange { id: 99, .. })
        ));
    }

    #[test]
    fn test_forward_rejects_empty_input() {
        let model = model(16);
        let input = Array2::<u32>::zeros((0, 0));
        assert!(matches!(model.forward(&input), Err(ModelError::EmptyInput)));
    }

    #[test]
    fn test_train_step_loss_matches_evaluate() {
        let mut model = model(16);
        let batch = array![[0u32, 1, 2, 3], [3, 2, 1, 0]];
        let before = model.evaluate(&batch).unwrap();
        let reported = model.train_step(&batch, 0.1).unwrap();
        assert_relative_eq!(before, reported, max_relative = 1e-5);
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut model = model(8);
        let batch = array![[0u32, 1, 2, 3, 0, 1, 2, 3]];
        let initial = model.evaluate(&batch).unwrap();
        for _ in 0..50 {
            model.train_step(&batch, 0.5).unwrap();
        }
        let trained = model.evaluate(&batch).unwrap();
        assert!(
            trained < initial,
            "loss did not improve: {initial} -> {trained}"
        );
    }

    #[test]
    fn test_single_column_batch_has_zero_loss() {
        let mut model = model(8);
        let batch = array![[0u32], [1]];
        assert_eq!(model.train_step(&batch, 0.1).unwrap(), 0.0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let model = model(12);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.save(&path).unwrap();

        let loaded = EmbeddingBigramLm::load(&path).unwrap();
        assert_eq!(loaded.vocab_size(), 12);
        assert_eq!(loaded.hidden_size(), 8);

        let input = array![[0u32, 5, 11]];
        let a = model.forward(&input).unwrap();
        let b = loaded.forward(&input).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, max_relative = 1e-6);
        }
    }
}

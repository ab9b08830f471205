//! Shallow training loop with checkpointing and early stopping.
//!
//! One step is one optimizer update on one padded batch. Every
//! `checkpoint_steps` steps the trainer measures validation loss, saves the
//! model when it improved, and optionally prints monitor generations so a
//! human can watch the output degenerate or sharpen over time.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::SummaryDataset;
use crate::generate::{generate_sequences, GenerateError, SamplingParams};
use crate::model::{LanguageModel, ModelError};
use crate::tokenizer::{SummaryTokenizer, TokenizerError};

/// Training errors
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("training set is empty")]
    EmptyTrainSet,
}

/// Result type for training operations
pub type Result<T> = std::result::Result<T, TrainError>;

/// Training hyperparameters.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Sequences per optimizer step
    pub batch_size: usize,
    /// Learning rate for plain SGD
    pub learning_rate: f32,
    /// Hard cap on optimizer steps
    pub max_steps: usize,
    /// Steps between validation checkpoints
    pub checkpoint_steps: usize,
    /// Checkpoints without validation improvement before stopping
    pub early_stopping_patience: usize,
    /// Seed for batch shuffling and monitor sampling
    pub seed: u64,
    /// Where improved checkpoints are written
    pub save_path: PathBuf,
    /// Sampling parameters for monitor generations
    pub sampling: SamplingParams,
    /// Suppress progress output and monitor generations
    pub quiet: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            learning_rate: 5e-5,
            max_steps: 100_000,
            checkpoint_steps: 100,
            early_stopping_patience: 3,
            seed: 0,
            save_path: PathBuf::from("model.json"),
            sampling: SamplingParams::default(),
            quiet: false,
        }
    }
}

impl TrainConfig {
    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the step cap
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the checkpoint interval
    pub fn with_checkpoint_steps(mut self, checkpoint_steps: usize) -> Self {
        self.checkpoint_steps = checkpoint_steps.max(1);
        self
    }

    /// Set the early-stopping patience
    pub fn with_early_stopping_patience(mut self, patience: usize) -> Self {
        self.early_stopping_patience = patience;
        self
    }

    /// Set the shuffle/sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the checkpoint path
    pub fn with_save_path(mut self, save_path: PathBuf) -> Self {
        self.save_path = save_path;
        self
    }

    /// Set monitor sampling parameters
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Suppress progress output
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Mutable training progress, checkpoint to checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainState {
    /// Optimizer steps taken so far
    pub steps: usize,
    /// Best validation loss observed
    pub min_val_loss: f32,
    /// Consecutive checkpoints without improvement
    pub stale_checkpoints: usize,
    /// Whether patience ran out
    pub stop_early: bool,
    /// Mean train loss per checkpoint window
    pub train_loss: Vec<f32>,
    /// Validation loss per checkpoint
    pub val_loss: Vec<f32>,
}

impl Default for TrainState {
    fn default() -> Self {
        Self {
            steps: 0,
            min_val_loss: f32::INFINITY,
            stale_checkpoints: 0,
            stop_early: false,
            train_loss: Vec::new(),
            val_loss: Vec::new(),
        }
    }
}

impl TrainState {
    /// Record one checkpoint. Returns `true` when validation loss improved
    /// (the caller should save the model); sets `stop_early` once
    /// `patience` consecutive checkpoints went without improvement.
    pub fn update(&mut self, patience: usize, train_loss: f32, val_loss: f32) -> bool {
        self.train_loss.push(train_loss);
        self.val_loss.push(val_loss);

        let improved = val_loss < self.min_val_loss;
        if improved {
            self.min_val_loss = val_loss;
            self.stale_checkpoints = 0;
        } else {
            self.stale_checkpoints += 1;
            if self.stale_checkpoints >= patience {
                self.stop_early = true;
            }
        }
        improved
    }
}

/// Drives [`LanguageModel::train_step`] over shuffled batches.
pub struct Trainer {
    config: TrainConfig,
    rng: StdRng,
    state: TrainState,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng, state: TrainState::default() }
    }

    /// Final training state (loss curves, step counts)
    pub fn state(&self) -> &TrainState {
        &self.state
    }

    fn mean_val_loss(
        &self,
        model: &dyn LanguageModel,
        tokenizer: &SummaryTokenizer,
        val: &SummaryDataset,
    ) -> Result<Option<f32>> {
        if val.is_empty() {
            return Ok(None);
        }
        let mut total = 0.0;
        let mut batches = 0usize;
        for batch in val.batches(self.config.batch_size) {
            let padded = tokenizer.pad_batch(batch)?;
            total += model.evaluate(&padded)?;
            batches += 1;
        }
        Ok(Some(total / batches as f32))
    }

    /// Train until `max_steps` or early stopping, whichever comes first.
    ///
    /// When the validation set is empty the checkpoint uses the train-loss
    /// window mean instead, so early stopping still has a signal.
    pub fn run<M: LanguageModel>(
        &mut self,
        model: &mut M,
        tokenizer: &SummaryTokenizer,
        train: &SummaryDataset,
        val: &SummaryDataset,
    ) -> Result<()> {
        if train.is_empty() {
            return Err(TrainError::EmptyTrainSet);
        }

        let mut window_losses: Vec<f32> = Vec::new();

        'epochs: loop {
            let mut order: Vec<usize> = (0..train.len()).collect();
            order.shuffle(&mut self.rng);

            for indices in order.chunks(self.config.batch_size) {
                let batch: Vec<Vec<u32>> = indices
                    .iter()
                    .map(|&i| train.sequences()[i].clone())
                    .collect();
                let padded = tokenizer.pad_batch(&batch)?;

                let loss = model.train_step(&padded, self.config.learning_rate)?;
                window_losses.push(loss);
                self.state.steps += 1;

                if self.state.steps % self.config.checkpoint_steps == 0 {
                    let window_mean =
                        window_losses.iter().sum::<f32>() / window_losses.len() as f32;
                    window_losses.clear();

                    let val_loss = self
                        .mean_val_loss(model, tokenizer, val)?
                        .unwrap_or(window_mean);

                    let improved = self.state.update(
                        self.config.early_stopping_patience,
                        window_mean,
                        val_loss,
                    );
                    if improved {
                        model.save(&self.config.save_path)?;
                    }

                    if !self.config.quiet {
                        println!(
                            "step {}: train loss {window_mean:.4}, val loss {val_loss:.4}",
                            self.state.steps
                        );
                        let samples = generate_sequences(
                            model,
                            tokenizer,
                            &self.config.sampling,
                            "",
                            &mut self.rng,
                        )?;
                        for sample in &samples {
                            println!("  > {sample}");
                        }
                    }

                    if self.state.stop_early {
                        break 'epochs;
                    }
                }

                if self.state.steps >= self.config.max_steps {
                    break 'epochs;
                }
            }
        }

        Ok(())
    }
}

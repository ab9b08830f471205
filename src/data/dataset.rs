//! Tokenized summary datasets and the train/validation split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::{DataError, EpisodeRecord, Result};
use crate::tokenizer::{SummaryTokenizer, TokenId};

/// A collection of tokenized, sentinel-framed summary sequences.
#[derive(Debug, Clone, Default)]
pub struct SummaryDataset {
    sequences: Vec<Vec<TokenId>>,
}

impl SummaryDataset {
    pub fn new(sequences: Vec<Vec<TokenId>>) -> Self {
        Self { sequences }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Length of the longest sequence
    pub fn max_seq_len(&self) -> usize {
        self.sequences.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn sequences(&self) -> &[Vec<TokenId>] {
        &self.sequences
    }

    /// Iterate over batches of at most `batch_size` sequences
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = &[Vec<TokenId>]> {
        self.sequences.chunks(batch_size.max(1))
    }
}

/// Result of [`build_datasets`]: the split plus bookkeeping counts.
#[derive(Debug)]
pub struct DatasetSplit {
    pub train: SummaryDataset,
    pub val: SummaryDataset,
    /// Records dropped for a missing summary or an unchoppable one
    pub dropped: usize,
    /// Total records considered
    pub total: usize,
}

/// Tokenize the usable records and split them into train and validation
/// sets.
///
/// Records without a summary, and records the chop policy marks
/// unchoppable, are dropped and counted. Surviving sequences are shuffled
/// with the caller's seeded generator, then the first `val_split` fraction
/// becomes the validation set. A non-zero `val_split` gets at least one
/// validation sequence whenever two or more survive.
pub fn build_datasets(
    records: &[EpisodeRecord],
    tokenizer: &SummaryTokenizer,
    val_split: f32,
    rng: &mut StdRng,
) -> Result<DatasetSplit> {
    let mut sequences = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(summary) = &record.episode_summary else {
            dropped += 1;
            continue;
        };
        match tokenizer.preprocess(summary)? {
            Some(ids) => sequences.push(ids),
            None => dropped += 1,
        }
    }

    sequences.shuffle(rng);

    // Ratios outside [0, 1] would index past the end below.
    let val_split = val_split.clamp(0.0, 1.0);
    let mut val_len = (sequences.len() as f32 * val_split) as usize;
    val_len = val_len.min(sequences.len());
    if val_split > 0.0 && val_len == 0 && sequences.len() >= 2 {
        val_len = 1;
    }

    let train: Vec<Vec<TokenId>> = sequences.split_off(val_len);
    let val = sequences;

    if train.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    Ok(DatasetSplit {
        train: SummaryDataset::new(train),
        val: SummaryDataset::new(val),
        dropped,
        total: records.len(),
    })
}

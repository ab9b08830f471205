//! Dataset command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::cli::args::DatasetArgs;
use crate::data::{load_records, save_records};
use crate::tokenizer::{BpeTokenizer, Tokenizer, TokenizerConfig};

pub fn run_dataset(args: DatasetArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Loading records from {}", args.records.display()),
    );

    let mut records =
        load_records(&args.records).map_err(|e| format!("Dataset error: {e}"))?;
    let total = records.len();

    for record in &mut records {
        record.cleanse();
    }
    let with_summary = records
        .iter()
        .filter(|r| r.episode_summary.is_some())
        .count();

    save_records(&args.output, &records).map_err(|e| format!("Dataset error: {e}"))?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Cleansed {total} records ({with_summary} with summaries) -> {}",
            args.output.display()
        ),
    );

    // Train the vocabulary on every cleansed summary.
    let corpus: Vec<&str> = records
        .iter()
        .filter_map(|r| r.episode_summary.as_deref())
        .collect();
    if corpus.is_empty() {
        return Err("Dataset error: no summaries to train the tokenizer on".to_string());
    }

    let config = TokenizerConfig::default()
        .with_vocab_size(args.vocab_size)
        .with_min_frequency(args.min_frequency);
    let mut tokenizer = BpeTokenizer::new(config);
    tokenizer
        .train(&corpus)
        .map_err(|e| format!("Tokenizer error: {e}"))?;

    let vocab_out = args
        .vocab_out
        .to_str()
        .ok_or_else(|| "Tokenizer error: vocabulary path is not valid UTF-8".to_string())?;
    tokenizer
        .save(vocab_out)
        .map_err(|e| format!("Tokenizer error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Trained tokenizer with {} tokens -> {vocab_out}",
            tokenizer.vocab_size()
        ),
    );
    Ok(())
}

//! Train command implementation

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::cli::args::TrainArgs;
use crate::data::{build_datasets, load_records};
use crate::model::EmbeddingBigramLm;
use crate::tokenizer::{BpeTokenizer, SummaryTokenizer};
use crate::train::{TrainConfig, Trainer};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Training on {}", args.records.display()),
    );

    let records = load_records(&args.records).map_err(|e| format!("Dataset error: {e}"))?;

    let vocab = args
        .vocab
        .to_str()
        .ok_or_else(|| "Tokenizer error: vocabulary path is not valid UTF-8".to_string())?;
    let bpe = BpeTokenizer::load(vocab).map_err(|e| format!("Tokenizer error: {e}"))?;
    let tokenizer =
        SummaryTokenizer::new(Box::new(bpe), args.chop_policy.into(), args.max_num_words)
            .map_err(|e| format!("Tokenizer error: {e}"))?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let split = build_datasets(&records, &tokenizer, args.val_split, &mut rng)
        .map_err(|e| format!("Dataset error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "{} train / {} val sequences ({} of {} records dropped)",
            split.train.len(),
            split.val.len(),
            split.dropped,
            split.total
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("  Longest train sequence: {} tokens", split.train.max_seq_len()),
    );

    let mut model = EmbeddingBigramLm::new(tokenizer.vocab_size(), args.hidden_size, &mut rng);

    let config = TrainConfig::default()
        .with_batch_size(args.batch_size)
        .with_learning_rate(args.lr)
        .with_max_steps(args.max_steps)
        .with_checkpoint_steps(args.checkpoint_steps)
        .with_early_stopping_patience(args.patience)
        .with_seed(args.seed)
        .with_save_path(args.output.clone())
        .with_quiet(level == LogLevel::Quiet);
    let mut trainer = Trainer::new(config);

    trainer
        .run(&mut model, &tokenizer, &split.train, &split.val)
        .map_err(|e| format!("Training error: {e}"))?;

    let state = trainer.state();
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} steps, best val loss {:.4} -> {}",
            state.steps,
            state.min_val_loss,
            args.output.display()
        ),
    );
    Ok(())
}

//! CLI argument types - Cli, Command, and per-command argument structs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::text::ChopPolicy;

/// Resumen: episode summary language modeling
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "resumen")]
#[command(version)]
#[command(about = "Train tiny language models on TV episode summaries and sample new ones")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Cleanse scraped episode records and build the tokenizer vocabulary
    Dataset(DatasetArgs),

    /// Train a model on episode summaries
    Train(TrainArgs),

    /// Sample episode summaries from a trained model
    Generate(GenerateArgs),
}

/// Summary chopping policy, as a command-line value
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChopPolicyArg {
    /// Truncate at the last sentence end within the budget; drop the
    /// record when no sentence end fits
    ChopAtSentenceEnd,
    /// Truncate at exactly the word budget
    Chop,
    /// Keep the full summary
    Ignore,
}

impl From<ChopPolicyArg> for ChopPolicy {
    fn from(arg: ChopPolicyArg) -> Self {
        match arg {
            ChopPolicyArg::ChopAtSentenceEnd => ChopPolicy::AtSentenceEnd,
            ChopPolicyArg::Chop => ChopPolicy::Fixed,
            ChopPolicyArg::Ignore => ChopPolicy::Ignore,
        }
    }
}

/// Arguments for the dataset command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DatasetArgs {
    /// Path to the scraped episode records (JSON array)
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Write cleansed records here
    #[arg(short, long, default_value = "episodes_clean.json")]
    pub output: PathBuf,

    /// Write the trained tokenizer vocabulary here
    #[arg(long, default_value = "vocab.json")]
    pub vocab_out: PathBuf,

    /// Target tokenizer vocabulary size
    #[arg(long, default_value_t = 1000)]
    pub vocab_size: usize,

    /// Minimum pair frequency for a merge to be learned
    #[arg(long, default_value_t = 2)]
    pub min_frequency: usize,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to cleansed episode records (JSON array)
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Path to the tokenizer vocabulary
    #[arg(long, default_value = "vocab.json")]
    pub vocab: PathBuf,

    /// Where the best checkpoint is written
    #[arg(short, long, default_value = "model.json")]
    pub output: PathBuf,

    /// Summary chopping policy
    #[arg(long, value_enum, default_value_t = ChopPolicyArg::ChopAtSentenceEnd)]
    pub chop_policy: ChopPolicyArg,

    /// Word budget for summary chopping
    #[arg(long, default_value_t = 96)]
    pub max_num_words: usize,

    /// Hidden dimension of the model
    #[arg(long, default_value_t = 64)]
    pub hidden_size: usize,

    /// Sequences per optimizer step
    #[arg(short, long, default_value_t = 4)]
    pub batch_size: usize,

    /// Fraction of sequences held out for validation
    #[arg(long, default_value_t = 0.1)]
    pub val_split: f32,

    /// Learning rate
    #[arg(long, default_value_t = 5e-5)]
    pub lr: f32,

    /// Hard cap on optimizer steps
    #[arg(long, default_value_t = 100_000)]
    pub max_steps: usize,

    /// Steps between validation checkpoints
    #[arg(long, default_value_t = 100)]
    pub checkpoint_steps: usize,

    /// Checkpoints without improvement before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Random seed for shuffling, splitting, and monitor sampling
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Arguments for the generate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct GenerateArgs {
    /// Path to a trained model checkpoint
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Path to the tokenizer vocabulary
    #[arg(long, default_value = "vocab.json")]
    pub vocab: PathBuf,

    /// Text the generated summaries continue from
    #[arg(short, long, default_value = "")]
    pub context: String,

    /// Number of summaries to generate
    #[arg(short, long, default_value_t = 5)]
    pub num_samples: usize,

    /// Hard cap on total sequence length
    #[arg(long, default_value_t = 192)]
    pub max_length: usize,

    /// Softmax temperature (0 selects greedily)
    #[arg(short, long, default_value_t = 1.0)]
    pub temperature: f32,

    /// Keep only the k most likely tokens (0 disables)
    #[arg(long, default_value_t = 20)]
    pub top_k: usize,

    /// Nucleus threshold (0 disables)
    #[arg(long, default_value_t = 0.0)]
    pub top_p: f32,

    /// Repetition penalty divisor (1 disables)
    #[arg(long, default_value_t = 1.0)]
    pub repetition_penalty: f32,

    /// Random seed for sampling
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chop_policy_arg_maps_to_policy() {
        assert_eq!(
            ChopPolicy::from(ChopPolicyArg::ChopAtSentenceEnd),
            ChopPolicy::AtSentenceEnd
        );
        assert_eq!(ChopPolicy::from(ChopPolicyArg::Chop), ChopPolicy::Fixed);
        assert_eq!(ChopPolicy::from(ChopPolicyArg::Ignore), ChopPolicy::Ignore);
    }

    #[test]
    fn test_train_defaults() {
        let cli = Cli::parse_from(["resumen", "train", "episodes.json"]);
        let Command::Train(args) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(args.chop_policy, ChopPolicyArg::ChopAtSentenceEnd);
        assert_eq!(args.max_num_words, 96);
        assert_eq!(args.batch_size, 4);
        assert_eq!(args.checkpoint_steps, 100);
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::parse_from(["resumen", "generate", "model.json"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.num_samples, 5);
        assert_eq!(args.max_length, 192);
        assert_eq!(args.top_k, 20);
        assert_eq!(args.top_p, 0.0);
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["resumen", "generate", "model.json", "--quiet"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }
}

//! Generate command implementation

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::cli::args::GenerateArgs;
use crate::generate::{generate_sequences, SamplingParams};
use crate::model::EmbeddingBigramLm;
use crate::text::ChopPolicy;
use crate::tokenizer::{BpeTokenizer, SummaryTokenizer};

pub fn run_generate(args: GenerateArgs, level: LogLevel) -> Result<(), String> {
    let vocab = args
        .vocab
        .to_str()
        .ok_or_else(|| "Tokenizer error: vocabulary path is not valid UTF-8".to_string())?;
    let bpe = BpeTokenizer::load(vocab).map_err(|e| format!("Tokenizer error: {e}"))?;
    // Chopping only applies to training data; generation never chops.
    let tokenizer = SummaryTokenizer::new(Box::new(bpe), ChopPolicy::Ignore, usize::MAX)
        .map_err(|e| format!("Tokenizer error: {e}"))?;

    let model =
        EmbeddingBigramLm::load(&args.model).map_err(|e| format!("Model error: {e}"))?;

    let params = SamplingParams::default()
        .with_max_length(args.max_length)
        .with_num_samples(args.num_samples)
        .with_temperature(args.temperature)
        .with_top_k(args.top_k)
        .with_top_p(args.top_p)
        .with_repetition_penalty(args.repetition_penalty);

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Sampling {} sequences (temperature {}, top-k {}, top-p {})",
            params.num_samples, params.temperature, params.top_k, params.top_p
        ),
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let outputs = generate_sequences(&model, &tokenizer, &params, &args.context, &mut rng)
        .map_err(|e| format!("Generation error: {e}"))?;

    for output in &outputs {
        println!("{output}");
    }
    Ok(())
}

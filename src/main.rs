//! Run the Bigram Pipeline on a Text Corpus
//!
//! Loads a text file, builds a character vocabulary, evaluates a randomly
//! initialized bigram model over random batches, and generates a text
//! sample. Per-step metrics are written to `eval_log.csv`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- input.txt
//! ```
//!
//! Any plain-text file works; a classic choice is the tiny Shakespeare
//! corpus:
//! ```bash
//! curl -o input.txt https://raw.githubusercontent.com/karpathy/char-rnn/master/data/tinyshakespeare/input.txt
//! ```

use cobweb::pipeline::{run, PipelineConfig};
use cobweb::TrainingLogger;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "input.txt".to_string());

    println!("\n{}", "=".repeat(70));
    println!("  Character-Level Bigram Language Model");
    println!("{}", "=".repeat(70));
    println!();

    // ========================================================================
    // 1. Load Corpus
    // ========================================================================
    println!("{}", "=".repeat(70));
    println!("1. Loading Corpus");
    println!("{}", "=".repeat(70));
    println!();

    let text = fs::read_to_string(&path).map_err(|_| {
        format!(
            "{} not found. Download a corpus with:\n  \
             curl -o input.txt https://raw.githubusercontent.com/karpathy/char-rnn/master/data/tinyshakespeare/input.txt",
            path
        )
    })?;

    println!("Loaded: {} bytes", text.len());
    println!("Characters: {}", text.chars().count());

    // ========================================================================
    // 2. Evaluate and Generate
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("2. Evaluating and Generating");
    println!("{}", "=".repeat(70));
    println!();

    let config = PipelineConfig::default();
    println!("Configuration:");
    println!("  Batch size: {}", config.batch_size);
    println!("  Block size: {}", config.block_size);
    println!("  Train fraction: {:.0}%", config.train_fraction * 100.0);
    println!("  Evaluation steps: {}", config.eval_steps);
    println!("  Generated tokens: {}", config.max_new_tokens);
    println!("  Seed: {}", config.seed);
    println!();

    let mut logger = TrainingLogger::new("eval_log.csv")?;
    let report = run(&text, &config, Some(&mut logger))?;

    // ========================================================================
    // 3. Report
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("3. Results");
    println!("{}", "=".repeat(70));
    println!();

    println!("Vocabulary ({} characters): {:?}", report.vocab_size, report.vocab);
    println!(
        "Split: {} train / {} validation tokens",
        report.train_len, report.validation_len
    );
    println!(
        "Mean train loss: {:.4} (uniform baseline ln({}) = {:.4})",
        report.mean_train_loss,
        report.vocab_size,
        (report.vocab_size as f32).ln()
    );
    println!("Validation loss: {:.4}", report.validation_loss);
    println!("\nGenerated sample:\n{}", report.sample);
    println!("\nMetrics written to eval_log.csv");

    Ok(())
}

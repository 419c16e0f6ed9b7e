//! Training Logger
//!
//! This module provides a CSV logger for tracking evaluation metrics over
//! the course of a pipeline run. Each logged step is written to a CSV file
//! for later analysis and echoed to the console with timing information.
//!
//! ## CSV Format
//!
//! The logger writes CSV files with the following columns:
//! - `step`: Evaluation step number
//! - `elapsed_seconds`: Time since the logger was created
//! - `loss`: Cross-entropy loss for the step's batch
//! - `perplexity`: exp(loss) - interpretable metric
//! - `sample`: Generated text sample (optional)
//!
//! ## Perplexity
//!
//! Perplexity measures how "surprised" the model is by the data:
//! ```text
//! perplexity = exp(loss)
//! ```
//!
//! - **Perfect model**: perplexity = 1.0 (loss = 0)
//! - **Random guessing** (vocab=65): perplexity ≈ 65 (loss ≈ 4.2)
//!
//! Lower perplexity means the model makes better predictions.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cobweb::TrainingLogger;
//!
//! let mut logger = TrainingLogger::new("eval_log.csv")
//!     .expect("Failed to create logger");
//!
//! logger.log(10, 4.17, Some("hii there")).expect("Failed to log");
//! ```

use std::fs::File;
use std::io::Write;
use std::time::Instant;

/// CSV and console logger for per-step evaluation metrics.
pub struct TrainingLogger {
    log_file: File,
    start_time: Instant,
    last_log_time: Instant,
}

impl TrainingLogger {
    /// Create a logger writing to `log_path`, with the CSV header already
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be created or written.
    pub fn new(log_path: &str) -> std::io::Result<Self> {
        let mut log_file = File::create(log_path)?;
        writeln!(log_file, "step,elapsed_seconds,loss,perplexity,sample")?;

        let now = Instant::now();
        Ok(Self {
            log_file,
            start_time: now,
            last_log_time: now,
        })
    }

    /// Log one evaluation step to the CSV file and the console.
    ///
    /// # Arguments
    ///
    /// * `step` - Evaluation step number
    /// * `loss` - Cross-entropy loss for this step's batch
    /// * `sample` - Optional generated text sample
    ///
    /// # Errors
    ///
    /// Returns an IO error if the write or flush fails.
    pub fn log(&mut self, step: usize, loss: f32, sample: Option<&str>) -> std::io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let perplexity = loss.exp();

        // Escape quotes in sample text for CSV format.
        let sample_escaped = sample.map(|s| s.replace('"', "\"\"")).unwrap_or_default();

        writeln!(
            self.log_file,
            "{},{:.2},{:.4},{:.2},\"{}\"",
            step, elapsed, loss, perplexity, sample_escaped
        )?;

        // Flush so a crash mid-run doesn't lose the rows already logged.
        self.log_file.flush()?;

        let step_time = self.last_log_time.elapsed().as_secs_f32();
        println!(
            "Step {:4} | Time: {:7.1}s (+{:.1}s) | Loss: {:.4} | Perplexity: {:.2}",
            step, elapsed, step_time, loss, perplexity
        );

        if let Some(text) = sample {
            println!("  Sample: \"{}\"", text);
        }

        self.last_log_time = Instant::now();
        Ok(())
    }
}

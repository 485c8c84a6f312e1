//! `mdquiz check` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdquiz_config::Config;
use mdquiz_core::{Question, QuestionKind, QuizConverter};
use rayon::prelude::*;

use crate::error::CliError;
use crate::input::{self, Inputs};
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markdown files or glob patterns to check.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Path to configuration file (default: auto-discover mdquiz.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show conversion details.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or any input is not a valid quiz.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let converter = QuizConverter::with_settings(config.quiz_settings());

        let Inputs { files, unmatched } = input::expand(&self.inputs)?;
        for pattern in &unmatched {
            output.warning(&format!("No files match {pattern}"));
        }

        let results: Vec<_> = files
            .par_iter()
            .map(|path| -> Result<Vec<Question>, CliError> {
                let markdown = std::fs::read_to_string(path)?;
                Ok(converter.parse(&markdown)?)
            })
            .collect();

        let mut failed = 0;
        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(questions) => {
                    output.success(&format!(
                        "{}: {} questions",
                        path.display(),
                        questions.len()
                    ));
                    for (kind, count) in kind_counts(&questions) {
                        output.detail(&format!("{kind}: {count}"));
                    }
                }
                Err(err) => {
                    failed += 1;
                    output.error(&format!("{}: {err}", path.display()));
                }
            }
        }

        if failed > 0 || !unmatched.is_empty() {
            return Err(CliError::Incomplete {
                failed,
                total: files.len(),
                unmatched: unmatched.len(),
            });
        }
        Ok(())
    }
}

/// Non-zero question counts per kind, in kind display order.
fn kind_counts(questions: &[Question]) -> Vec<(QuestionKind, usize)> {
    QuestionKind::ALL
        .into_iter()
        .map(|kind| (kind, questions.iter().filter(|q| q.kind == kind).count()))
        .filter(|&(_, count)| count > 0)
        .collect()
}

//! `mdquiz convert` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mdquiz_config::{CliSettings, Config};
use mdquiz_core::moodle::serialize;
use mdquiz_core::{Numbering, QuizConverter};
use rayon::prelude::*;

use crate::error::CliError;
use crate::input::{self, Inputs};
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown files or glob patterns to convert.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Path to configuration file (default: auto-discover mdquiz.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra tags added to every question (comma-separated).
    #[arg(short, long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Shuffle answers of choice questions (overrides config).
    #[arg(short, long)]
    shuffle: Option<bool>,

    /// Answer numbering scheme: abc, ABC, 123, iii or III (overrides config).
    #[arg(short, long)]
    numbering: Option<Numbering>,

    /// Directory for generated XML files (default: next to each input).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Show conversion details.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Outcome of a single successful conversion.
#[derive(Debug)]
struct Converted {
    output: PathBuf,
    questions: usize,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, a pattern is malformed,
    /// or any input fails to convert.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            shuffle_answers: self.shuffle,
            numbering: self.numbering,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }
        let converter = QuizConverter::with_settings(config.quiz_settings());

        let Inputs { files, unmatched } = input::expand(&self.inputs)?;
        for pattern in &unmatched {
            output.warning(&format!("No files match {pattern}"));
        }

        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)?;
        }

        let results: Vec<Result<Converted, CliError>> = files
            .par_iter()
            .map(|path| convert_file(&converter, path, self.output_dir.as_deref()))
            .collect();

        let mut failed = 0;
        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(converted) => output.success(&format!(
                    "{} -> {} ({} questions)",
                    path.display(),
                    converted.output.display(),
                    converted.questions
                )),
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

        output.info(&format!("Converted {} documents", files.len()));
        Ok(())
    }
}

fn convert_file(
    converter: &QuizConverter,
    path: &Path,
    output_dir: Option<&Path>,
) -> Result<Converted, CliError> {
    let markdown = std::fs::read_to_string(path)?;
    let questions = converter.parse(&markdown)?;
    let xml = serialize(&converter.render(&questions))?;

    let target = output_path(path, output_dir);
    std::fs::write(&target, xml)?;
    tracing::info!(
        input = %path.display(),
        output = %target.display(),
        questions = questions.len(),
        "Converted document"
    );

    Ok(Converted {
        output: target,
        questions: questions.len(),
    })
}

/// Output path for an input: same stem with an `.xml` extension.
fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let xml = input.with_extension("xml");
    match (output_dir, xml.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => xml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path_next_to_input() {
        assert_eq!(
            output_path(Path::new("quizzes/week1.md"), None),
            PathBuf::from("quizzes/week1.xml")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        assert_eq!(
            output_path(Path::new("quiz"), None),
            PathBuf::from("quiz.xml")
        );
    }

    #[test]
    fn test_output_path_in_output_dir() {
        assert_eq!(
            output_path(Path::new("quizzes/week1.md"), Some(Path::new("build"))),
            PathBuf::from("build/week1.xml")
        );
    }

    #[test]
    fn test_convert_file_writes_xml() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("quiz.md");
        std::fs::write(&input, "What is 2 + 2?\n\n- 4\n").unwrap();

        let converted = convert_file(&QuizConverter::new(), &input, None).unwrap();

        assert_eq!(converted.output, dir.path().join("quiz.xml"));
        assert_eq!(converted.questions, 1);
        let xml = std::fs::read_to_string(&converted.output).unwrap();
        assert!(xml.contains(r#"<question type="numerical">"#));
    }

    #[test]
    fn test_convert_file_reports_structure_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.md");
        std::fs::write(&input, "A question without answers\n").unwrap();

        let err = convert_file(&QuizConverter::new(), &input, None).unwrap_err();

        assert!(matches!(err, CliError::Convert(_)));
        assert!(!dir.path().join("broken.xml").exists());
    }
}

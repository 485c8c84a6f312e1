//! mdquiz CLI - Markdown quiz to Moodle XML converter.
//!
//! Provides commands for:
//! - `convert`: Write a Moodle XML file next to each markdown quiz
//! - `check`: Parse quizzes and report question counts without writing

mod commands;
mod error;
mod input;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ConvertArgs};
use output::Output;

/// mdquiz - Markdown quiz to Moodle XML converter.
#[derive(Parser)]
#[command(name = "mdquiz", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown quizzes to Moodle XML.
    Convert(ConvertArgs),
    /// Parse markdown quizzes and report what they contain.
    Check(CheckArgs),
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info");
    }
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Convert(args) => args.verbose,
        Commands::Check(args) => args.verbose,
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(false, None).to_string(), "warn");
        assert_eq!(log_filter(false, Some("  ")).to_string(), "warn");
    }

    #[test]
    fn test_log_filter_uses_rust_log() {
        assert_eq!(log_filter(false, Some("debug")).to_string(), "debug");
    }

    #[test]
    fn test_log_filter_ignores_invalid_rust_log() {
        assert_eq!(log_filter(false, Some("mdquiz=loud")).to_string(), "warn");
    }

    #[test]
    fn test_log_filter_verbose_wins() {
        assert_eq!(log_filter(true, Some("debug")).to_string(), "info");
    }
}

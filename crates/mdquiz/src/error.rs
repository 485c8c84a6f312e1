//! CLI error types.

use mdquiz_config::ConfigError;
use mdquiz_core::{ConvertError, SerializeError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{0}")]
    Serialize(#[from] SerializeError),

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{failed} of {total} documents failed, {unmatched} patterns matched nothing")]
    Incomplete {
        failed: usize,
        total: usize,
        unmatched: usize,
    },
}

//! Input path and glob pattern expansion.

use std::path::PathBuf;

use crate::error::CliError;

/// Files selected by the command line inputs.
#[derive(Debug, Default)]
pub(crate) struct Inputs {
    /// Matched files, in pattern order without duplicates.
    pub(crate) files: Vec<PathBuf>,
    /// Patterns that matched no file.
    pub(crate) unmatched: Vec<String>,
}

/// Expand paths and glob patterns into a list of files.
///
/// A plain path is a pattern that matches itself. Directories are skipped.
pub(crate) fn expand(patterns: &[String]) -> Result<Inputs, CliError> {
    let mut inputs = Inputs::default();

    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern)? {
            match entry {
                Ok(path) if path.is_file() => {
                    matched = true;
                    if !inputs.files.contains(&path) {
                        inputs.files.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %e.path().display(), error = %e.error(), "Skipping unreadable path");
                }
            }
        }
        if !matched {
            inputs.unmatched.push(pattern.clone());
        }
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pattern(dir: &tempfile::TempDir, rest: &str) -> String {
        dir.path().join(rest).to_string_lossy().into_owned()
    }

    #[test]
    fn test_expand_glob_and_plain_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();
        std::fs::write(dir.path().join("b.md"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let inputs = expand(&[pattern(&dir, "*.md"), pattern(&dir, "notes.txt")]).unwrap();

        assert_eq!(
            inputs.files,
            vec![
                dir.path().join("a.md"),
                dir.path().join("b.md"),
                dir.path().join("notes.txt"),
            ]
        );
        assert!(inputs.unmatched.is_empty());
    }

    #[test]
    fn test_expand_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();

        let inputs = expand(&[pattern(&dir, "*.md"), pattern(&dir, "a.md")]).unwrap();

        assert_eq!(inputs.files, vec![dir.path().join("a.md")]);
        assert!(inputs.unmatched.is_empty());
    }

    #[test]
    fn test_expand_reports_unmatched_patterns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub.md")).unwrap();

        let inputs = expand(&[pattern(&dir, "*.md"), pattern(&dir, "missing.md")]).unwrap();

        assert!(inputs.files.is_empty());
        assert_eq!(inputs.unmatched.len(), 2);
    }

    #[test]
    fn test_expand_invalid_pattern() {
        let err = expand(&["[".to_owned()]).unwrap_err();
        assert!(matches!(err, CliError::Pattern(_)));
    }
}

//! Error types for quiz conversion.

use std::fmt;

/// Position of a block in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// 1-based source line where the block starts.
    pub line: usize,
    /// 1-based index of the block among the document's top-level blocks.
    pub block: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} (block {})", self.line, self.block)
    }
}

/// Fatal error while turning a document into questions.
///
/// A document either yields its full question list or fails as a whole.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The document does not follow the description-then-list shape.
    #[error("structure error at {location}: {reason}")]
    Structure {
        /// Offending block.
        location: Location,
        /// What went wrong.
        reason: String,
    },

    /// A list could not be mapped to a question kind.
    #[error("classification error at {location}: {reason}")]
    Classification {
        /// Offending list.
        location: Location,
        /// What went wrong.
        reason: String,
    },

    /// A recognized directive carried a value outside its domain.
    #[error("directive error at {location} in question \"{question}\": {reason} (`{token}`)")]
    Directive {
        /// Paragraph holding the directive.
        location: Location,
        /// Name (or placeholder) of the enclosing question.
        question: String,
        /// The raw `@key=value` token.
        token: String,
        /// What went wrong.
        reason: String,
    },
}

impl ConvertError {
    /// Location of the block that caused the error.
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Self::Structure { location, .. }
            | Self::Classification { location, .. }
            | Self::Directive { location, .. } => *location,
        }
    }
}

/// Error while writing the output tree as XML text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// Writer error.
    #[error("XML write error")]
    Io(#[from] std::io::Error),

    /// Writer produced invalid UTF-8.
    #[error("UTF-8 error")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Any error from a full markdown to XML conversion.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// The document could not be parsed into questions.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// The output tree could not be serialized.
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let location = Location { line: 12, block: 4 };
        assert_eq!(location.to_string(), "line 12 (block 4)");
    }

    #[test]
    fn test_directive_error_message() {
        let err = ConvertError::Directive {
            location: Location { line: 3, block: 2 },
            question: "Capitals".to_owned(),
            token: "@shuffle=maybe".to_owned(),
            reason: "invalid boolean value".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "directive error at line 3 (block 2) in question \"Capitals\": invalid boolean value (`@shuffle=maybe`)"
        );
        assert_eq!(err.location(), Location { line: 3, block: 2 });
    }
}

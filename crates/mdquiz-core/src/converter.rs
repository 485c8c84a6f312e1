//! Markdown quiz to Moodle XML converter.

use crate::error::{ConvertError, QuizError};
use crate::model::{Numbering, Question};
use crate::moodle::{MoodleRenderer, XmlNode, serialize};
use crate::parser::QuizParser;
use crate::settings::{QuizSettings, TagSettings};

/// Converter configuration and entry point.
///
/// The converter owns its settings, so every conversion sees the same
/// defaults even if the caller keeps changing its own copy.
#[derive(Clone, Debug, Default)]
pub struct QuizConverter {
    settings: QuizSettings,
}

impl QuizConverter {
    /// Create a converter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter from complete settings.
    #[must_use]
    pub fn with_settings(settings: QuizSettings) -> Self {
        Self { settings }
    }

    /// Set the default answer numbering.
    #[must_use]
    pub fn numbering(mut self, numbering: Numbering) -> Self {
        self.settings.numbering = numbering;
        self
    }

    /// Shuffle answers by default.
    #[must_use]
    pub fn shuffle_answers(mut self, enabled: bool) -> Self {
        self.settings.shuffle_answers = enabled;
        self
    }

    /// Treat single checked items as multiple choice by default.
    #[must_use]
    pub fn force_multi(mut self, enabled: bool) -> Self {
        self.settings.force_multi = enabled;
        self
    }

    /// Set the key/value separator of associative matching items.
    #[must_use]
    pub fn matching_separator(mut self, separator: impl Into<String>) -> Self {
        self.settings.matching_separator = separator.into();
        self
    }

    /// Set the configured tags.
    #[must_use]
    pub fn tags(mut self, tags: TagSettings) -> Self {
        self.settings.tags = tags;
        self
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Parse markdown into questions.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the document is not a valid quiz.
    pub fn parse(&self, markdown: &str) -> Result<Vec<Question>, ConvertError> {
        QuizParser::new(&self.settings).parse(markdown)
    }

    /// Render questions into a Moodle XML tree.
    #[must_use]
    pub fn render(&self, questions: &[Question]) -> XmlNode {
        MoodleRenderer::new(&self.settings).render(questions)
    }

    /// Convert markdown to Moodle XML text.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError`] if parsing or serialization fails.
    pub fn convert(&self, markdown: &str) -> Result<String, QuizError> {
        let questions = self.parse(markdown)?;
        tracing::debug!(count = questions.len(), "Parsed questions");
        Ok(serialize(&self.render(&questions))?)
    }
}

//! Conversion settings shared by the parser and the renderer.

use crate::model::{Numbering, QuestionConfig, QuestionKind};

/// Process-wide defaults for a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSettings {
    /// Default answer numbering of choice questions.
    pub numbering: Numbering,
    /// Shuffle answers unless a question says otherwise.
    pub shuffle_answers: bool,
    /// Treat a single checked item as multiple choice by default.
    pub force_multi: bool,
    /// Separator between key and value of associative matching items.
    pub matching_separator: String,
    /// `defaultgrade` of every question.
    pub default_grade: f64,
    /// `penalty` of every question.
    pub penalty: f64,
    /// Tags added to questions.
    pub tags: TagSettings,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            numbering: Numbering::default(),
            shuffle_answers: true,
            force_multi: false,
            matching_separator: ":".to_owned(),
            default_grade: 1.0,
            penalty: 0.333_333_3,
            tags: TagSettings::default(),
        }
    }
}

impl QuizSettings {
    /// Question settings before any directive is applied.
    #[must_use]
    pub fn question_config(&self) -> QuestionConfig {
        QuestionConfig {
            shuffle: self.shuffle_answers,
            numbering: self.numbering,
            force_multi: self.force_multi,
        }
    }
}

/// Tags added on top of the heading tags of each question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSettings {
    /// Added to every question.
    pub general: Vec<String>,
    /// Added to single and multiple choice questions.
    pub multichoice: Vec<String>,
    /// Added to matching questions.
    pub matching: Vec<String>,
    /// Added to short answer questions.
    pub shortanswer: Vec<String>,
    /// Added to numerical questions.
    pub numerical: Vec<String>,
}

impl TagSettings {
    /// Tags configured for `kind`.
    #[must_use]
    pub fn for_kind(&self, kind: QuestionKind) -> &[String] {
        match kind {
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice => &self.multichoice,
            QuestionKind::EnumeratedMatching | QuestionKind::AssociativeMatching => &self.matching,
            QuestionKind::ShortAnswer => &self.shortanswer,
            QuestionKind::Numerical => &self.numerical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = QuizSettings::default();
        assert_eq!(settings.question_config(), QuestionConfig::default());
        assert_eq!(settings.matching_separator, ":");
    }

    #[test]
    fn test_tags_for_kind() {
        let tags = TagSettings {
            matching: vec!["match".to_owned()],
            numerical: vec!["num".to_owned()],
            ..TagSettings::default()
        };
        assert_eq!(tags.for_kind(QuestionKind::EnumeratedMatching), ["match"]);
        assert_eq!(tags.for_kind(QuestionKind::AssociativeMatching), ["match"]);
        assert_eq!(tags.for_kind(QuestionKind::Numerical), ["num"]);
        assert!(tags.for_kind(QuestionKind::SingleChoice).is_empty());
    }
}

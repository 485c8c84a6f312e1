//! Document walker that assembles questions from top-level blocks.
//!
//! A question is one or more description blocks followed by exactly one
//! list. Level-1 headings set the tags of the following questions and
//! deeper headings name the next question:
//!
//! ```markdown
//! # Networking, basics
//!
//! ## Transport
//!
//! Which transport does HTTP/1.1 use? @shuffle=false
//!
//! - [x] TCP
//! - [ ] UDP
//! ```

use crate::classify::classify;
use crate::directive::{DirectiveKey, Directives, extract};
use crate::document::{Block, BlockKind, Document, ListBlock};
use crate::error::{ConvertError, Location};
use crate::model::{Question, QuestionConfig, QuestionKind};
use crate::settings::QuizSettings;

/// Maximum length of a derived question name, ellipsis included.
const NAME_LIMIT: usize = 80;
const ELLIPSIS: &str = "...";

/// Parses markdown documents into questions.
#[derive(Debug, Clone, Copy)]
pub struct QuizParser<'s> {
    settings: &'s QuizSettings,
}

impl<'s> QuizParser<'s> {
    /// Create a parser using `settings` for defaults.
    #[must_use]
    pub fn new(settings: &'s QuizSettings) -> Self {
        Self { settings }
    }

    /// Parse markdown source into questions in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] on the first structural, classification or
    /// directive problem. No partial result is returned.
    pub fn parse(&self, source: &str) -> Result<Vec<Question>, ConvertError> {
        self.parse_document(&Document::parse(source))
    }

    /// Parse an already read document.
    ///
    /// # Errors
    ///
    /// See [`QuizParser::parse`].
    pub fn parse_document(&self, document: &Document) -> Result<Vec<Question>, ConvertError> {
        let mut walker = Walker::new(self.settings);
        for block in document.visible_blocks() {
            walker.block(block)?;
        }
        walker.finish()
    }
}

/// A question whose answer list has not been seen yet.
#[derive(Debug)]
struct Draft {
    name: Option<String>,
    tags: Vec<String>,
    description: String,
    plain: String,
    config: QuestionConfig,
    directives: Directives,
    location: Location,
}

impl Draft {
    /// Name used in error messages.
    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("question at line {}", self.location.line))
    }

    fn append(&mut self, html: &str, text: &str) {
        self.description.push_str(html);
        if !text.is_empty() {
            if !self.plain.is_empty() {
                self.plain.push(' ');
            }
            self.plain.push_str(text);
        }
    }
}

struct Walker<'s> {
    settings: &'s QuizSettings,
    tags: Vec<String>,
    open: Option<Draft>,
    questions: Vec<Question>,
    /// The previous block completed a question.
    after_list: bool,
}

impl<'s> Walker<'s> {
    fn new(settings: &'s QuizSettings) -> Self {
        Self {
            settings,
            tags: Vec::new(),
            open: None,
            questions: Vec::new(),
            after_list: false,
        }
    }

    fn block(&mut self, block: &Block) -> Result<(), ConvertError> {
        let location = Location {
            line: block.line,
            block: block.index,
        };

        match &block.kind {
            BlockKind::Heading { level: 1, text } => {
                self.ensure_closed(location, "tag heading")?;
                self.tags = split_tags(text);
                tracing::debug!(tags = ?self.tags, line = block.line, "Tags changed");
            }
            BlockKind::Heading { text, .. } => {
                self.ensure_closed(location, "question heading")?;
                let name = text.trim();
                let mut draft = self.new_draft(location);
                draft.name = (!name.is_empty()).then(|| name.to_owned());
                self.open = Some(draft);
            }
            BlockKind::Paragraph { html, text } => self.paragraph(location, html, text)?,
            BlockKind::CodeBlock { html, text } | BlockKind::Rich { html, text } => {
                self.open_or_start(location).append(html, text.trim());
            }
            BlockKind::List(list) => return self.list(location, list),
            BlockKind::Rule => {
                tracing::warn!(line = block.line, "Ignoring thematic break");
                return Ok(());
            }
            BlockKind::Comment => return Ok(()),
        }

        self.after_list = false;
        Ok(())
    }

    fn paragraph(&mut self, location: Location, html: &str, text: &str) -> Result<(), ConvertError> {
        let extracted = extract(html);
        let draft = self.open_or_start(location);

        extracted
            .directives
            .apply(&mut draft.config)
            .map_err(|e| ConvertError::Directive {
                location,
                question: draft.label(),
                token: e.token,
                reason: e.reason,
            })?;
        let plain = extracted.directives.remove_from(text);
        draft.directives.extend(extracted.directives);

        if extracted.text.trim() == "<p></p>" {
            tracing::debug!(line = location.line, "Paragraph holds directives only");
        } else {
            draft.append(&extracted.text, plain.trim());
        }
        Ok(())
    }

    fn list(&mut self, location: Location, list: &ListBlock) -> Result<(), ConvertError> {
        let Some(draft) = self.open.take() else {
            let reason = if self.after_list {
                "second answer list without a new description"
            } else {
                "answer list without a preceding description"
            };
            return Err(ConvertError::Structure {
                location,
                reason: reason.to_owned(),
            });
        };

        if draft.description.trim().is_empty() {
            return Err(ConvertError::Structure {
                location,
                reason: format!("{} has an answer list but no description", draft.label()),
            });
        }

        let classification = classify(
            list,
            draft.config.force_multi,
            &self.settings.matching_separator,
        )
        .map_err(|e| ConvertError::Classification {
            location,
            reason: format!("{}: {e}", draft.label()),
        })?;

        log_ignored_directives(classification.kind, &draft.directives);

        let name = match draft.name {
            Some(name) => name,
            None => derive_name(&draft.plain).ok_or_else(|| ConvertError::Structure {
                location: draft.location,
                reason: "cannot derive a question name from the description".to_owned(),
            })?,
        };

        tracing::debug!(name = %name, kind = %classification.kind, "Question parsed");

        self.questions.push(Question {
            name,
            tags: draft.tags,
            description: draft.description,
            kind: classification.kind,
            answers: classification.answers,
            config: draft.config,
            line: draft.location.line,
        });
        self.after_list = true;
        Ok(())
    }

    fn finish(self) -> Result<Vec<Question>, ConvertError> {
        if let Some(draft) = self.open {
            return Err(ConvertError::Structure {
                location: draft.location,
                reason: format!("{} has no answer list", draft.label()),
            });
        }
        Ok(self.questions)
    }

    fn ensure_closed(&self, location: Location, what: &str) -> Result<(), ConvertError> {
        match &self.open {
            Some(draft) => Err(ConvertError::Structure {
                location,
                reason: format!("{what} found while {} has no answer list", draft.label()),
            }),
            None => Ok(()),
        }
    }

    fn open_or_start(&mut self, location: Location) -> &mut Draft {
        let draft = match self.open.take() {
            Some(draft) => draft,
            None => self.new_draft(location),
        };
        self.open.insert(draft)
    }

    fn new_draft(&self, location: Location) -> Draft {
        Draft {
            name: None,
            tags: self.tags.clone(),
            description: String::new(),
            plain: String::new(),
            config: self.settings.question_config(),
            directives: Directives::default(),
            location,
        }
    }
}

fn log_ignored_directives(kind: QuestionKind, directives: &Directives) {
    let ignored: &[DirectiveKey] = match kind {
        QuestionKind::AssociativeMatching => &[DirectiveKey::Numbering, DirectiveKey::ForceMulti],
        QuestionKind::EnumeratedMatching | QuestionKind::ShortAnswer | QuestionKind::Numerical => &[
            DirectiveKey::Shuffle,
            DirectiveKey::Numbering,
            DirectiveKey::ForceMulti,
        ],
        QuestionKind::SingleChoice | QuestionKind::MultipleChoice => &[],
    };
    for key in ignored.iter().filter(|key| directives.contains(**key)) {
        tracing::debug!(?key, %kind, "Directive has no effect on this question kind");
    }
}

/// Split a tag heading on commas, dropping empty and repeated parts.
fn split_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

/// Build a name from description text, bounded to [`NAME_LIMIT`] characters.
fn derive_name(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() <= NAME_LIMIT {
        return Some(collapsed);
    }
    let head: String = collapsed
        .chars()
        .take(NAME_LIMIT - ELLIPSIS.len())
        .collect();
    Some(format!("{}{ELLIPSIS}", head.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Numbering;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Vec<Question>, ConvertError> {
        let settings = QuizSettings::default();
        QuizParser::new(&settings).parse(source)
    }

    fn structure_reason(result: Result<Vec<Question>, ConvertError>) -> String {
        match result {
            Err(ConvertError::Structure { reason, .. }) => reason,
            other => panic!("expected structure error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_choice_with_tags() {
        let questions = parse(
            "# Group 1, easy\n\nWhat is the first answer?\n\n- [x] first\n- [ ] second\n- [ ] third\n",
        )
        .unwrap();
        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.kind, QuestionKind::SingleChoice);
        assert_eq!(question.tags, vec!["Group 1", "easy"]);
        assert_eq!(question.name, "What is the first answer?");
        assert_eq!(question.description, "<p>What is the first answer?</p>");
        assert_eq!(question.line, 3);
    }

    #[test]
    fn test_explicit_name_from_sub_heading() {
        let questions = parse("## Capitals\n\nCapital of France?\n\n- Paris\n").unwrap();
        assert_eq!(questions[0].name, "Capitals");
        assert_eq!(questions[0].kind, QuestionKind::ShortAnswer);
        assert_eq!(questions[0].line, 1);
    }

    #[test]
    fn test_tags_carry_over_until_next_tag_heading() {
        let questions = parse(
            "# a, b, a\n\nQ1\n\n- 1\n\nQ2\n\n- 2\n\n# c\n\nQ3\n\n- 3\n",
        )
        .unwrap();
        let tags: Vec<_> = questions.iter().map(|q| q.tags.clone()).collect();
        assert_eq!(
            tags,
            vec![
                vec!["a".to_owned(), "b".to_owned()],
                vec!["a".to_owned(), "b".to_owned()],
                vec!["c".to_owned()],
            ]
        );
    }

    #[test]
    fn test_description_spans_several_blocks() {
        let questions = parse("Look at this:\n\n```rust\nlet x = 1;\n```\n\nWhat is x?\n\n- 1\n").unwrap();
        assert_eq!(questions.len(), 1);
        let description = &questions[0].description;
        assert!(description.starts_with("<p>Look at this:</p><pre><code"));
        assert!(description.ends_with("<p>What is x?</p>"));
        assert_eq!(questions[0].kind, QuestionKind::Numerical);
    }

    #[test]
    fn test_directives_are_applied_and_stripped() {
        let questions = parse("Pick one. @shuffle=false @numbering=123\n\n- [x] a\n- [ ] b\n").unwrap();
        let question = &questions[0];
        assert!(!question.config.shuffle);
        assert_eq!(question.config.numbering, Numbering::Decimal);
        assert!(!question.description.contains('@'));
        assert_eq!(question.description, "<p>Pick one.</p>");
        assert_eq!(question.name, "Pick one.");
    }

    #[test]
    fn test_directives_in_inline_comment() {
        let questions =
            parse("Pick all. <!-- @force_multi=true -->\n\n- [x] a\n- [ ] b\n").unwrap();
        assert_eq!(questions[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(questions[0].description, "<p>Pick all.</p>");
    }

    #[test]
    fn test_directive_in_inline_code_stays_visible() {
        let questions = parse("Explain `x @color=red`\n\n- [x] a\n- [ ] b\n").unwrap();
        assert_eq!(
            questions[0].description,
            "<p>Explain <code>x @color=red</code></p>"
        );
        assert_eq!(questions[0].name, "Explain x @color=red");
    }

    #[test]
    fn test_directive_only_paragraph() {
        let questions = parse("@numbering=iii\n\nReal text\n\n- [x] a\n- [ ] b\n").unwrap();
        assert_eq!(questions[0].description, "<p>Real text</p>");
        assert_eq!(questions[0].config.numbering, Numbering::LowerRoman);
        assert_eq!(questions[0].line, 1);
    }

    #[test]
    fn test_directives_do_not_leak_to_next_question() {
        let questions = parse("Q1 @shuffle=false\n\n- [x] a\n- [ ] b\n\nQ2\n\n- [x] a\n- [ ] b\n").unwrap();
        assert!(!questions[0].config.shuffle);
        assert!(questions[1].config.shuffle);
    }

    #[test]
    fn test_bad_directive_names_question() {
        let err = parse("## Capitals\n\nQ @shuffle=perhaps\n\n- [x] a\n").unwrap_err();
        match err {
            ConvertError::Directive {
                location,
                question,
                token,
                ..
            } => {
                assert_eq!(question, "Capitals");
                assert_eq!(token, "@shuffle=perhaps");
                assert_eq!(location.line, 3);
            }
            other => panic!("expected directive error, got {other:?}"),
        }
    }

    #[test]
    fn test_second_list_is_structure_error() {
        let reason = structure_reason(parse("Q\n\n- [x] a\n- [ ] b\n\n1. x\n2. y\n"));
        assert!(reason.contains("second answer list"), "{reason}");
    }

    #[test]
    fn test_list_without_description() {
        let reason = structure_reason(parse("- [x] a\n"));
        assert!(reason.contains("without a preceding description"), "{reason}");
    }

    #[test]
    fn test_heading_then_list_has_no_description() {
        let reason = structure_reason(parse("## Named\n\n- [x] a\n"));
        assert!(reason.contains("no description"), "{reason}");
    }

    #[test]
    fn test_question_without_list_at_end() {
        let err = parse("Q1\n\n- 1\n\nDangling question\n").unwrap_err();
        assert_eq!(err.location(), Location { line: 5, block: 3 });
        assert!(err.to_string().contains("has no answer list"));
    }

    #[test]
    fn test_heading_while_question_open() {
        let reason = structure_reason(parse("Q1\n\n# Tags\n\n- 1\n"));
        assert!(reason.contains("tag heading"), "{reason}");
    }

    #[test]
    fn test_zero_checked_is_classification_error() {
        let err = parse("Q\n\n- [ ] a\n- [ ] b\n").unwrap_err();
        assert!(matches!(err, ConvertError::Classification { .. }), "{err:?}");
    }

    #[test]
    fn test_commented_out_questions_are_skipped() {
        let questions = parse(
            "Q1\n\n- 1\n\n<!--\n# Hidden\n\nQ2\n\n- [x] a\n-->\n\nQ3\n\n- 3\n",
        )
        .unwrap();
        let names: Vec<_> = questions.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["Q1", "Q3"]);
        assert!(questions.iter().all(|q| q.tags.is_empty()));
    }

    #[test]
    fn test_rule_is_ignored() {
        let questions = parse("Q1\n\n- 1\n\n---\n\nQ2\n\n- 2\n").unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse("").unwrap(), Vec::new());
        assert_eq!(parse("# Only tags\n").unwrap(), Vec::new());
    }

    #[test]
    fn test_derive_name_truncates() {
        let long = "word ".repeat(40);
        let name = derive_name(&long).unwrap();
        assert_eq!(name.chars().count(), NAME_LIMIT);
        assert!(name.ends_with(" wo..."), "{name}");
        assert_eq!(derive_name("  short \n text "), Some("short text".to_owned()));
        assert_eq!(derive_name("   "), None);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(" a , b,, a,c "), vec!["a", "b", "c"]);
        assert!(split_tags(" , ").is_empty());
    }
}

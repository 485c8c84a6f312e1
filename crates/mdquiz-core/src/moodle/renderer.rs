//! Question model to Moodle XML element tree.

use super::tree::XmlNode;
use crate::model::{Answer, Question, QuestionKind};
use crate::settings::QuizSettings;

/// Renders questions into a `<quiz>` tree.
#[derive(Debug, Clone, Copy)]
pub struct MoodleRenderer<'s> {
    settings: &'s QuizSettings,
}

impl<'s> MoodleRenderer<'s> {
    /// Create a renderer using `settings` for grades and tags.
    #[must_use]
    pub fn new(settings: &'s QuizSettings) -> Self {
        Self { settings }
    }

    /// Render questions in order.
    #[must_use]
    pub fn render(&self, questions: &[Question]) -> XmlNode {
        XmlNode::new("quiz").with_children(questions.iter().map(|q| self.render_question(q)))
    }

    /// Render a single `<question>` element.
    #[must_use]
    pub fn render_question(&self, question: &Question) -> XmlNode {
        let mut node = XmlNode::new("question")
            .with_attr("type", question.kind.moodle_type())
            .with_child(XmlNode::text_wrapper("name", &question.name))
            .with_child(
                XmlNode::text_wrapper("questiontext", &question.description)
                    .with_attr("format", "html"),
            )
            .with_child(XmlNode::new("defaultgrade").with_text(format_grade(
                self.settings.default_grade,
            )))
            .with_child(XmlNode::new("penalty").with_text(format_grade(self.settings.penalty)))
            .with_child(XmlNode::new("hidden").with_text("0"))
            .with_child(self.render_tags(question));

        match question.kind {
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice => {
                node.push(XmlNode::new("shuffleanswers").with_text(bool_str(question.config.shuffle)));
                node.push(
                    XmlNode::new("single")
                        .with_text(bool_str(question.kind == QuestionKind::SingleChoice)),
                );
                node.push(
                    XmlNode::new("answernumbering")
                        .with_text(question.config.numbering.moodle_token()),
                );
                node.children
                    .extend(question.answers.iter().map(choice_answer));
            }
            QuestionKind::EnumeratedMatching => {
                node.push(XmlNode::new("shuffleanswers").with_text(bool_str(false)));
                node.children.extend(question.answers.iter().enumerate().map(
                    |(i, answer)| {
                        let position = answer.order_index.unwrap_or(i + 1);
                        subquestion(&format!("{position}."), &answer.text)
                    },
                ));
            }
            QuestionKind::AssociativeMatching => {
                node.push(XmlNode::new("shuffleanswers").with_text(bool_str(question.config.shuffle)));
                node.children.extend(question.answers.iter().map(|answer| {
                    subquestion(
                        answer.match_key.as_deref().unwrap_or_default(),
                        answer.match_value.as_deref().unwrap_or(&answer.text),
                    )
                }));
            }
            QuestionKind::ShortAnswer => {
                node.push(XmlNode::new("usecase").with_text("0"));
                node.children.extend(question.answers.iter().map(|answer| {
                    XmlNode::new("answer")
                        .with_attr("fraction", format_fraction(answer.fraction))
                        .with_attr("format", "moodle_auto_format")
                        .with_child(XmlNode::new("text").with_text(&answer.text))
                        .with_child(empty_feedback())
                }));
            }
            QuestionKind::Numerical => {
                node.children.extend(question.answers.iter().map(numerical_answer));
            }
        }

        node
    }

    /// Heading tags, then general tags, then tags for the kind; first occurrence wins.
    fn render_tags(&self, question: &Question) -> XmlNode {
        let configured = &self.settings.tags;
        let mut tags: Vec<&str> = Vec::new();
        let all = question
            .tags
            .iter()
            .chain(&configured.general)
            .chain(configured.for_kind(question.kind));
        for tag in all.map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        XmlNode::new("tags").with_children(
            tags.into_iter()
                .map(|tag| XmlNode::text_wrapper("tag", tag)),
        )
    }
}

fn choice_answer(answer: &Answer) -> XmlNode {
    XmlNode::new("answer")
        .with_attr("fraction", format_fraction(answer.fraction))
        .with_attr("format", "html")
        .with_child(XmlNode::new("text").with_text(&answer.text))
        .with_child(empty_feedback())
}

fn numerical_answer(answer: &Answer) -> XmlNode {
    XmlNode::new("answer")
        .with_attr("fraction", format_fraction(answer.fraction))
        .with_child(XmlNode::new("text").with_text(&answer.text))
        .with_child(
            XmlNode::new("tolerance").with_text(format_fraction(answer.tolerance.unwrap_or(0.0))),
        )
        .with_child(empty_feedback())
}

fn subquestion(text: &str, answer: &str) -> XmlNode {
    XmlNode::text_wrapper("subquestion", text)
        .with_attr("format", "html")
        .with_child(XmlNode::text_wrapper("answer", answer))
}

fn empty_feedback() -> XmlNode {
    XmlNode::new("feedback")
        .with_attr("format", "html")
        .with_child(XmlNode::new("text"))
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn format_grade(value: f64) -> String {
    format!("{value:.7}")
}

/// Percentage with at most five decimals and no trailing zeros.
pub fn format_fraction(value: f64) -> String {
    let fixed = format!("{value:.5}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

//! Markdown quiz parser and Moodle XML renderer.
//!
//! Quizzes are written as plain markdown: each question is a description
//! (one or more paragraphs or code blocks) followed by a single list whose
//! shape decides the question kind.
//!
//! | List shape | Kind |
//! |---|---|
//! | `- [x]` / `- [ ]` items, one checked | single choice |
//! | `- [x]` / `- [ ]` items, several checked | multiple choice |
//! | `key: value` items | associative matching |
//! | ordered items | enumerated matching |
//! | one numeric item | numerical |
//! | one other item | short answer |
//!
//! Level-1 headings become tags of the questions below them, deeper headings
//! name the next question, and inline `@key=value` directives adjust a single
//! question. Anything inside `<!-- -->` is skipped.
//!
//! # Example
//!
//! ```
//! use mdquiz_core::{QuestionKind, QuizConverter};
//!
//! let markdown = "# Geography\n\nCapital of France?\n\n- [x] Paris\n- [ ] Lyon\n";
//! let converter = QuizConverter::new();
//!
//! let questions = converter.parse(markdown).unwrap();
//! assert_eq!(questions[0].kind, QuestionKind::SingleChoice);
//! assert_eq!(questions[0].tags, vec!["Geography"]);
//!
//! let xml = converter.convert(markdown).unwrap();
//! assert!(xml.contains(r#"<question type="multichoice">"#));
//! ```

pub mod classify;
mod converter;
pub mod directive;
pub mod document;
mod error;
mod html;
mod model;
pub mod moodle;
mod parser;
mod settings;

pub use converter::QuizConverter;
pub use error::{ConvertError, Location, QuizError, SerializeError};
pub use model::{Answer, Numbering, Question, QuestionConfig, QuestionKind, UnknownNumbering};
pub use parser::QuizParser;
pub use settings::{QuizSettings, TagSettings};

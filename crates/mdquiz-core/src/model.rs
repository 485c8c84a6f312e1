//! Question and answer model shared by the parser and the renderer.

use std::fmt;
use std::str::FromStr;

/// The six question kinds a list can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// Checkbox list with exactly one checked item.
    SingleChoice,
    /// Checkbox list with several checked items (or one, when forced).
    MultipleChoice,
    /// Ordered list whose item positions are the answers.
    EnumeratedMatching,
    /// List of `key: value` pairs.
    AssociativeMatching,
    /// Single free-text item.
    ShortAnswer,
    /// Single numeric item.
    Numerical,
}

impl QuestionKind {
    /// All kinds in display order.
    pub const ALL: [Self; 6] = [
        Self::SingleChoice,
        Self::MultipleChoice,
        Self::EnumeratedMatching,
        Self::AssociativeMatching,
        Self::ShortAnswer,
        Self::Numerical,
    ];

    /// Question type token of the Moodle XML format.
    #[must_use]
    pub fn moodle_type(self) -> &'static str {
        match self {
            Self::SingleChoice | Self::MultipleChoice => "multichoice",
            Self::EnumeratedMatching | Self::AssociativeMatching => "matching",
            Self::ShortAnswer => "shortanswer",
            Self::Numerical => "numerical",
        }
    }

    /// Whether the kind is rendered as a multichoice question.
    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultipleChoice)
    }

    /// Whether the kind is rendered as a matching question.
    #[must_use]
    pub fn is_matching(self) -> bool {
        matches!(self, Self::EnumeratedMatching | Self::AssociativeMatching)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SingleChoice => "single choice",
            Self::MultipleChoice => "multiple choice",
            Self::EnumeratedMatching => "enumerated matching",
            Self::AssociativeMatching => "associative matching",
            Self::ShortAnswer => "short answer",
            Self::Numerical => "numerical",
        };
        f.write_str(name)
    }
}

/// Answer numbering scheme of choice questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
pub enum Numbering {
    /// `a.`, `b.`, `c.`
    #[default]
    LowerAlpha,
    /// `A.`, `B.`, `C.`
    UpperAlpha,
    /// `1.`, `2.`, `3.`
    Decimal,
    /// `i.`, `ii.`, `iii.`
    LowerRoman,
    /// `I.`, `II.`, `III.`
    UpperRoman,
}

impl Numbering {
    /// Accepted spellings, canonical names first.
    pub const OPTIONS: [&'static str; 5] = ["abc", "ABC", "123", "iii", "III"];

    /// Canonical name as written in documents and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowerAlpha => "abc",
            Self::UpperAlpha => "ABC",
            Self::Decimal => "123",
            Self::LowerRoman => "iii",
            Self::UpperRoman => "III",
        }
    }

    /// `answernumbering` token of the Moodle XML format.
    #[must_use]
    pub fn moodle_token(self) -> &'static str {
        match self {
            Self::LowerAlpha => "abc",
            Self::UpperAlpha => "ABCD",
            Self::Decimal => "123",
            Self::LowerRoman => "iii",
            Self::UpperRoman => "IIII",
        }
    }
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown numbering scheme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown numbering scheme \"{0}\", expected one of abc, ABC, 123, iii, III")]
pub struct UnknownNumbering(pub String);

impl FromStr for Numbering {
    type Err = UnknownNumbering;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case matters: `abc` and `ABC` are different schemes.
        match s {
            "abc" => Ok(Self::LowerAlpha),
            "ABC" | "ABCD" => Ok(Self::UpperAlpha),
            "123" => Ok(Self::Decimal),
            "iii" => Ok(Self::LowerRoman),
            "III" | "IIII" => Ok(Self::UpperRoman),
            other => Err(UnknownNumbering(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Numbering {
    type Error = UnknownNumbering;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-question settings after defaults and directives are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionConfig {
    /// Shuffle answers when the question is shown.
    pub shuffle: bool,
    /// Answer numbering scheme.
    pub numbering: Numbering,
    /// Treat a single checked item as multiple choice.
    pub force_multi: bool,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            shuffle: true,
            numbering: Numbering::default(),
            force_multi: false,
        }
    }
}

/// One answer of a question. Which fields are meaningful depends on the kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Answer {
    /// Answer text; HTML for choice and matching items, plain text otherwise.
    pub text: String,
    /// Checkbox state of a choice item.
    pub checked: bool,
    /// Credit in percent (choice, short answer and numerical kinds).
    pub fraction: f64,
    /// Left side of an associative pair.
    pub match_key: Option<String>,
    /// Right side of an associative pair.
    pub match_value: Option<String>,
    /// 1-based source position of an enumerated item.
    pub order_index: Option<usize>,
    /// Accepted absolute error of a numerical answer.
    pub tolerance: Option<f64>,
}

/// A fully assembled question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Explicit name from a sub-heading, or derived from the description.
    pub name: String,
    /// Parts of the nearest preceding level-1 heading.
    pub tags: Vec<String>,
    /// HTML fragment built from the description blocks.
    pub description: String,
    /// Classified kind.
    pub kind: QuestionKind,
    /// Answers in source order.
    pub answers: Vec<Answer>,
    /// Resolved settings.
    pub config: QuestionConfig,
    /// Source line where the question starts.
    pub line: usize,
}

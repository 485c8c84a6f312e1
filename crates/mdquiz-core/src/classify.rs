//! Question kind classification from list shape.
//!
//! Rules are tried in a fixed order; the first that matches decides:
//!
//! 1. two or more items, each a `key: value` pair without checkbox → associative matching
//! 2. ordered list without checkboxes → enumerated matching
//! 3. every item has a checkbox → single or multiple choice
//! 4. a single unordered item → numerical or short answer

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{ListBlock, ListItem};
use crate::model::{Answer, QuestionKind};

/// A number with an optional `±`, `+-` or `+/-` tolerance suffix.
static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([+-]?(?:\d+\.?\d*|\.\d+))\s*(?:(?:±|\+-|\+/-)\s*(\d+\.?\d*|\.\d+))?\s*$",
    )
    .expect("invalid numeric regex")
});

/// Why a list could not be mapped to a question kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The list has no items.
    #[error("answer list is empty")]
    EmptyList,

    /// An item has no text.
    #[error("answer list item {index} has no text")]
    EmptyItem {
        /// 1-based item position.
        index: usize,
    },

    /// A checkbox list without any checked item.
    #[error("choice question needs at least one checked answer")]
    NoCorrectAnswer,

    /// Some items have a checkbox, others do not.
    #[error("answer list mixes checkbox and plain items")]
    MixedCheckboxes,

    /// Several plain unordered items that are not pairs.
    #[error(
        "cannot classify unordered list of {items} items without checkboxes or key/value separators"
    )]
    Ambiguous {
        /// Number of items.
        items: usize,
    },
}

/// Result of classifying a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Decided kind.
    pub kind: QuestionKind,
    /// Answers in source order.
    pub answers: Vec<Answer>,
}

/// Decide the question kind for `list` and build its answers.
///
/// `separator` splits associative pairs; `force_multi` turns a list with a
/// single checked item into multiple choice.
///
/// # Errors
///
/// Returns [`ClassifyError`] when the list matches no rule.
pub fn classify(
    list: &ListBlock,
    force_multi: bool,
    separator: &str,
) -> Result<Classification, ClassifyError> {
    let items = &list.items;
    if items.is_empty() {
        return Err(ClassifyError::EmptyList);
    }
    if let Some(index) = items.iter().position(|item| item.text.trim().is_empty()) {
        return Err(ClassifyError::EmptyItem { index: index + 1 });
    }

    let with_checkbox = items.iter().filter(|item| item.checked.is_some()).count();

    if with_checkbox == 0
        && items.len() >= 2
        && let Some(pairs) = associative_pairs(items, separator)
    {
        return Ok(Classification {
            kind: QuestionKind::AssociativeMatching,
            answers: pairs,
        });
    }

    if with_checkbox == 0 && list.ordered {
        return Ok(Classification {
            kind: QuestionKind::EnumeratedMatching,
            answers: items
                .iter()
                .enumerate()
                .map(|(i, item)| Answer {
                    text: item.html.clone(),
                    order_index: Some(i + 1),
                    ..Answer::default()
                })
                .collect(),
        });
    }

    if with_checkbox == items.len() {
        return classify_choice(items, force_multi);
    }

    if with_checkbox > 0 {
        return Err(ClassifyError::MixedCheckboxes);
    }

    match items.as_slice() {
        [item] => Ok(classify_single(item)),
        _ => Err(ClassifyError::Ambiguous { items: items.len() }),
    }
}

fn classify_choice(items: &[ListItem], force_multi: bool) -> Result<Classification, ClassifyError> {
    let correct = items.iter().filter(|item| item.checked == Some(true)).count();
    let wrong = items.len() - correct;

    if correct == 0 {
        return Err(ClassifyError::NoCorrectAnswer);
    }

    let (kind, correct_fraction, wrong_fraction) = if correct == 1 && !force_multi {
        (QuestionKind::SingleChoice, 100.0, 0.0)
    } else if wrong == 0 {
        (QuestionKind::MultipleChoice, 100.0 / count(correct), 0.0)
    } else {
        (
            QuestionKind::MultipleChoice,
            100.0 / count(correct),
            -100.0 / count(wrong),
        )
    };

    let answers = items
        .iter()
        .map(|item| {
            let checked = item.checked == Some(true);
            Answer {
                text: item.html.clone(),
                checked,
                fraction: if checked {
                    correct_fraction
                } else {
                    wrong_fraction
                },
                ..Answer::default()
            }
        })
        .collect();

    Ok(Classification { kind, answers })
}

fn classify_single(item: &ListItem) -> Classification {
    if let Some(caps) = NUMERIC_PATTERN.captures(&item.text) {
        let value = caps.get(1).map_or("", |m| m.as_str());
        let tolerance = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0);
        return Classification {
            kind: QuestionKind::Numerical,
            answers: vec![Answer {
                text: value.trim_start_matches('+').to_owned(),
                fraction: 100.0,
                tolerance: Some(tolerance),
                ..Answer::default()
            }],
        };
    }

    Classification {
        kind: QuestionKind::ShortAnswer,
        answers: vec![Answer {
            text: item.text.trim().to_owned(),
            fraction: 100.0,
            ..Answer::default()
        }],
    }
}

/// Split every item into a pair, or `None` if any item is not one.
fn associative_pairs(items: &[ListItem], separator: &str) -> Option<Vec<Answer>> {
    items
        .iter()
        .map(|item| {
            let (key, value) = split_outside_tags(&item.html, separator)?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(Answer {
                text: value.to_owned(),
                match_key: Some(key.to_owned()),
                match_value: Some(value.to_owned()),
                ..Answer::default()
            })
        })
        .collect()
}

/// Split `html` at the first `separator` that is not inside a tag.
fn split_outside_tags<'a>(html: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    if separator.is_empty() {
        return None;
    }

    let mut in_tag = false;
    for (i, c) in html.char_indices() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag && html[i..].starts_with(separator) => {
                return Some((&html[..i], &html[i + separator.len()..]));
            }
            _ => {}
        }
    }
    None
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

//! Inline `@key=value` directives.
//!
//! Directives tune a single question and may be written bare in the
//! description or hidden in an inline comment:
//!
//! ```markdown
//! Pick the primes. <!-- @shuffle=false @numbering=123 -->
//! ```
//!
//! Tokens are removed from the description before it is rendered. Unknown
//! keys are stripped too but have no effect. A value runs up to whitespace,
//! `<` or a closing `-->` and may be empty. Text inside `<code>` is never
//! scanned.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Numbering, QuestionConfig};

/// A token starts at the beginning of the fragment or after whitespace, `>` or `-`.
static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s>\-])(@([A-Za-z_][A-Za-z0-9_]*)=([^\s<]*))")
        .expect("invalid directive regex")
});

/// Inline code element of a rendered fragment.
static CODE_SPAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code\b[^>]*>.*?</code>").expect("invalid code span regex"));

/// An inline comment left without content once its tokens are gone.
static EMPTY_COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*<!--\s*-->").expect("invalid empty comment regex"));

/// Directive keys with an effect on the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKey {
    /// Answer shuffling.
    Shuffle,
    /// Answer numbering scheme.
    Numbering,
    /// Force multiple choice for a single checked item.
    ForceMulti,
}

impl DirectiveKey {
    /// Resolve a key, case-insensitively and including legacy aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "shuffle" | "shuffle_answers" | "shuffleanswers" | "suffleanswers" => {
                Some(Self::Shuffle)
            }
            "numbering" | "answernumbering" => Some(Self::Numbering),
            "force_multi" | "force_multiple_choice" | "multi" => Some(Self::ForceMulti),
            _ => None,
        }
    }
}

/// One directive token found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Key as written.
    pub key: String,
    /// Raw value.
    pub value: String,
    /// Whole `@key=value` token.
    pub token: String,
}

impl Directive {
    /// Recognized key, if any.
    #[must_use]
    pub fn known_key(&self) -> Option<DirectiveKey> {
        DirectiveKey::from_name(&self.key)
    }
}

/// A recognized directive with a value outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} (`{token}`)")]
pub struct DirectiveError {
    /// Offending token.
    pub token: String,
    /// What went wrong.
    pub reason: String,
}

/// Directives in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives(Vec<Directive>);

impl Directives {
    /// Whether no directive was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of directives, unknown keys included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate directives in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.0.iter()
    }

    /// Whether a directive for `key` is present.
    #[must_use]
    pub fn contains(&self, key: DirectiveKey) -> bool {
        self.0.iter().any(|d| d.known_key() == Some(key))
    }

    /// Append directives from a later fragment.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Remove these directives' tokens from `text`, each once and in order.
    ///
    /// Used for the plain text of a fragment whose HTML the tokens were
    /// extracted from, so occurrences inside code stay when the token was
    /// not found there.
    #[must_use]
    pub fn remove_from(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        for directive in &self.0 {
            if let Some(pos) = rest.find(&directive.token) {
                out.push_str(&rest[..pos]);
                rest = &rest[pos + directive.token.len()..];
            }
        }
        out.push_str(rest);
        out
    }

    /// Apply directives to `config` in source order; later tokens win.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError`] for the first recognized key whose value
    /// cannot be parsed. `config` is left untouched in that case.
    pub fn apply(&self, config: &mut QuestionConfig) -> Result<(), DirectiveError> {
        let mut updated = *config;
        for directive in &self.0 {
            match directive.known_key() {
                Some(DirectiveKey::Shuffle) => updated.shuffle = parse_bool(directive)?,
                Some(DirectiveKey::ForceMulti) => updated.force_multi = parse_bool(directive)?,
                Some(DirectiveKey::Numbering) => {
                    updated.numbering =
                        directive
                            .value
                            .parse::<Numbering>()
                            .map_err(|e| DirectiveError {
                                token: directive.token.clone(),
                                reason: e.to_string(),
                            })?;
                }
                None => {
                    tracing::debug!(token = %directive.token, "Ignoring unknown directive");
                }
            }
        }
        *config = updated;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Directives {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn parse_bool(directive: &Directive) -> Result<bool, DirectiveError> {
    match directive.value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(DirectiveError {
            token: directive.token.clone(),
            reason: "invalid boolean value, expected true/false, yes/no or 1/0".to_owned(),
        }),
    }
}

/// Result of [`extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Directives found in the fragment.
    pub directives: Directives,
    /// The fragment with all tokens removed.
    pub text: String,
}

/// Collect directives from `fragment` and strip them from it.
#[must_use]
pub fn extract(fragment: &str) -> Extracted {
    let mut directives = Vec::new();
    let mut text = String::with_capacity(fragment.len());
    let mut cursor = 0;
    let code_spans: Vec<Range<usize>> = CODE_SPAN_PATTERN
        .find_iter(fragment)
        .map(|m| m.range())
        .collect();

    for caps in DIRECTIVE_PATTERN.captures_iter(fragment) {
        let (Some(token), Some(key), Some(value)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            continue;
        };
        if code_spans.iter().any(|span| span.contains(&token.start())) {
            continue;
        }
        // `-->` closes the enclosing comment and is never part of the value.
        let raw = value.as_str();
        let raw = raw.find("-->").map_or(raw, |end| &raw[..end]);
        let token_end = value.start() + raw.len();
        directives.push(Directive {
            key: key.as_str().to_owned(),
            value: raw.to_owned(),
            token: fragment[token.start()..token_end].to_owned(),
        });

        text.push_str(&fragment[cursor..token.start()]);
        let mut rest = &fragment[token_end..];
        if text.is_empty() || text.ends_with(|c: char| c.is_whitespace() || c == '>') {
            rest = rest.trim_start();
        }
        if rest.is_empty() || rest.starts_with('<') {
            text.truncate(text.trim_end().len());
        }
        cursor = fragment.len() - rest.len();
    }

    if directives.is_empty() {
        return Extracted {
            directives: Directives::default(),
            text: fragment.to_owned(),
        };
    }

    text.push_str(&fragment[cursor..]);
    Extracted {
        directives: Directives(directives),
        text: EMPTY_COMMENT_PATTERN.replace_all(&text, "").into_owned(),
    }
}

/// Remove directive tokens from `fragment`, discarding them.
#[must_use]
pub fn strip(fragment: &str) -> String {
    extract(fragment).text
}

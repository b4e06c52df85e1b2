//! Free-text clause builder.
//!
//! Prose words left over after structured tokens are removed are normalised
//! (printable ASCII only, lower-cased) and classified by their first
//! character: `-` excludes, `~` is an alternative, anything else is
//! required.

use crate::syntax::{tokenize, Token};

/// Classified free-text terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtsClause {
    /// Every term must match.
    pub all: Vec<String>,
    /// At least one term must match.
    pub any: Vec<String>,
    /// Items matching every one of these terms are excluded.
    pub none: Vec<String>,
}

/// Rendered text of an [`FtsClause`] in match-expression syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtsFragments {
    pub and: String,
    pub or: String,
    pub not: String,
}

impl FtsFragments {
    /// Join the non-empty fragments. The OR fragment gets an `AND` prefix
    /// when an AND fragment precedes it.
    pub fn combined(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if !self.and.is_empty() {
            parts.push(self.and.clone());
        }
        if !self.or.is_empty() {
            if self.and.is_empty() {
                parts.push(self.or.clone());
            } else {
                parts.push(format!("AND {}", self.or));
            }
        }
        if !self.not.is_empty() {
            parts.push(self.not.clone());
        }
        parts.join(" ")
    }
}

/// Keep printable ASCII, lower-case and trim.
pub fn normalize_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| (' '..='~').contains(c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

fn quote(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}

fn join_quoted(terms: &[String], op: &str) -> String {
    terms
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", op))
}

impl FtsClause {
    /// Build from the prose tokens of an already tokenized search.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut clause = Self::default();
        for token in tokens {
            let Token::Word(raw) = token else {
                continue;
            };
            let (bucket, body) = if let Some(rest) = raw.strip_prefix('-') {
                (&mut clause.none, rest)
            } else if let Some(rest) = raw.strip_prefix('~') {
                (&mut clause.any, rest)
            } else {
                (&mut clause.all, raw.as_str())
            };
            let word = normalize_word(body);
            if !word.is_empty() {
                bucket.push(word);
            }
        }
        clause
    }

    pub fn parse(search: &str) -> Self {
        Self::from_tokens(&tokenize(search))
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty() && self.none.is_empty()
    }

    /// Only exclusions were given; needs an anti-join instead of a match.
    pub fn is_negation_only(&self) -> bool {
        self.all.is_empty() && self.any.is_empty() && !self.none.is_empty()
    }

    pub fn fragments(&self) -> FtsFragments {
        FtsFragments {
            and: join_quoted(&self.all, "AND"),
            or: if self.any.is_empty() {
                String::new()
            } else {
                format!("({})", join_quoted(&self.any, "OR"))
            },
            not: if self.none.is_empty() {
                String::new()
            } else {
                format!("NOT ({})", join_quoted(&self.none, "AND"))
            },
        }
    }
}

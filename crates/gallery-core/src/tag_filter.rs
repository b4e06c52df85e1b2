//! Tag clause builder.
//!
//! `namespace:name` tokens become [`TagMatch`]es grouped into required,
//! alternative and excluded sets. Names are case-insensitive LIKE patterns:
//! `%` matches any run of characters, `_` one character, and `*` is accepted
//! as an alias for `%`.

use serde::{Deserialize, Serialize};

use crate::defaults::RESERVED_SEARCH_KEYS;
use crate::models::Tag;
use crate::syntax::{tokenize, Prefix, Token};

/// Escape LIKE metacharacters (`\`, `%`, `_`) in user input.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// User pattern to LIKE pattern: `%` and `_` pass through, `*` becomes `%`.
pub fn like_pattern(input: &str) -> String {
    input.replace('*', "%")
}

/// Case-insensitive LIKE evaluation with `\` as the escape character.
///
/// Mirrors what storage does with `ILIKE ... ESCAPE '\'` so in-memory
/// repositories agree with the database.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Part {
        Any,
        One,
        Lit(char),
    }

    let mut parts = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    parts.extend(next.to_lowercase().map(Part::Lit));
                }
            }
            '%' => parts.push(Part::Any),
            '_' => parts.push(Part::One),
            _ => parts.extend(c.to_lowercase().map(Part::Lit)),
        }
    }
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    // Iterative wildcard match with single backtrack point.
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match parts.get(p) {
            Some(Part::Any) => {
                star = Some((p, t));
                p += 1;
            }
            Some(Part::One) => {
                p += 1;
                t += 1;
            }
            Some(Part::Lit(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    parts[p..].iter().all(|part| *part == Part::Any)
}

/// One `namespace:name` condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMatch {
    /// Empty matches any namespace.
    pub namespace: String,
    pub name: String,
    pub negate: bool,
    pub alternate: bool,
}

impl TagMatch {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            negate: false,
            alternate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    pub fn alternative(mut self) -> Self {
        self.alternate = true;
        self
    }

    /// Parse a `namespace:name` entry; an entry without a colon matches the
    /// name in any namespace.
    pub fn parse_entry(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let (namespace, name) = entry.split_once(':').unwrap_or(("", entry));
        let name = name.trim().trim_matches('"');
        if name.is_empty() {
            return None;
        }
        Some(Self::new(namespace.trim().to_lowercase(), name))
    }

    /// LIKE pattern for the name, with `*` rewritten to `%`.
    pub fn like_pattern(&self) -> String {
        like_pattern(&self.name)
    }

    /// Whether this condition (ignoring `negate`) holds for a single tag.
    pub fn matches_tag(&self, tag: &Tag) -> bool {
        (self.namespace.is_empty() || self.namespace.eq_ignore_ascii_case(&tag.namespace))
            && like_matches(&self.like_pattern(), &tag.name)
    }

    /// Whether any tag in the list satisfies the condition.
    pub fn matches_any(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|t| self.matches_tag(t))
    }
}

/// Tag conditions partitioned by how they combine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    /// Each must be present.
    pub required: Vec<TagMatch>,
    /// At least one must be present (when non-empty).
    pub any: Vec<TagMatch>,
    /// None may be present.
    pub excluded: Vec<TagMatch>,
}

impl TagFilter {
    /// Partition matches; `negate` wins over `alternate`.
    pub fn from_matches(matches: impl IntoIterator<Item = TagMatch>) -> Self {
        let mut filter = Self::default();
        for m in matches {
            if m.negate {
                filter.excluded.push(m);
            } else if m.alternate {
                filter.any.push(m);
            } else {
                filter.required.push(m);
            }
        }
        filter
    }

    /// Build from the `key:value` tokens of a tokenized search. Reserved
    /// keys and values made only of wildcards are skipped.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        Self::from_matches(tokens.iter().filter_map(|token| {
            let Token::Tag { key, value, prefix } = token else {
                return None;
            };
            if RESERVED_SEARCH_KEYS.contains(&key.as_str()) {
                return None;
            }
            if value.chars().all(|c| c == '*' || c == '%') {
                return None;
            }
            Some(TagMatch {
                namespace: key.clone(),
                name: value.clone(),
                negate: *prefix == Prefix::Negate,
                alternate: *prefix == Prefix::Alternate,
            })
        }))
    }

    pub fn parse(search: &str) -> Self {
        Self::from_tokens(&tokenize(search))
    }

    /// Append blacklist entries as exclusions.
    pub fn with_blacklist(mut self, entries: &[String]) -> Self {
        self.excluded.extend(
            entries
                .iter()
                .filter_map(|e| TagMatch::parse_entry(e))
                .map(TagMatch::negated),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.any.is_empty() && self.excluded.is_empty()
    }

    /// Evaluate against a tag list.
    pub fn matches(&self, tags: &[Tag]) -> bool {
        self.required.iter().all(|m| m.matches_any(tags))
            && (self.any.is_empty() || self.any.iter().any(|m| m.matches_any(tags)))
            && !self.excluded.iter().any(|m| m.matches_any(tags))
    }
}

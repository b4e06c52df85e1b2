//! Search string tokenizer.
//!
//! A single left-to-right pass splits the raw `q` parameter into typed
//! tokens. Structured tokens (`key:value`, `key>N`) are recognised at the
//! start of a whitespace-delimited chunk; everything else is prose.
//!
//! | Form | Token |
//! |------|-------|
//! | `artist:jane`, `-artist:"jane doe"`, `~:name`, `|circle:x` | [`Token::Tag`] |
//! | `pages>20`, `size<=5m`, `tags=3`, `artist>=2` | [`Token::Range`] |
//! | `foo`, `-bar`, `~baz` | [`Token::Word`] |

/// Numeric comparison used by range tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Lt,
    Eq,
    Ge,
    Le,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }

    /// Evaluate `lhs <op> rhs`.
    pub fn compare(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Lt => lhs < rhs,
            Self::Eq => lhs == rhs,
            Self::Ge => lhs >= rhs,
            Self::Le => lhs <= rhs,
        }
    }
}

/// Prefix attached to a word or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prefix {
    #[default]
    None,
    /// `-`
    Negate,
    /// `~`
    Alternate,
}

/// A typed search token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Prose chunk, raw (prefix character included).
    Word(String),
    /// `key:value` with quotes stripped from a quoted value.
    Tag {
        key: String,
        value: String,
        prefix: Prefix,
    },
    /// `key<op>N[unit]`. `unit` is the lower-cased magnitude letter.
    Range {
        key: String,
        op: Comparison,
        value: i64,
        unit: Option<char>,
    },
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a search string into tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }

        if let Some((token, next)) = structured_at(&chars, pos) {
            tokens.push(token);
            pos = next;
            continue;
        }

        let start = pos;
        while pos < chars.len() && !chars[pos].is_whitespace() {
            pos += 1;
        }
        tokens.push(Token::Word(chars[start..pos].iter().collect()));
    }

    tokens
}

/// Try to read a structured token starting at `start`; returns the token and
/// the position just after it.
fn structured_at(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut pos = start;
    // `|` is accepted as a prefix but carries no meaning.
    let prefix = match chars[pos] {
        '-' => Prefix::Negate,
        '~' => Prefix::Alternate,
        _ => Prefix::None,
    };
    if matches!(chars[pos], '-' | '~' | '|') {
        pos += 1;
    }

    let key_start = pos;
    while pos < chars.len() && is_word_char(chars[pos]) {
        pos += 1;
    }
    let key: String = chars[key_start..pos].iter().collect();

    match chars.get(pos) {
        Some(':') => tag_value(chars, pos + 1).map(|(value, next)| {
            (
                Token::Tag {
                    key: key.to_lowercase(),
                    value,
                    prefix,
                },
                next,
            )
        }),
        Some('>' | '<' | '=') if !key.is_empty() => range_value(chars, pos)
            .map(|(op, value, unit, next)| {
                (
                    Token::Range {
                        key: key.to_lowercase(),
                        op,
                        value,
                        unit,
                    },
                    next,
                )
            }),
        _ => None,
    }
}

/// A quoted phrase (when a closing quote exists) or a run of non-space
/// characters. Quotes are stripped only when they wrap the whole value.
fn tag_value(chars: &[char], start: usize) -> Option<(String, usize)> {
    if chars.get(start) == Some(&'"') {
        if let Some(offset) = chars[start + 1..].iter().position(|&c| c == '"') {
            let end = start + 1 + offset;
            let value: String = chars[start + 1..end].iter().collect();
            return Some((value, end + 1));
        }
    }

    let mut pos = start;
    while pos < chars.len() && !chars[pos].is_whitespace() {
        pos += 1;
    }
    if pos == start {
        return None;
    }
    Some((chars[start..pos].iter().collect(), pos))
}

fn range_value(chars: &[char], start: usize) -> Option<(Comparison, i64, Option<char>, usize)> {
    let mut pos = start;
    let op = match (chars.get(pos), chars.get(pos + 1)) {
        (Some('>'), Some('=')) => {
            pos += 2;
            Comparison::Ge
        }
        (Some('<'), Some('=')) => {
            pos += 2;
            Comparison::Le
        }
        (Some('>'), _) => {
            pos += 1;
            Comparison::Gt
        }
        (Some('<'), _) => {
            pos += 1;
            Comparison::Lt
        }
        (Some('='), _) => {
            pos += 1;
            Comparison::Eq
        }
        _ => return None,
    };

    let digits_start = pos;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }
    let digits: String = chars[digits_start..pos].iter().collect();
    let value = digits.parse::<i64>().ok()?;

    let unit = match chars.get(pos).map(|c| c.to_ascii_lowercase()) {
        Some(u @ ('k' | 'm' | 'g')) => {
            pos += 1;
            Some(u)
        }
        _ => None,
    };

    // Must end on a word boundary.
    if chars.get(pos).is_some_and(|&c| is_word_char(c)) {
        return None;
    }

    Some((op, value, unit, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, value: &str, prefix: Prefix) -> Token {
        Token::Tag {
            key: key.to_string(),
            value: value.to_string(),
            prefix,
        }
    }

    #[test]
    fn test_plain_words() {
        let tokens = tokenize("  foo  -bar ~baz ");
        assert_eq!(
            tokens,
            vec![
                Token::Word("foo".to_string()),
                Token::Word("-bar".to_string()),
                Token::Word("~baz".to_string()),
            ]
        );
    }

    #[test]
    fn test_tag_tokens_with_prefixes() {
        let tokens = tokenize("artist:jane -parody:x ~circle:y |group:z");
        assert_eq!(
            tokens,
            vec![
                tag("artist", "jane", Prefix::None),
                tag("parody", "x", Prefix::Negate),
                tag("circle", "y", Prefix::Alternate),
                tag("group", "z", Prefix::None),
            ]
        );
    }

    #[test]
    fn test_quoted_phrase_value() {
        let tokens = tokenize(r#"artist:"jane doe" foo"#);
        assert_eq!(
            tokens,
            vec![
                tag("artist", "jane doe", Prefix::None),
                Token::Word("foo".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_kept_verbatim() {
        let tokens = tokenize(r#"artist:"jane doe"#);
        assert_eq!(
            tokens,
            vec![
                tag("artist", "\"jane", Prefix::None),
                Token::Word("doe".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_namespace_tag() {
        assert_eq!(tokenize(":glasses"), vec![tag("", "glasses", Prefix::None)]);
    }

    #[test]
    fn test_key_is_lowercased() {
        assert_eq!(tokenize("Artist:Jane"), vec![tag("artist", "Jane", Prefix::None)]);
    }

    #[test]
    fn test_dangling_colon_is_prose() {
        assert_eq!(tokenize("foo:"), vec![Token::Word("foo:".to_string())]);
    }

    #[test]
    fn test_range_tokens() {
        let tokens = tokenize("pages>=20 size<5M tags=3");
        assert_eq!(
            tokens,
            vec![
                Token::Range {
                    key: "pages".to_string(),
                    op: Comparison::Ge,
                    value: 20,
                    unit: None
                },
                Token::Range {
                    key: "size".to_string(),
                    op: Comparison::Lt,
                    value: 5,
                    unit: Some('m')
                },
                Token::Range {
                    key: "tags".to_string(),
                    op: Comparison::Eq,
                    value: 3,
                    unit: None
                },
            ]
        );
    }

    #[test]
    fn test_range_requires_boundary() {
        assert_eq!(tokenize("pages>20x"), vec![Token::Word("pages>20x".to_string())]);
        assert_eq!(tokenize("pages>"), vec![Token::Word("pages>".to_string())]);
    }

    #[test]
    fn test_comparison_compare() {
        assert!(Comparison::Gt.compare(5, 4));
        assert!(!Comparison::Lt.compare(5, 4));
        assert!(Comparison::Ge.compare(4, 4));
        assert!(Comparison::Le.compare(3, 4));
        assert!(Comparison::Eq.compare(4, 4));
    }

    #[test]
    fn test_mixed_query() {
        let tokens = tokenize(r#"big -small artist:"a b" pages>10 ~x"#);
        assert_eq!(tokens.len(), 5);
        assert!(matches!(tokens[2], Token::Tag { .. }));
        assert!(matches!(tokens[3], Token::Range { .. }));
    }
}

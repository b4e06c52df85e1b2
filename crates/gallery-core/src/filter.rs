//! Combined search filter handed to the repository.
//!
//! One tokenizer pass feeds every clause builder: prose goes to the
//! free-text clause, `key:value` to the tag clause (or the language/source
//! filters for reserved keys), and `key<op>N` to the range filters.

use crate::defaults::{RESERVED_SEARCH_KEYS, SIZE_UNIT_STEP};
use crate::fts::FtsClause;
use crate::query::Query;
use crate::syntax::{tokenize, Comparison, Token};
use crate::tag_filter::TagFilter;

/// `<op> N` condition on a numeric property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCondition {
    pub op: Comparison,
    pub value: i64,
}

impl RangeCondition {
    pub fn holds(&self, actual: i64) -> bool {
        self.op.compare(actual, self.value)
    }
}

/// Numeric filters from `key<op>N` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeFilters {
    pub pages: Option<RangeCondition>,
    /// Bytes.
    pub size: Option<RangeCondition>,
    /// Number of tags.
    pub tag_count: Option<RangeCondition>,
    /// Number of sources.
    pub source_count: Option<RangeCondition>,
    /// Number of tags in a namespace.
    pub namespace_counts: Vec<(String, RangeCondition)>,
}

impl RangeFilters {
    pub fn is_empty(&self) -> bool {
        self.pages.is_none()
            && self.size.is_none()
            && self.tag_count.is_none()
            && self.source_count.is_none()
            && self.namespace_counts.is_empty()
    }
}

fn size_in_bytes(value: i64, unit: Option<char>) -> i64 {
    let steps = match unit {
        Some('k') => 1,
        Some('m') => 2,
        Some('g') => 3,
        _ => 0,
    };
    (0..steps).fold(value, |acc, _| acc.saturating_mul(SIZE_UNIT_STEP))
}

/// Every condition a search applies before sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub text: FtsClause,
    pub tags: TagFilter,
    pub ranges: RangeFilters,
    /// Each must equal the item language (case-insensitive).
    pub languages: Vec<String>,
    /// At least one must match a source name (case-insensitive pattern).
    pub sources: Vec<String>,
    /// At least one source URL must end with one of these.
    pub urls: Vec<String>,
    pub include_hidden: bool,
}

impl SearchFilter {
    /// Build from a raw search string.
    pub fn parse(search: &str) -> Self {
        let tokens = tokenize(search);
        let mut filter = Self {
            text: FtsClause::from_tokens(&tokens),
            tags: TagFilter::from_tokens(&tokens),
            ..Default::default()
        };

        for token in &tokens {
            match token {
                Token::Tag { key, value, .. } if key == "language" => {
                    if !value.is_empty() {
                        filter.languages.push(value.to_lowercase());
                    }
                }
                Token::Tag { key, value, .. } if key == "source" => {
                    filter.sources.push(value.clone());
                }
                Token::Tag { key, value, .. } if key == "url" => {
                    if !value.is_empty() {
                        filter.urls.push(value.clone());
                    }
                }
                Token::Range {
                    key,
                    op,
                    value,
                    unit,
                } => {
                    let op = *op;
                    match key.as_str() {
                        "pages" => filter.ranges.pages = Some(RangeCondition { op, value: *value }),
                        "size" => {
                            filter.ranges.size = Some(RangeCondition {
                                op,
                                value: size_in_bytes(*value, *unit),
                            })
                        }
                        "tags" => {
                            filter.ranges.tag_count = Some(RangeCondition { op, value: *value })
                        }
                        "sources" => {
                            filter.ranges.source_count = Some(RangeCondition { op, value: *value })
                        }
                        other if !RESERVED_SEARCH_KEYS.contains(&other) => filter
                            .ranges
                            .namespace_counts
                            .push((other.to_string(), RangeCondition { op, value: *value })),
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        filter
    }

    /// Build from a normalised query, including its blacklist and hidden flag.
    pub fn from_query(query: &Query) -> Self {
        let mut filter = Self::parse(&query.search);
        filter.tags = filter.tags.with_blacklist(&query.tag_blacklist);
        filter.include_hidden = query.include_hidden;
        filter
    }

    /// Short description for logs.
    pub fn summary(&self) -> String {
        format!(
            "text=[{}] tags(req={}, any={}, not={}) ranges={} languages={} sources={} urls={} hidden={}",
            self.text.fragments().combined(),
            self.tags.required.len(),
            self.tags.any.len(),
            self.tags.excluded.len(),
            !self.ranges.is_empty(),
            self.languages.len(),
            self.sources.len(),
            self.urls.len(),
            self.include_hidden
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_single_pass_split() {
        let filter = SearchFilter::parse(
            r#"big -small artist:"jane doe" language:English source:site pages>20"#,
        );
        assert_eq!(filter.text.all, vec!["big"]);
        assert_eq!(filter.text.none, vec!["small"]);
        assert_eq!(filter.tags.required.len(), 1);
        assert_eq!(filter.tags.required[0].name, "jane doe");
        assert_eq!(filter.languages, vec!["english"]);
        assert_eq!(filter.sources, vec!["site"]);
        assert_eq!(
            filter.ranges.pages,
            Some(RangeCondition {
                op: Comparison::Gt,
                value: 20
            })
        );
    }

    #[test]
    fn test_size_units() {
        let filter = SearchFilter::parse("size>=2m");
        assert_eq!(filter.ranges.size.unwrap().value, 2 * 1024 * 1024);
        let filter = SearchFilter::parse("size<3");
        assert_eq!(filter.ranges.size.unwrap().value, 3);
        let filter = SearchFilter::parse("size<1g");
        assert_eq!(filter.ranges.size.unwrap().value, 1024 * 1024 * 1024);
    }

    #[test]
    fn test_last_range_wins_and_namespace_counts_accumulate() {
        let filter = SearchFilter::parse("pages>10 pages<50 artist>=2 female=1");
        assert_eq!(filter.ranges.pages.unwrap().op, Comparison::Lt);
        assert_eq!(filter.ranges.namespace_counts.len(), 2);
        assert_eq!(filter.ranges.namespace_counts[0].0, "artist");
    }

    #[test]
    fn test_url_and_source_count() {
        let filter = SearchFilter::parse("url:example.test/g/1 sources>0 sources=2");
        assert_eq!(filter.urls, vec!["example.test/g/1"]);
        assert_eq!(
            filter.ranges.source_count,
            Some(RangeCondition {
                op: Comparison::Eq,
                value: 2
            })
        );
        assert!(filter.tags.is_empty());
        assert!(filter.ranges.namespace_counts.is_empty());
    }

    #[test]
    fn test_reserved_range_keys_ignored() {
        let filter = SearchFilter::parse("url>3 language=2");
        assert!(filter.ranges.is_empty());
    }

    #[test]
    fn test_from_query_carries_flags() {
        let query = Query::new(&SiteConfig::builtin())
            .with_search("artist:a")
            .with_include_hidden(true)
            .with_tag_blacklist(vec!["male:beard".to_string()]);
        let filter = SearchFilter::from_query(&query);
        assert!(filter.include_hidden);
        assert_eq!(filter.tags.excluded.len(), 1);
        assert_eq!(filter.tags.required.len(), 1);
    }

    #[test]
    fn test_range_condition_holds() {
        let cond = RangeCondition {
            op: Comparison::Le,
            value: 10,
        };
        assert!(cond.holds(10));
        assert!(!cond.holds(11));
    }

    #[test]
    fn test_summary_mentions_text() {
        let summary = SearchFilter::parse("foo").summary();
        assert!(summary.contains("\"foo\""));
    }
}

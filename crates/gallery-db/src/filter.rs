//! SQL rendering of [`SearchFilter`].
//!
//! Produces a WHERE fragment over `archives a` plus the parameters it
//! references, in placeholder order. Every user value is bound; nothing is
//! interpolated into the SQL text.

use gallery_core::defaults::FTS_CONFIG;
use gallery_core::{
    escape_like, like_pattern, FtsClause, RangeCondition, SearchFilter, TagMatch,
};

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// 64-bit integer parameter.
    Int(i64),
    /// Text parameter.
    String(String),
}

/// Placeholder allocator.
struct Params {
    next: usize,
    values: Vec<QueryParam>,
}

impl Params {
    fn new(offset: usize) -> Self {
        Self {
            next: offset,
            values: Vec::new(),
        }
    }

    fn push(&mut self, param: QueryParam) -> String {
        self.next += 1;
        self.values.push(param);
        format!("${}", self.next)
    }

    fn text(&mut self, value: impl Into<String>) -> String {
        format!("{}::text", self.push(QueryParam::String(value.into())))
    }

    fn int(&mut self, value: i64) -> String {
        format!("{}::bigint", self.push(QueryParam::Int(value)))
    }
}

/// Generates the WHERE clause for a search.
///
/// ```rust,ignore
/// let filter = SearchFilter::parse("artist:jane -parody:x");
/// let (sql, params) = SearchFilterQueryBuilder::new(&filter, 0).build();
/// // sql: "a.deleted_at IS NULL AND EXISTS (...) AND NOT EXISTS (...)"
/// ```
pub struct SearchFilterQueryBuilder<'a> {
    filter: &'a SearchFilter,
    param_offset: usize,
}

impl<'a> SearchFilterQueryBuilder<'a> {
    /// `param_offset` is the number of parameters already in the query.
    pub fn new(filter: &'a SearchFilter, param_offset: usize) -> Self {
        Self {
            filter,
            param_offset,
        }
    }

    /// Build the complete WHERE fragment; `"TRUE"` when nothing applies.
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut params = Params::new(self.param_offset);
        let mut clauses = Vec::new();
        let filter = self.filter;

        if !filter.include_hidden {
            clauses.push("a.deleted_at IS NULL".to_string());
        }

        if let Some(clause) = text_clause(&filter.text, &mut params) {
            clauses.push(clause);
        }

        for m in &filter.tags.required {
            clauses.push(tag_exists(m, &mut params));
        }
        if !filter.tags.any.is_empty() {
            let alternatives: Vec<String> = filter
                .tags
                .any
                .iter()
                .map(|m| tag_exists(m, &mut params))
                .collect();
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }
        for m in &filter.tags.excluded {
            clauses.push(format!("NOT {}", tag_exists(m, &mut params)));
        }

        let ranges = &filter.ranges;
        if let Some(cond) = ranges.pages {
            clauses.push(range("a.pages", cond, &mut params));
        }
        if let Some(cond) = ranges.size {
            clauses.push(range("a.size", cond, &mut params));
        }
        if let Some(cond) = ranges.tag_count {
            clauses.push(range(
                "(SELECT COUNT(*) FROM archive_tags atag WHERE atag.archive_id = a.id)",
                cond,
                &mut params,
            ));
        }
        if let Some(cond) = ranges.source_count {
            clauses.push(range(
                "(SELECT COUNT(*) FROM archive_sources src WHERE src.archive_id = a.id)",
                cond,
                &mut params,
            ));
        }
        for (namespace, cond) in &ranges.namespace_counts {
            let ns = params.text(namespace.clone());
            let count = format!(
                "(SELECT COUNT(*) FROM archive_tags atag JOIN tags t ON t.id = atag.tag_id \
                 WHERE atag.archive_id = a.id AND LOWER(t.namespace) = LOWER({}))",
                ns
            );
            clauses.push(range(&count, *cond, &mut params));
        }

        for language in &filter.languages {
            let p = params.text(escape_like(language));
            clauses.push(format!("a.language ILIKE {} ESCAPE '\\'", p));
        }

        if !filter.sources.is_empty() {
            let names: Vec<String> = filter
                .sources
                .iter()
                .map(|s| {
                    let p = params.text(like_pattern(s));
                    format!("src.name ILIKE {} ESCAPE '\\'", p)
                })
                .collect();
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM archive_sources src WHERE src.archive_id = a.id AND ({}))",
                names.join(" OR ")
            ));
        }

        if !filter.urls.is_empty() {
            let urls: Vec<String> = filter
                .urls
                .iter()
                .map(|u| {
                    let p = params.text(format!("%{}", like_pattern(u)));
                    format!("src.url ILIKE {} ESCAPE '\\'", p)
                })
                .collect();
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM archive_sources src WHERE src.archive_id = a.id AND ({}))",
                urls.join(" OR ")
            ));
        }

        if clauses.is_empty() {
            return ("TRUE".to_string(), params.values);
        }
        (clauses.join(" AND "), params.values)
    }
}

fn tsquery(term: &str, params: &mut Params) -> String {
    format!("phraseto_tsquery('{}', {})", FTS_CONFIG, params.text(term))
}

/// Required terms `&&` the alternative group, or `None` when neither exists.
fn positive_tsquery(text: &FtsClause, params: &mut Params) -> Option<String> {
    let mut parts: Vec<String> = text.all.iter().map(|t| tsquery(t, params)).collect();
    if !text.any.is_empty() {
        let any: Vec<String> = text.any.iter().map(|t| tsquery(t, params)).collect();
        parts.push(format!("({})", any.join(" || ")));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" && "))
    }
}

/// Conjunction of the excluded terms.
fn negative_tsquery(text: &FtsClause, params: &mut Params) -> Option<String> {
    if text.none.is_empty() {
        return None;
    }
    let none: Vec<String> = text.none.iter().map(|t| tsquery(t, params)).collect();
    Some(format!("({})", none.join(" && ")))
}

fn text_clause(text: &FtsClause, params: &mut Params) -> Option<String> {
    let positive = positive_tsquery(text, params);
    let negative = negative_tsquery(text, params);
    match (positive, negative) {
        (None, None) => None,
        (Some(pos), None) => Some(format!("a.fts @@ ({})", pos)),
        (Some(pos), Some(neg)) => Some(format!("a.fts @@ ({} && !!{})", pos, neg)),
        (None, Some(neg)) => Some(format!(
            "a.id NOT IN (SELECT x.id FROM archives x WHERE x.fts @@ {})",
            neg
        )),
    }
}

fn tag_exists(m: &TagMatch, params: &mut Params) -> String {
    let namespace = if m.namespace.is_empty() {
        String::new()
    } else {
        format!("LOWER(t.namespace) = LOWER({}) AND ", params.text(m.namespace.clone()))
    };
    let name = params.text(m.like_pattern());
    format!(
        "EXISTS (SELECT 1 FROM archive_tags atag JOIN tags t ON t.id = atag.tag_id \
         WHERE atag.archive_id = a.id AND {}t.name ILIKE {} ESCAPE '\\')",
        namespace, name
    )
}

fn range(expr: &str, cond: RangeCondition, params: &mut Params) -> String {
    format!("{} {} {}", expr, cond.op.as_sql(), params.int(cond.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(search: &str) -> (String, Vec<QueryParam>) {
        let filter = SearchFilter::parse(search);
        SearchFilterQueryBuilder::new(&filter, 0).build()
    }

    fn s(v: &str) -> QueryParam {
        QueryParam::String(v.to_string())
    }

    #[test]
    fn test_empty_filter_hides_deleted() {
        let (sql, params) = build("");
        assert_eq!(sql, "a.deleted_at IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_include_hidden_empty_is_true() {
        let filter = SearchFilter {
            include_hidden: true,
            ..Default::default()
        };
        let (sql, params) = SearchFilterQueryBuilder::new(&filter, 0).build();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_text_terms_bound_in_order() {
        let (sql, params) = build("foo ~bar ~baz -qux");
        assert!(sql.contains(
            "a.fts @@ (phraseto_tsquery('simple', $1::text) && \
             (phraseto_tsquery('simple', $2::text) || phraseto_tsquery('simple', $3::text)) \
             && !!(phraseto_tsquery('simple', $4::text)))"
        ));
        assert_eq!(params, vec![s("foo"), s("bar"), s("baz"), s("qux")]);
    }

    #[test]
    fn test_negation_only_uses_subquery() {
        let (sql, params) = build("-foo -bar");
        assert!(sql.contains("a.id NOT IN (SELECT x.id FROM archives x WHERE x.fts @@ ("));
        assert!(sql.contains("$1::text) && phraseto_tsquery('simple', $2::text))"));
        assert_eq!(params, vec![s("foo"), s("bar")]);
    }

    #[test]
    fn test_tag_groups() {
        let (sql, params) = build("artist:jane ~circle:a ~:b -parody:x*");
        assert!(sql.contains("LOWER(t.namespace) = LOWER($1::text) AND t.name ILIKE $2::text"));
        assert!(sql.contains(" OR "));
        assert!(sql.contains("NOT EXISTS (SELECT 1 FROM archive_tags atag"));
        assert_eq!(
            params,
            vec![
                s("artist"),
                s("jane"),
                s("circle"),
                s("a"),
                s("b"),
                s("parody"),
                s("x%"),
            ]
        );
    }

    #[test]
    fn test_wildcard_namespace_has_no_namespace_predicate() {
        let (sql, params) = build(":glasses");
        assert!(!sql.contains("t.namespace"));
        assert_eq!(params, vec![s("glasses")]);
    }

    #[test]
    fn test_like_wildcards_pass_through() {
        let (_, params) = build("artist:ja% circle:st_dio");
        assert_eq!(params[1], s("ja%"));
        assert_eq!(params[3], s("st_dio"));
    }

    #[test]
    fn test_language_is_escaped() {
        let (_, params) = build("language:eng_ish");
        assert_eq!(params, vec![s("eng\\_ish")]);
    }

    #[test]
    fn test_url_and_source_count() {
        let (sql, params) = build("url:example.test/g/1 sources>0");
        assert!(sql.contains(
            "(SELECT COUNT(*) FROM archive_sources src WHERE src.archive_id = a.id) > $1::bigint"
        ));
        assert!(sql.contains("src.url ILIKE $2::text"));
        assert_eq!(params, vec![QueryParam::Int(0), s("%example.test/g/1")]);
    }

    #[test]
    fn test_param_offset() {
        let filter = SearchFilter::parse("artist:jane");
        let (sql, params) = SearchFilterQueryBuilder::new(&filter, 3).build();
        assert!(sql.contains("$4::text"));
        assert!(sql.contains("$5::text"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_ranges_languages_sources() {
        let (sql, params) = build("pages>=20 size<1k tags=3 artist>1 language:english source:site*");
        assert!(sql.contains("a.pages >= $1::bigint"));
        assert!(sql.contains("a.size < $2::bigint"));
        assert!(sql.contains("WHERE atag.archive_id = a.id) = $3::bigint"));
        assert!(sql.contains("LOWER(t.namespace) = LOWER($4::text)) > $5::bigint"));
        assert!(sql.contains("a.language ILIKE $6::text"));
        assert!(sql.contains("src.name ILIKE $7::text"));
        assert_eq!(
            params,
            vec![
                QueryParam::Int(20),
                QueryParam::Int(1024),
                QueryParam::Int(3),
                s("artist"),
                QueryParam::Int(1),
                s("english"),
                s("site%"),
            ]
        );
    }

    #[test]
    fn test_clauses_joined_with_and() {
        let (sql, _) = build("foo artist:a");
        assert_eq!(sql.matches(" AND EXISTS").count(), 1);
        assert!(sql.starts_with("a.deleted_at IS NULL AND a.fts @@"));
    }
}

//! Search executor round-trip: filter + native ordering in one query.

use std::time::Instant;

use sqlx::{PgPool, Row};
use tracing::debug;

use gallery_core::{Result, SearchFilter, SearchRow, Sort, SortPlan};

use crate::filter::{QueryParam, SearchFilterQueryBuilder};

/// ORDER BY for a plan. NULL release dates sort as the smallest value.
pub fn order_clause(plan: &SortPlan) -> String {
    let Some((sort, order)) = plan.native() else {
        return "a.id ASC".to_string();
    };
    let dir = order.as_sql();
    match sort {
        Sort::ReleasedAt => {
            let nulls = if order.is_descending() { "LAST" } else { "FIRST" };
            format!("a.released_at {dir} NULLS {nulls}, a.id {dir}")
        }
        Sort::CreatedAt => format!("a.created_at {dir}, a.id {dir}"),
        Sort::Pages => format!("a.pages {dir}, a.id {dir}"),
        Sort::Title | Sort::Random => "a.id ASC".to_string(),
    }
}

/// Full SQL text and parameters for a search.
pub fn build_search_sql(filter: &SearchFilter, plan: &SortPlan) -> (String, Vec<QueryParam>) {
    let (where_clause, params) = SearchFilterQueryBuilder::new(filter, 0).build();
    let sql = format!(
        "SELECT a.id, a.title FROM archives a WHERE {} ORDER BY {}",
        where_clause,
        order_clause(plan)
    );
    (sql, params)
}

/// Load every matching `(id, title)` row.
pub async fn search_rows(
    pool: &PgPool,
    filter: &SearchFilter,
    plan: &SortPlan,
) -> Result<Vec<SearchRow>> {
    let start = Instant::now();
    let (sql, params) = build_search_sql(filter, plan);
    debug!(
        subsystem = "db",
        component = "search",
        op = "search_rows",
        param_count = params.len(),
        sql = %sql,
        "Executing search query"
    );

    let mut q = sqlx::query(&sql);
    for param in &params {
        q = match param {
            QueryParam::Int(val) => q.bind(val),
            QueryParam::String(s) => q.bind(s),
        };
    }

    let rows = q.fetch_all(pool).await?;
    let results = rows
        .iter()
        .map(|row| Ok(SearchRow::new(row.try_get("id")?, row.try_get::<String, _>("title")?)))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        subsystem = "db",
        component = "search",
        op = "search_rows",
        result_count = results.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Search query complete"
    );
    Ok(results)
}

//! Listing query parameters.

use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::defaults;
use crate::sorting::{Order, Sort};

/// Normalised listing request.
///
/// Built once per request by [`Query::from_params`]; invalid values are
/// replaced with configured defaults instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub search: String,
    pub sort: Sort,
    pub order: Order,
    pub seed: String,
    /// 1-based.
    pub page: usize,
    pub limit: usize,
    pub include_hidden: bool,
    /// Extra `namespace:name` entries excluded from results.
    pub tag_blacklist: Vec<String>,
}

impl Query {
    /// Query with every field at its configured default.
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            search: String::new(),
            sort: config.default_sort,
            order: config.default_order,
            seed: String::new(),
            page: defaults::FIRST_PAGE,
            limit: config.default_page_limit(),
            include_hidden: false,
            tag_blacklist: Vec::new(),
        }
    }

    /// Build from URL query parameters.
    ///
    /// - `q` is percent-decoded and `$` characters are removed
    /// - `sort` / `order` fall back to the configured defaults when invalid
    /// - `page` is clamped to at least 1
    /// - `limit` must be one of the configured page sizes
    pub fn from_params(params: &HashMap<String, String>, config: &SiteConfig) -> Self {
        let mut query = Self::new(config);

        if let Some(raw) = params.get("q") {
            let decoded = urlencoding::decode(raw)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.clone());
            query.search = decoded.replace('$', "").trim().to_string();
        }

        if let Some(sort) = params.get("sort").and_then(|s| s.parse::<Sort>().ok()) {
            query.sort = sort;
        }
        if let Some(order) = params.get("order").and_then(|s| s.parse::<Order>().ok()) {
            query.order = order;
        }
        if let Some(seed) = params.get("seed") {
            query.seed = seed.clone();
        }

        if let Some(page) = params.get("page") {
            query.page = match page.trim().parse::<i64>() {
                Ok(p) if p >= 1 => usize::try_from(p).unwrap_or(defaults::FIRST_PAGE),
                _ => defaults::FIRST_PAGE,
            };
        }

        if let Some(limit) = params
            .get("limit")
            .and_then(|l| l.trim().parse::<usize>().ok())
        {
            if config.page_limits().contains(&limit) {
                query.limit = limit;
            }
        }

        query
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: Sort, order: Order) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page.max(defaults::FIRST_PAGE);
        self.limit = limit;
        self
    }

    pub fn with_include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn with_tag_blacklist(mut self, entries: Vec<String>) -> Self {
        self.tag_blacklist = entries;
        self
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1)).saturating_mul(self.limit)
    }
}

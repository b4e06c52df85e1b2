//! Library listing pipeline.
//!
//! `Query -> SearchFilter + SortPlan -> ordered IDs -> PageWindow ->
//! hydrated records (window order) -> tag post-processing -> Paginated`.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::filter::SearchFilter;
use crate::hydrate::reorder_to_window;
use crate::models::{ApiGallery, ApiGalleryItem, GalleryItem, Identified, Tag, Tagged};
use crate::ordering::SortPlan;
use crate::pagination::{paginate, Paginated};
use crate::query::Query;
use crate::tags::{process_records, process_tags};
use crate::traits::GalleryRepository;

/// Search, paginate and hydrate gallery listings.
#[derive(Clone)]
pub struct LibraryService {
    repo: Arc<dyn GalleryRepository>,
    config: Arc<SiteConfig>,
}

impl LibraryService {
    pub fn new(repo: Arc<dyn GalleryRepository>, config: Arc<SiteConfig>) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Every matching gallery ID, fully ordered.
    #[instrument(skip(self, query), fields(subsystem = "search", component = "executor", op = "search"))]
    pub async fn search(&self, query: &Query) -> Result<Vec<i64>> {
        let filter = SearchFilter::from_query(query);
        let plan = SortPlan::for_query(query);
        debug!(
            query = %query.search,
            sort = %query.sort,
            order = %query.order,
            filter = %filter.summary(),
            "Executing search"
        );

        let start = Instant::now();
        let rows = self.repo.search_rows(&filter, &plan).await?;
        let ids = plan.apply(rows);
        debug!(
            result_count = ids.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(ids)
    }

    /// Site listing page.
    pub async fn library(&self, query: &Query) -> Result<Paginated<GalleryItem>> {
        self.page(query, |ids| async move { self.repo.library_items(&ids).await })
            .await
    }

    /// API listing page.
    pub async fn api_library(&self, query: &Query) -> Result<Paginated<ApiGalleryItem>> {
        self.page(query, |ids| async move { self.repo.api_library_items(&ids).await })
            .await
    }

    async fn page<T, F, Fut>(&self, query: &Query, hydrate: F) -> Result<Paginated<T>>
    where
        T: Identified + Tagged,
        F: FnOnce(Vec<i64>) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let ids = self.search(query).await?;
        let window = paginate(&ids, query.page, query.limit);
        debug!(
            subsystem = "search",
            component = "paginator",
            page = query.page,
            limit = query.limit,
            total = window.total,
            window = window.ids.len(),
            "Page window cut"
        );
        if window.is_empty() {
            return Ok(Paginated::empty(query.page, query.limit, window.total));
        }

        let records = hydrate(window.ids.clone()).await?;
        debug!(
            subsystem = "search",
            component = "hydrator",
            op = "hydrate",
            result_count = records.len(),
            "Records hydrated"
        );
        let mut records = reorder_to_window(records, &window.ids)?;
        process_records(
            &mut records,
            self.config.tag_excludes(),
            self.config.tag_weights(),
        );

        Ok(Paginated::new(records, query.page, query.limit, window.total))
    }

    /// Gallery detail with processed tags.
    pub async fn gallery(&self, id: i64, include_hidden: bool) -> Result<ApiGallery> {
        let mut gallery = self
            .repo
            .gallery(id, include_hidden)
            .await?
            .ok_or(Error::GalleryNotFound(id))?;
        let tags = std::mem::take(&mut gallery.tags);
        gallery.tags = process_tags(
            tags,
            self.config.tag_excludes(),
            self.config.tag_weights(),
        );
        Ok(gallery)
    }

    pub async fn tag_list(&self) -> Result<Vec<Tag>> {
        self.repo.tag_list().await
    }
}

//! Core traits for gallery storage backends.
//!
//! The engine only needs two round-trips per listing: one that filters and
//! (for native sorts) orders, and one that hydrates a page window.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::SearchFilter;
use crate::models::{ApiGallery, ApiGalleryItem, GalleryItem, SearchRow, Tag};
use crate::ordering::SortPlan;

/// Storage backend for gallery listings.
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Every `(id, title)` row matching `filter`.
    ///
    /// For [`SortPlan::Native`] rows come back in that order with ties broken
    /// by ID in the same direction; for other plans, by ascending ID.
    async fn search_rows(&self, filter: &SearchFilter, plan: &SortPlan) -> Result<Vec<SearchRow>>;

    /// Site projections for `ids`, in any order. Tags are in insertion order.
    async fn library_items(&self, ids: &[i64]) -> Result<Vec<GalleryItem>>;

    /// API projections for `ids`, in any order. Tags are in insertion order.
    async fn api_library_items(&self, ids: &[i64]) -> Result<Vec<ApiGalleryItem>>;

    /// Full detail, or `None` when missing (or hidden and not requested).
    async fn gallery(&self, id: i64, include_hidden: bool) -> Result<Option<ApiGallery>>;

    /// Every distinct tag.
    async fn tag_list(&self) -> Result<Vec<Tag>>;
}

//! In-memory [`GalleryRepository`] for tests and local development.
//!
//! Evaluates [`SearchFilter`] with the same semantics storage uses, with one
//! simplification: a free-text term matches when it occurs as a substring
//! of the lower-cased title, description or any tag name.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::filter::SearchFilter;
use crate::models::{ApiGallery, ApiGalleryItem, GalleryItem, SearchRow, Source, Tag};
use crate::ordering::SortPlan;
use crate::sorting::Sort;
use crate::tag_filter::{escape_like, like_matches, like_pattern};
use crate::traits::GalleryRepository;

/// Full stored state of one gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGallery {
    pub id: i64,
    pub hash: String,
    pub title: String,
    pub description: Option<String>,
    pub pages: i32,
    pub thumbnail: i32,
    pub language: Option<String>,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Insertion order.
    pub tags: Vec<Tag>,
    pub sources: Vec<Source>,
}

impl StoredGallery {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            hash: format!("{:032x}", id),
            title: title.into(),
            description: None,
            pages: 1,
            thumbnail: 1,
            language: None,
            size: 0,
            created_at: DateTime::<Utc>::default(),
            released_at: None,
            deleted_at: None,
            tags: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[(&str, &str)]) -> Self {
        self.tags = tags.iter().map(|(ns, name)| Tag::new(*ns, *name)).collect();
        self
    }

    fn haystack(&self) -> String {
        let mut text = self.title.to_lowercase();
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(&description.to_lowercase());
        }
        for tag in &self.tags {
            text.push(' ');
            text.push_str(&tag.name.to_lowercase());
        }
        text
    }

    fn matches_text(&self, filter: &SearchFilter) -> bool {
        let text = &filter.text;
        if text.is_empty() {
            return true;
        }
        let haystack = self.haystack();
        let has = |term: &String| haystack.contains(term.as_str());

        let all = text.all.iter().all(has);
        let any = text.any.is_empty() || text.any.iter().any(has);
        let none = text.none.is_empty() || !text.none.iter().all(has);
        all && any && none
    }

    fn matches(&self, filter: &SearchFilter) -> bool {
        if !filter.include_hidden && self.deleted_at.is_some() {
            return false;
        }
        if !self.matches_text(filter) || !filter.tags.matches(&self.tags) {
            return false;
        }

        let ranges = &filter.ranges;
        if ranges.pages.is_some_and(|c| !c.holds(i64::from(self.pages)))
            || ranges.size.is_some_and(|c| !c.holds(self.size))
            || ranges.tag_count.is_some_and(|c| !c.holds(self.tags.len() as i64))
            || ranges
                .source_count
                .is_some_and(|c| !c.holds(self.sources.len() as i64))
        {
            return false;
        }
        for (namespace, cond) in &ranges.namespace_counts {
            let count = self
                .tags
                .iter()
                .filter(|t| t.namespace.eq_ignore_ascii_case(namespace))
                .count();
            if !cond.holds(count as i64) {
                return false;
            }
        }

        let language_ok = filter.languages.iter().all(|lang| {
            self.language
                .as_deref()
                .is_some_and(|l| like_matches(&escape_like(lang), l))
        });
        let source_ok = filter.sources.is_empty()
            || filter.sources.iter().any(|pattern| {
                let pattern = like_pattern(pattern);
                self.sources.iter().any(|s| like_matches(&pattern, &s.name))
            });
        let url_ok = filter.urls.is_empty()
            || filter.urls.iter().any(|url| {
                let pattern = format!("%{}", like_pattern(url));
                self.sources
                    .iter()
                    .filter_map(|s| s.url.as_deref())
                    .any(|u| like_matches(&pattern, u))
            });
        language_ok && source_ok && url_ok
    }

    fn native_cmp(&self, other: &Self, sort: Sort) -> Ordering {
        let primary = match sort {
            Sort::ReleasedAt => match (self.released_at, other.released_at) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            },
            Sort::CreatedAt => self.created_at.cmp(&other.created_at),
            Sort::Pages => self.pages.cmp(&other.pages),
            Sort::Title | Sort::Random => Ordering::Equal,
        };
        primary.then(self.id.cmp(&other.id))
    }

    fn to_library_item(&self) -> GalleryItem {
        GalleryItem {
            id: self.id,
            hash: self.hash.clone(),
            title: self.title.clone(),
            pages: self.pages,
            thumbnail: self.thumbnail,
            deleted_at: self.deleted_at,
            tags: self.tags.clone(),
        }
    }

    fn to_api_item(&self) -> ApiGalleryItem {
        ApiGalleryItem {
            id: self.id,
            hash: self.hash.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            pages: self.pages,
            thumbnail: self.thumbnail,
            language: self.language.clone(),
            size: self.size,
            created_at: self.created_at,
            released_at: self.released_at,
            tags: self.tags.clone(),
        }
    }

    fn to_gallery(&self) -> ApiGallery {
        ApiGallery {
            id: self.id,
            hash: self.hash.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            pages: self.pages,
            thumbnail: self.thumbnail,
            language: self.language.clone(),
            size: self.size,
            created_at: self.created_at,
            released_at: self.released_at,
            deleted_at: self.deleted_at,
            tags: self.tags.clone(),
            sources: self.sources.clone(),
        }
    }
}

/// Repository over a fixed list of galleries.
///
/// Hydration returns records in descending ID order, not window order, the
/// way an unordered join would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGalleryRepository {
    galleries: Vec<StoredGallery>,
}

impl InMemoryGalleryRepository {
    pub fn new(galleries: Vec<StoredGallery>) -> Self {
        Self { galleries }
    }

    fn hydrate<T>(&self, ids: &[i64], project: impl Fn(&StoredGallery) -> T) -> Vec<T> {
        let mut found: Vec<&StoredGallery> = self
            .galleries
            .iter()
            .filter(|g| ids.contains(&g.id))
            .collect();
        found.sort_by(|a, b| b.id.cmp(&a.id));
        found.into_iter().map(project).collect()
    }
}

#[async_trait]
impl GalleryRepository for InMemoryGalleryRepository {
    async fn search_rows(&self, filter: &SearchFilter, plan: &SortPlan) -> Result<Vec<SearchRow>> {
        let mut matched: Vec<&StoredGallery> =
            self.galleries.iter().filter(|g| g.matches(filter)).collect();

        match plan.native() {
            Some((sort, order)) => {
                matched.sort_by(|a, b| {
                    let ord = a.native_cmp(b, sort);
                    if order.is_descending() {
                        ord.reverse()
                    } else {
                        ord
                    }
                });
            }
            None => matched.sort_by_key(|g| g.id),
        }

        Ok(matched
            .into_iter()
            .map(|g| SearchRow::new(g.id, g.title.clone()))
            .collect())
    }

    async fn library_items(&self, ids: &[i64]) -> Result<Vec<GalleryItem>> {
        Ok(self.hydrate(ids, StoredGallery::to_library_item))
    }

    async fn api_library_items(&self, ids: &[i64]) -> Result<Vec<ApiGalleryItem>> {
        Ok(self.hydrate(ids, StoredGallery::to_api_item))
    }

    async fn gallery(&self, id: i64, include_hidden: bool) -> Result<Option<ApiGallery>> {
        Ok(self
            .galleries
            .iter()
            .find(|g| g.id == id && (include_hidden || g.deleted_at.is_none()))
            .map(StoredGallery::to_gallery))
    }

    async fn tag_list(&self) -> Result<Vec<Tag>> {
        let unique: BTreeSet<(String, String)> = self
            .galleries
            .iter()
            .flat_map(|g| g.tags.iter())
            .map(|t| (t.namespace.clone(), t.name.clone()))
            .collect();
        Ok(unique
            .into_iter()
            .map(|(namespace, name)| Tag { namespace, name })
            .collect())
    }
}

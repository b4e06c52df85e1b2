//! Core data models for the gallery browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// TAG TYPES
// =============================================================================

/// A `{namespace, name}` tag attached to a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub namespace: String,
    pub name: String,
}

impl Tag {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// External source a gallery was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// Minimal row loaded by the search executor: enough to sort in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub id: i64,
    pub title: String,
}

impl SearchRow {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

// =============================================================================
// HYDRATED RECORDS
// =============================================================================

/// Record types that carry their gallery ID.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Record types that carry a tag list for post-processing.
pub trait Tagged {
    fn tags_mut(&mut self) -> &mut Vec<Tag>;
}

/// Site listing projection of a gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: i64,
    pub hash: String,
    pub title: String,
    pub pages: i32,
    pub thumbnail: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

/// API listing projection of a gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGalleryItem {
    pub id: i64,
    pub hash: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pages: i32,
    pub thumbnail: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

/// Full gallery detail, including sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGallery {
    pub id: i64,
    pub hash: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pages: i32,
    pub thumbnail: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
    pub sources: Vec<Source>,
}

impl Identified for GalleryItem {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for ApiGalleryItem {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for ApiGallery {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Tagged for GalleryItem {
    fn tags_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.tags
    }
}

impl Tagged for ApiGalleryItem {
    fn tags_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.tags
    }
}

impl Tagged for ApiGallery {
    fn tags_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.tags
    }
}

//! Site listing configuration.
//!
//! Loaded once at startup from a TOML file, normalised (default tag rules
//! prepended) and validated, then shared immutably behind an `Arc` and passed
//! into every call that needs it.
//!
//! ```toml
//! site_name = "My Gallery"
//! default_sort = "released_at"
//! default_order = "desc"
//!
//! [gallery_listing]
//! page_limits = [24, 48]
//! default_page_limit = 24
//!
//! [[gallery_listing.tag_weight]]
//! namespace = "character"
//! weight = 500
//!
//! [[gallery_listing.tag_exclude]]
//! namespace = "other"
//! name = ["uncensored", "full color"]
//! ignore_case = true
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::defaults;
use crate::error::{Error, Result};
use crate::sorting::{Order, Sort};

/// Accepts `name = "x"` as well as `name = ["x", "y"]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

fn default_true() -> bool {
    true
}

fn default_page_limits() -> Vec<usize> {
    defaults::PAGE_LIMITS.to_vec()
}

/// Rule assigning a display weight to matching tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagWeight {
    #[serde(default, rename = "name", deserialize_with = "one_or_many")]
    pub names: Vec<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub weight: i32,
}

impl TagWeight {
    pub fn namespace(namespace: impl Into<String>, weight: i32) -> Self {
        Self {
            namespace: Some(namespace.into()),
            weight,
            ..Default::default()
        }
    }
}

/// Rule removing matching tags from hydrated records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagExclude {
    #[serde(default, rename = "name", deserialize_with = "one_or_many")]
    pub names: Vec<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub ignore_case: bool,
}

impl TagExclude {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }
}

/// Listing options under `[gallery_listing]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryListing {
    /// Allowed page sizes; an explicit empty list is rejected.
    #[serde(default = "default_page_limits")]
    pub page_limits: Vec<usize>,
    /// Zero selects the first entry of `page_limits`.
    #[serde(default)]
    pub default_page_limit: usize,
    #[serde(default)]
    pub tag_weight: Vec<TagWeight>,
    #[serde(default)]
    pub tag_exclude: Vec<TagExclude>,
    #[serde(default = "default_true")]
    pub use_default_tag_weight: bool,
    #[serde(default = "default_true")]
    pub use_default_tag_exclude: bool,
}

impl Default for GalleryListing {
    fn default() -> Self {
        Self {
            page_limits: default_page_limits(),
            default_page_limit: 0,
            tag_weight: Vec::new(),
            tag_exclude: Vec::new(),
            use_default_tag_weight: true,
            use_default_tag_exclude: true,
        }
    }
}

/// Top-level site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default)]
    pub default_sort: Sort,
    #[serde(default)]
    pub default_order: Order,
    #[serde(default)]
    pub gallery_listing: GalleryListing,
}

fn default_site_name() -> String {
    defaults::SITE_NAME.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            default_sort: Sort::default(),
            default_order: Order::default(),
            gallery_listing: GalleryListing::default(),
        }
    }
}

impl SiteConfig {
    /// Built-in configuration with default rules applied.
    pub fn builtin() -> Self {
        let mut config = Self::default();
        config.normalize();
        config
    }

    /// Parse, normalise and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: SiteConfig = toml::from_str(raw)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        info!(
            subsystem = "config",
            op = "load",
            path = %path.display(),
            page_limits = ?config.gallery_listing.page_limits,
            "Site configuration loaded"
        );
        Ok(config)
    }

    /// Load from `path`, falling back to built-in defaults when the file
    /// does not exist. Parse and validation errors are still returned.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    subsystem = "config",
                    op = "load",
                    path = %path.display(),
                    "Configuration file not found, using built-in defaults"
                );
                Ok(Self::builtin())
            }
            other => other,
        }
    }

    /// Prepend default tag rules and fill an unset default page size.
    ///
    /// Applied once by the loaders; the default rules are prepended so
    /// user rules are consulted after them.
    pub fn normalize(&mut self) {
        let listing = &mut self.gallery_listing;

        if listing.default_page_limit == 0 {
            if let Some(first) = listing.page_limits.first() {
                listing.default_page_limit = *first;
            }
        }

        if listing.use_default_tag_weight {
            let mut weights = vec![
                TagWeight::namespace("artist", defaults::WEIGHT_ARTIST),
                TagWeight::namespace("circle", defaults::WEIGHT_CIRCLE),
                TagWeight::namespace("parody", defaults::WEIGHT_PARODY),
            ];
            weights.append(&mut listing.tag_weight);
            listing.tag_weight = weights;
            listing.use_default_tag_weight = false;
        }

        if listing.use_default_tag_exclude {
            let mut excludes = vec![TagExclude {
                names: defaults::EXCLUDED_PARODY_NAMES
                    .iter()
                    .map(|n| n.to_string())
                    .collect(),
                namespace: Some("parody".to_string()),
                ignore_case: true,
            }];
            excludes.extend(
                defaults::EXCLUDED_NAMESPACES
                    .iter()
                    .map(|ns| TagExclude::namespace(*ns)),
            );
            excludes.append(&mut listing.tag_exclude);
            listing.tag_exclude = excludes;
            listing.use_default_tag_exclude = false;
        }

        let inert_weights = listing
            .tag_weight
            .iter()
            .filter(|r| r.names.is_empty() && r.namespace.is_none())
            .count();
        let inert_excludes = listing
            .tag_exclude
            .iter()
            .filter(|r| r.names.is_empty() && r.namespace.is_none())
            .count();
        if inert_weights + inert_excludes > 0 {
            warn!(
                subsystem = "config",
                op = "normalize",
                inert_weights,
                inert_excludes,
                "Tag rules without name or namespace never match"
            );
        }

        debug!(
            subsystem = "config",
            op = "normalize",
            weights = listing.tag_weight.len(),
            excludes = listing.tag_exclude.len(),
            "Tag rules normalized"
        );
    }

    pub fn validate(&self) -> Result<()> {
        let listing = &self.gallery_listing;

        if listing.page_limits.is_empty() {
            return Err(Error::Config(
                "gallery_listing.page_limits must be non-empty".to_string(),
            ));
        }
        if listing.page_limits.contains(&0) {
            return Err(Error::Config(
                "gallery_listing.page_limits entries must be positive".to_string(),
            ));
        }
        if listing.default_page_limit != 0
            && !listing.page_limits.contains(&listing.default_page_limit)
        {
            return Err(Error::Config(format!(
                "gallery_listing.default_page_limit {} is not one of page_limits {:?}",
                listing.default_page_limit, listing.page_limits
            )));
        }
        Ok(())
    }

    pub fn page_limits(&self) -> &[usize] {
        &self.gallery_listing.page_limits
    }

    /// Default page size; the first whitelisted size when unset.
    pub fn default_page_limit(&self) -> usize {
        match self.gallery_listing.default_page_limit {
            0 => self
                .gallery_listing
                .page_limits
                .first()
                .copied()
                .unwrap_or(defaults::PAGE_LIMITS[0]),
            limit => limit,
        }
    }

    pub fn tag_weights(&self) -> &[TagWeight] {
        &self.gallery_listing.tag_weight
    }

    pub fn tag_excludes(&self) -> &[TagExclude] {
        &self.gallery_listing.tag_exclude
    }
}

//! # gallery-core
//!
//! Storage-agnostic engine for browsing a tagged gallery collection.
//!
//! A listing request flows through:
//!
//! 1. [`Query`]: normalised URL parameters
//! 2. [`SearchFilter`]: free-text, tag, range, language and source clauses
//!    from one tokenizer pass
//! 3. [`GalleryRepository::search_rows`] + [`SortPlan`]: the full ordered
//!    ID list
//! 4. [`paginate`]: the page window and total
//! 5. hydration + [`reorder_to_window`]: records in window order
//! 6. [`process_tags`]: exclude rules and weight ordering
//!
//! [`LibraryService`] wires these together.

pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod fts;
pub mod hydrate;
pub mod memory;
pub mod models;
pub mod ordering;
pub mod pagination;
pub mod query;
pub mod service;
pub mod sorting;
pub mod syntax;
pub mod tag_filter;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{GalleryListing, SiteConfig, TagExclude, TagWeight};
pub use error::{Error, Result};
pub use filter::{RangeCondition, RangeFilters, SearchFilter};
pub use fts::{FtsClause, FtsFragments};
pub use hydrate::reorder_to_window;
pub use memory::{InMemoryGalleryRepository, StoredGallery};
pub use models::*;
pub use ordering::{natural_cmp, seed_from_str, seeded_shuffle, SortPlan};
pub use pagination::{paginate, PageWindow, Paginated};
pub use query::Query;
pub use service::LibraryService;
pub use sorting::{Order, Sort};
pub use syntax::{tokenize, Comparison, Prefix, Token};
pub use tag_filter::{escape_like, like_matches, like_pattern, TagFilter, TagMatch};
pub use tags::{process_tags, TagRule};
pub use traits::*;

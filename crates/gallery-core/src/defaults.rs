//! Centralized default constants for the gallery browser.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// SITE
// =============================================================================

/// Default site name shown by the API root endpoint.
pub const SITE_NAME: &str = "Gallery";

/// Default config file path (overridden by `GALLERY_CONFIG`).
pub const CONFIG_PATH: &str = "gallery.toml";

// =============================================================================
// PAGINATION
// =============================================================================

/// Page sizes accepted when the config leaves `page_limits` empty.
pub const PAGE_LIMITS: &[usize] = &[24];

/// First page number. Page numbers are 1-based.
pub const FIRST_PAGE: usize = 1;

// =============================================================================
// TAG WEIGHTS
// =============================================================================

/// Weight for the `artist` namespace when default weights are enabled.
pub const WEIGHT_ARTIST: i32 = 1000;

/// Weight for the `circle` namespace when default weights are enabled.
pub const WEIGHT_CIRCLE: i32 = 999;

/// Weight for the `parody` namespace when default weights are enabled.
pub const WEIGHT_PARODY: i32 = 998;

// =============================================================================
// TAG EXCLUDES
// =============================================================================

/// Parody names hidden by default (case-insensitive).
pub const EXCLUDED_PARODY_NAMES: &[&str] = &["original", "original work"];

/// Namespaces hidden entirely by default.
pub const EXCLUDED_NAMESPACES: &[&str] = &["magazine", "event", "publisher"];

// =============================================================================
// SEARCH
// =============================================================================

/// Search keys that are filters of their own and never tag matches.
pub const RESERVED_SEARCH_KEYS: &[&str] =
    &["language", "source", "sources", "url", "size", "tags", "pages"];

/// Multiplier applied per size unit step (`k`, `m`, `g`).
pub const SIZE_UNIT_STEP: i64 = 1024;

/// Text search configuration used for documents and queries.
pub const FTS_CONFIG: &str = "simple";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

// =============================================================================
// DATABASE POOL
// =============================================================================

/// Default maximum connections in the pool.
pub const POOL_MAX_CONNECTIONS: u32 = 10;

/// Default minimum idle connections.
pub const POOL_MIN_CONNECTIONS: u32 = 1;

/// Connection acquire timeout in seconds.
pub const POOL_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Idle timeout in seconds before a connection is closed.
pub const POOL_IDLE_TIMEOUT_SECS: u64 = 600;

/// Maximum connection lifetime in seconds.
pub const POOL_MAX_LIFETIME_SECS: u64 = 1800;

//! # gallery-db
//!
//! PostgreSQL storage layer for the gallery browser.
//!
//! This crate provides:
//! - Connection pool management
//! - SQL rendering of search filters (full-text, tag, range, language, source)
//! - The search and hydration round-trips behind [`GalleryRepository`]
//! - Schema migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gallery_db::{Database, LibraryService, PoolConfig, Query, SiteConfig};
//!
//! let db = Database::connect_with_config("postgres://localhost/gallery", PoolConfig::new()).await?;
//! let config = Arc::new(SiteConfig::builtin());
//! let service = LibraryService::new(Arc::new(db.galleries.clone()), config.clone());
//! let page = service.api_library(&Query::new(&config)).await?;
//! ```

pub mod filter;
pub mod galleries;
pub mod pool;
pub mod search;

// Always compiled so integration tests (in tests/) can use it.
pub mod test_fixtures;

// Re-export core types
pub use gallery_core::*;

pub use filter::{QueryParam, SearchFilterQueryBuilder};
pub use galleries::PgGalleryRepository;
pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};

/// Database context with the connection pool and repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Gallery listing repository.
    pub galleries: PgGalleryRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            galleries: PgGalleryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

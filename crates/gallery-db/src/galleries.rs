//! PostgreSQL gallery repository: search, hydration, detail and taxonomy.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use gallery_core::{
    ApiGallery, ApiGalleryItem, GalleryItem, GalleryRepository, Identified, Result, SearchFilter,
    SearchRow, SortPlan, Source, Tag, Tagged,
};

use crate::search;

const LIBRARY_ITEMS_SQL: &str = r#"
    SELECT a.id, a.hash, a.title, a.pages, a.thumbnail, a.deleted_at,
           t.namespace, t.name
    FROM archives a
    LEFT JOIN archive_tags atag ON atag.archive_id = a.id
    LEFT JOIN tags t ON t.id = atag.tag_id
    WHERE a.id = ANY($1)
    ORDER BY a.id, atag.created_at, atag.tag_id
"#;

const API_ITEMS_SQL: &str = r#"
    SELECT a.id, a.hash, a.title, a.description, a.pages, a.thumbnail,
           a.language, a.size, a.created_at, a.released_at,
           t.namespace, t.name
    FROM archives a
    LEFT JOIN archive_tags atag ON atag.archive_id = a.id
    LEFT JOIN tags t ON t.id = atag.tag_id
    WHERE a.id = ANY($1)
    ORDER BY a.id, atag.created_at, atag.tag_id
"#;

/// Group flat `archive LEFT JOIN tag` rows into one record per archive,
/// keeping each record's tags in row order.
fn group_tagged<T, F>(rows: &[PgRow], project: F) -> Result<Vec<T>>
where
    T: Identified + Tagged,
    F: Fn(&PgRow) -> Result<T>,
{
    let mut records: Vec<T> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let id: i64 = row.try_get("id")?;
        let pos = match index.get(&id) {
            Some(pos) => *pos,
            None => {
                records.push(project(row)?);
                index.insert(id, records.len() - 1);
                records.len() - 1
            }
        };
        let namespace: Option<String> = row.try_get("namespace")?;
        let name: Option<String> = row.try_get("name")?;
        if let (Some(namespace), Some(name)) = (namespace, name) {
            records[pos].tags_mut().push(Tag { namespace, name });
        }
    }

    Ok(records)
}

fn library_item(row: &PgRow) -> Result<GalleryItem> {
    Ok(GalleryItem {
        id: row.try_get("id")?,
        hash: row.try_get("hash")?,
        title: row.try_get("title")?,
        pages: row.try_get("pages")?,
        thumbnail: row.try_get("thumbnail")?,
        deleted_at: row.try_get("deleted_at")?,
        tags: Vec::new(),
    })
}

fn api_item(row: &PgRow) -> Result<ApiGalleryItem> {
    Ok(ApiGalleryItem {
        id: row.try_get("id")?,
        hash: row.try_get("hash")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        pages: row.try_get("pages")?,
        thumbnail: row.try_get("thumbnail")?,
        language: row.try_get("language")?,
        size: row.try_get("size")?,
        created_at: row.try_get("created_at")?,
        released_at: row.try_get("released_at")?,
        tags: Vec::new(),
    })
}

/// PostgreSQL implementation of [`GalleryRepository`].
#[derive(Clone)]
pub struct PgGalleryRepository {
    pool: PgPool,
}

impl PgGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate<T, F>(&self, sql: &str, ids: &[i64], project: F) -> Result<Vec<T>>
    where
        T: Identified + Tagged,
        F: Fn(&PgRow) -> Result<T>,
    {
        let start = Instant::now();
        let rows = sqlx::query(sql).bind(ids).fetch_all(&self.pool).await?;
        let records = group_tagged(&rows, project)?;
        debug!(
            subsystem = "db",
            component = "hydrator",
            op = "hydrate",
            requested = ids.len(),
            result_count = records.len(),
            row_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Hydrated page window"
        );
        Ok(records)
    }
}

#[async_trait]
impl GalleryRepository for PgGalleryRepository {
    async fn search_rows(&self, filter: &SearchFilter, plan: &SortPlan) -> Result<Vec<SearchRow>> {
        search::search_rows(&self.pool, filter, plan).await
    }

    async fn library_items(&self, ids: &[i64]) -> Result<Vec<GalleryItem>> {
        self.hydrate(LIBRARY_ITEMS_SQL, ids, library_item).await
    }

    async fn api_library_items(&self, ids: &[i64]) -> Result<Vec<ApiGalleryItem>> {
        self.hydrate(API_ITEMS_SQL, ids, api_item).await
    }

    async fn gallery(&self, id: i64, include_hidden: bool) -> Result<Option<ApiGallery>> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.hash, a.title, a.description, a.pages, a.thumbnail,
                   a.language, a.size, a.created_at, a.released_at, a.deleted_at
            FROM archives a
            WHERE a.id = $1 AND ($2 OR a.deleted_at IS NULL)
            "#,
        )
        .bind(id)
        .bind(include_hidden)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(
                subsystem = "db",
                component = "galleries",
                op = "gallery",
                gallery_id = id,
                include_hidden,
                "Gallery not found"
            );
            return Ok(None);
        };

        let tags = sqlx::query(
            r#"
            SELECT t.namespace, t.name
            FROM archive_tags atag
            JOIN tags t ON t.id = atag.tag_id
            WHERE atag.archive_id = $1
            ORDER BY atag.created_at, atag.tag_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|r| {
            Ok(Tag {
                namespace: r.try_get("namespace")?,
                name: r.try_get("name")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

        let sources = sqlx::query(
            "SELECT name, url FROM archive_sources WHERE archive_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|r| {
            Ok(Source {
                name: r.try_get("name")?,
                url: r.try_get("url")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(ApiGallery {
            id: row.try_get("id")?,
            hash: row.try_get("hash")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            pages: row.try_get("pages")?,
            thumbnail: row.try_get("thumbnail")?,
            language: row.try_get("language")?,
            size: row.try_get("size")?,
            created_at: row.try_get("created_at")?,
            released_at: row.try_get("released_at")?,
            deleted_at: row.try_get("deleted_at")?,
            tags,
            sources,
        }))
    }

    async fn tag_list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT namespace, name FROM tags ORDER BY namespace, name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| {
                Ok(Tag {
                    namespace: r.try_get("namespace")?,
                    name: r.try_get("name")?,
                })
            })
            .collect()
    }
}

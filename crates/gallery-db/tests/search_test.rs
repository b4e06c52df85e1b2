//! Database-backed search and hydration tests.
//!
//! Run with:
//! `cargo test -p gallery-db --features migrations -- --ignored --test-threads=1`

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use gallery_db::test_fixtures::TestDatabase;
use gallery_db::{
    Error, GalleryRepository, LibraryService, Order, Query, SearchFilter, SiteConfig, Sort,
    SortPlan, Source, StoredGallery, Tag,
};

fn fixtures() -> Vec<StoredGallery> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut galleries = vec![
        StoredGallery::new(1, "Vol 10 Finale")
            .with_tags(&[("female", "glasses"), ("artist", "jane"), ("parody", "original")]),
        StoredGallery::new(2, "vol 2 Beginnings").with_tags(&[("artist", "bob")]),
        StoredGallery::new(3, "Apple Orchard").with_tags(&[("circle", "studio"), ("artist", "jane")]),
        StoredGallery::new(4, "Hidden Draft").with_tags(&[("artist", "jane")]),
    ];
    for (i, g) in galleries.iter_mut().enumerate() {
        g.pages = (i as i32 + 1) * 10;
        g.size = (i as i64 + 1) * 1024;
        g.created_at = base + Duration::days(i as i64);
        g.released_at = Some(base + Duration::days(10 - i as i64));
        g.language = Some("English".to_string());
    }
    galleries[1].released_at = None;
    galleries[3].deleted_at = Some(base);
    galleries[2].sources = vec![Source {
        name: "example-site".to_string(),
        url: Some("https://example.test/g/3".to_string()),
    }];
    galleries
}

async fn setup() -> TestDatabase {
    let test_db = TestDatabase::new().await;
    test_db.seed(&fixtures()).await;
    test_db
}

async fn ids(db: &TestDatabase, search: &str, sort: Sort, order: Order) -> Vec<i64> {
    let filter = SearchFilter::parse(search);
    let plan = SortPlan::Native { sort, order };
    db.db
        .galleries
        .search_rows(&filter, &plan)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect()
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_released_at_nulls_last_when_descending() {
    let db = setup().await;
    assert_eq!(ids(&db, "", Sort::ReleasedAt, Order::Desc).await, vec![1, 3, 2]);
    assert_eq!(ids(&db, "", Sort::ReleasedAt, Order::Asc).await, vec![2, 3, 1]);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_full_text_matches_title_and_tags() {
    let db = setup().await;
    assert_eq!(ids(&db, "orchard", Sort::Pages, Order::Asc).await, vec![3]);
    assert_eq!(ids(&db, "glasses", Sort::Pages, Order::Asc).await, vec![1]);
    assert_eq!(ids(&db, "~apple ~finale", Sort::Pages, Order::Asc).await, vec![1, 3]);
    assert_eq!(ids(&db, "-vol", Sort::Pages, Order::Asc).await, vec![3]);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_tag_filters() {
    let db = setup().await;
    assert_eq!(ids(&db, "artist:jane", Sort::Pages, Order::Asc).await, vec![1, 3]);
    assert_eq!(ids(&db, "Artist:JA*", Sort::Pages, Order::Asc).await, vec![1, 3]);
    assert_eq!(ids(&db, "artist:jane -female:glasses", Sort::Pages, Order::Asc).await, vec![3]);
    assert_eq!(ids(&db, "~artist:bob ~circle:studio", Sort::Pages, Order::Asc).await, vec![2, 3]);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_range_language_and_source_filters() {
    let db = setup().await;
    assert_eq!(ids(&db, "pages>10", Sort::Pages, Order::Asc).await, vec![2, 3]);
    assert_eq!(ids(&db, "size<=1k", Sort::Pages, Order::Asc).await, vec![1]);
    assert_eq!(ids(&db, "tags>=2", Sort::Pages, Order::Asc).await, vec![1, 3]);
    assert_eq!(ids(&db, "artist=1 circle=1", Sort::Pages, Order::Asc).await, vec![3]);
    assert_eq!(ids(&db, "language:english", Sort::Pages, Order::Asc).await, vec![1, 2, 3]);
    assert_eq!(ids(&db, "source:example*", Sort::Pages, Order::Asc).await, vec![3]);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_source_url_and_count_filters() {
    let db = setup().await;
    assert_eq!(ids(&db, "url:example.test/g/3", Sort::Pages, Order::Asc).await, vec![3]);
    assert_eq!(
        ids(&db, "url:nowhere.test url:g/3", Sort::Pages, Order::Asc).await,
        vec![3]
    );
    assert!(ids(&db, "url:example.test", Sort::Pages, Order::Asc).await.is_empty());
    assert_eq!(ids(&db, "sources>0", Sort::Pages, Order::Asc).await, vec![3]);
    assert_eq!(ids(&db, "sources=0", Sort::Pages, Order::Asc).await, vec![1, 2]);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_storage_wildcards_in_tag_name() {
    let db = setup().await;
    assert_eq!(ids(&db, "artist:ja%", Sort::Pages, Order::Asc).await, vec![1, 3]);
    assert_eq!(ids(&db, "artist:b_b", Sort::Pages, Order::Asc).await, vec![2]);
    assert_eq!(
        ids(&db, "|artist:jane |female:glasses", Sort::Pages, Order::Asc).await,
        vec![1]
    );
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_hydration_keeps_tag_insertion_order() {
    let db = setup().await;
    let mut items = db.db.galleries.library_items(&[1, 3]).await.unwrap();
    items.sort_by_key(|i| i.id);
    assert_eq!(
        items[0].tags,
        vec![
            Tag::new("female", "glasses"),
            Tag::new("artist", "jane"),
            Tag::new("parody", "original"),
        ]
    );
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_library_service_over_postgres() {
    let db = setup().await;
    let config = Arc::new(SiteConfig::builtin());
    let service = LibraryService::new(Arc::new(db.db.galleries.clone()), config.clone());

    let query = Query::new(&config).with_sort(Sort::Title, Order::Asc);
    let page = service.api_library(&query).await.unwrap();
    let ids: Vec<i64> = page.data.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(page.total, 3);
    // Weighted and filtered: parody "original" dropped, artist first.
    assert_eq!(
        page.data[2].tags,
        vec![Tag::new("artist", "jane"), Tag::new("female", "glasses")]
    );
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_gallery_detail_and_taxonomy() {
    let db = setup().await;
    let repo = &db.db.galleries;

    assert!(repo.gallery(4, false).await.unwrap().is_none());
    assert!(repo.gallery(4, true).await.unwrap().is_some());

    let detail = repo.gallery(3, false).await.unwrap().unwrap();
    assert_eq!(detail.sources.len(), 1);
    assert_eq!(detail.tags[0], Tag::new("circle", "studio"));

    let tags = repo.tag_list().await.unwrap();
    assert_eq!(tags.len(), 5);

    let config = Arc::new(SiteConfig::builtin());
    let service = LibraryService::new(Arc::new(repo.clone()), config);
    assert!(matches!(
        service.gallery(99, true).await,
        Err(Error::GalleryNotFound(99))
    ));
}

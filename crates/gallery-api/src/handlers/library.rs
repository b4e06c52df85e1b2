//! Listing endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Query as UrlQuery, State},
    http::HeaderMap,
    Json,
};
use gallery_core::{ApiGalleryItem, GalleryItem, Paginated, Query};
use tracing::debug;

use crate::{error::ApiError, is_admin, AppState};

fn listing_query(state: &AppState, headers: &HeaderMap, params: &HashMap<String, String>) -> Query {
    let query = Query::from_params(params, state.service.config());
    query.with_include_hidden(is_admin(headers, state))
}

/// `GET /api/library`
pub async fn api_library(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlQuery(params): UrlQuery<HashMap<String, String>>,
) -> Result<Json<Paginated<ApiGalleryItem>>, ApiError> {
    let query = listing_query(&state, &headers, &params);
    debug!(page = query.page, limit = query.limit, "api library listing");
    Ok(Json(state.service.api_library(&query).await?))
}

/// `GET /library`
pub async fn library(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlQuery(params): UrlQuery<HashMap<String, String>>,
) -> Result<Json<Paginated<GalleryItem>>, ApiError> {
    let query = listing_query(&state, &headers, &params);
    Ok(Json(state.service.library(&query).await?))
}

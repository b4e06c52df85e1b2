//! Gallery detail and taxonomy endpoints.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use gallery_core::{ApiGallery, Tag};

use crate::{error::ApiError, is_admin, AppState};

/// `GET /api/g/:id`
pub async fn get_gallery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiGallery>, ApiError> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid gallery id: {}", id)))?;
    let gallery = state.service.gallery(id, is_admin(&headers, &state)).await?;
    Ok(Json(gallery))
}

/// `GET /api/taxonomy`
pub async fn taxonomy(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.service.tag_list().await?))
}

//! # gallery-api
//!
//! HTTP surface for the gallery browser. The binary in `main.rs` wires
//! configuration, tracing and Postgres; [`router`] is shared with tests.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderValue, Method},
    routing::get,
    Router,
};
use gallery_core::LibraryService;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LibraryService>,
    pub site_name: String,
    /// `None` disables admin access entirely.
    pub admin_key: Option<String>,
}

impl AppState {
    pub fn new(service: LibraryService, admin_key: Option<String>) -> Self {
        let site_name = service.config().site_name.clone();
        Self {
            service: Arc::new(service),
            site_name,
            admin_key: admin_key.filter(|k| !k.is_empty()),
        }
    }
}

/// True when the request carries `Authorization: Bearer <admin key>`.
pub fn is_admin(headers: &HeaderMap, state: &AppState) -> bool {
    let Some(expected) = state.admin_key.as_deref() else {
        return false;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim() == expected)
        .unwrap_or(false)
}

/// Time-ordered UUIDv7 request IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Parse a comma-separated origin list, skipping invalid entries.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api", get(handlers::index))
        .route("/api/library", get(handlers::library::api_library))
        .route("/library", get(handlers::library::library))
        .route("/api/g/:id", get(handlers::galleries::get_gallery))
        .route("/api/taxonomy", get(handlers::galleries::taxonomy))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .with_state(state)
}

//! Route table for the HTTP surface.

use crate::handlers;
use crate::middleware::log_requests;
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub const ENTRIES_PATH: &str = "/api/carbon-entries";
pub const ENTRY_SUMMARY_PATH: &str = "/api/carbon-entries/summary";
pub const ENTRY_PATH: &str = "/api/carbon-entries/{id}";
pub const HEALTH_PATH: &str = "/api/health";

/// Builds the application router over shared state.
///
/// `summary` is a static segment, so it wins over the `{id}` capture.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            ENTRIES_PATH,
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(ENTRY_SUMMARY_PATH, get(handlers::entry_summary))
        .route(
            ENTRY_PATH,
            get(handlers::get_entry)
                .put(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        .route(HEALTH_PATH, get(handlers::health))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/announce", get(crate::handlers::announce::announce_handler))
        .route("/health", get(crate::handlers::health::health_handler))
        // Admin endpoints (require API key)
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))
        .route("/torrent/add", get(crate::handlers::admin::torrent_add_handler))
        .route("/torrent/remove", get(crate::handlers::admin::torrent_remove_handler))
        .route("/user/add", get(crate::handlers::admin::user_add_handler))
        .route("/user/remove", get(crate::handlers::admin::user_remove_handler))
        .route("/wal/compact", post(crate::handlers::admin::wal_compact_handler))
        // Compliance endpoints (require API key)
        .route(
            "/compliance/record",
            get(crate::handlers::compliance::record_handler),
        )
        .route(
            "/compliance/list",
            get(crate::handlers::compliance::list_handler),
        )
        .route(
            "/compliance/clear",
            get(crate::handlers::compliance::clear_handler),
        )
        .route(
            "/compliance/threshold",
            get(crate::handlers::compliance::threshold_handler),
        )
        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)
        .with_state(state)
}

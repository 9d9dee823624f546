//! # api-adapters
//!
//! The REST layer for the lost-and-found portal. Built only with the
//! `web-axum` feature.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;

#[cfg(feature = "web-axum")]
pub use handlers::AppState;

/// Builds the full router.
///
/// Static segments such as `/api/items/recent` take priority over
/// `/api/items/{id}`, so the order of the routes below does not matter.
#[cfg(feature = "web-axum")]
pub fn build_router(state: AppState) -> axum::Router {
    use axum::routing::{get, post, put};

    axum::Router::new()
        .route("/api/items", get(handlers::list_items).post(handlers::create_item))
        .route("/api/items/recent", get(handlers::recent_items))
        .route("/api/items/search", get(handlers::search_items))
        .route(
            "/api/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/api/items/{id}/claim", put(handlers::claim_item))
        .route("/api/items/{id}/deliver", put(handlers::deliver_item))
        .route("/api/admin/sweep", post(handlers::run_sweep))
        .route("/healthz", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors_policy())
        .layer(middleware::trace_layer())
        .with_state(state)
}

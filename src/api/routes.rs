use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::handlers::{self, SharedState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<SharedState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check::<S>))
        // Schema-driven form definition
        .route("/api/ui-data", get(handlers::get_ui_data::<S>))
        // Process records
        .route("/api/add-record", post(handlers::add_record::<S>))
}

/// The router with state attached and, when enabled, a permissive CORS layer
pub fn build_app<S: Store + 'static>(state: SharedState<S>, cors_permissive: bool) -> Router {
    let router = create_router().with_state(state);
    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

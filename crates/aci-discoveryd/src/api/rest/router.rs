//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the main router.
///
/// The image and key repositories mount their own routes; every other
/// path falls through to the discovery handler.
pub fn create_router(state: AppState) -> Router {
    let images = state.images.clone();
    let keys = state.keys.clone();

    let router = Router::new()
        .fallback(handlers::discover)
        .with_state(state);
    let router = images.register(router);
    let router = keys.register(router);

    router.layer(TraceLayer::new_for_http())
}

//! Router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// URL prefix of static theme assets.
pub(crate) const THEME_PREFIX: &str = "/theme";

/// Create the application router.
///
/// Theme assets are served from disk when `theme_dir` exists; every other
/// path goes through the dispatch table.
pub(crate) fn create_router(state: Arc<AppState>, theme_dir: Option<&Path>) -> Router {
    let mut router = Router::new();

    if let Some(dir) = theme_dir.filter(|dir| dir.is_dir()) {
        router = router.nest_service(THEME_PREFIX, ServeDir::new(dir));
    }

    router
        .fallback(handlers::dispatch_request)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

//! Web server module for serving tracking pixels.
//!
//! Every GET path other than `/health` runs the pixel pipeline; the
//! last path segment may encode `campaign[.keyword].ext`. HEAD answers with
//! the same headers and is never tracked.

pub mod context;
pub mod handlers;
pub mod response;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use context::RequestContext;
pub use handlers::{head_pixel, health, serve_pixel, AppState, HealthResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(serve_pixel).head(head_pixel))
        .route("/*path", get(serve_pixel).head(head_pixel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

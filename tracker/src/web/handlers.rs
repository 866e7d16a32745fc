//! Pixel and health endpoint handlers.
//!
//! The pixel handler runs the request pipeline:
//! 1. Resolve the campaign from the filename or query
//! 2. Select the image (503 when none exists, nothing is tracked)
//! 3. Report the pageview (failures are only logged)
//! 4. Return the image with no-cache headers

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, OriginalUri, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::campaign::{CampaignResolver, CampaignSelection};
use crate::store::{ImageSelector, ResolvedImage, Selection};
use crate::tracking::{report_pageview, Tracker};
use crate::web::context::RequestContext;
use crate::web::response;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<CampaignResolver>,
    pub selector: Arc<ImageSelector>,
    pub tracker: Arc<dyn Tracker>,
}

impl AppState {
    pub fn new(config: Config, tracker: Arc<dyn Tracker>) -> Result<Self, regex::Error> {
        let resolver = CampaignResolver::new(&config.default_campaign, &config.image_extensions)?;
        let selector = ImageSelector::new(&config.image_dir, config.image_extensions.clone());

        Ok(Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            selector: Arc::new(selector),
            tracker,
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Pixel
// =============================================================================

/// Tracking pixel endpoint, mounted on every GET path.
pub async fn serve_pixel(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let ctx = RequestContext::from_parts(
        &uri,
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.config.trust_proxy_headers,
    );

    let (selection, image) = match resolve_image(&state, &ctx).await {
        Some(found) => found,
        None => return response::unavailable(),
    };

    report_pageview(state.tracker.as_ref(), &selection, &ctx).await;

    match response::image_response(&image).await {
        Ok(resp) => {
            info!(
                campaign = %selection.campaign,
                image = %image.path.display(),
                content_type = image.content_type,
                "pixel_served"
            );
            resp
        }
        Err(e) => {
            error!(
                campaign = %selection.campaign,
                image = %image.path.display(),
                error = %e,
                "pixel_read_failed"
            );
            response::server_error()
        }
    }
}

/// HEAD variant of the pixel endpoint. Answers with the GET headers and
/// never records a pageview, since no image is delivered.
pub async fn head_pixel(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let ctx = RequestContext::from_parts(&uri, &headers, None, state.config.trust_proxy_headers);

    let (selection, image) = match resolve_image(&state, &ctx).await {
        Some(found) => found,
        None => return response::unavailable(),
    };

    match response::image_head_response(&image).await {
        Ok(resp) => resp,
        Err(e) => {
            error!(
                campaign = %selection.campaign,
                image = %image.path.display(),
                error = %e,
                "pixel_head_failed"
            );
            response::server_error()
        }
    }
}

/// Resolve the campaign and pick its image; `None` means nothing can be served.
async fn resolve_image(
    state: &AppState,
    ctx: &RequestContext,
) -> Option<(CampaignSelection, ResolvedImage)> {
    let selection = state.resolver.resolve(&ctx.path, &ctx.params);

    info!(
        path = %ctx.path,
        campaign = %selection.campaign,
        keyword = %selection.keyword,
        "pixel_request_received"
    );

    match state.selector.select(&selection.campaign).await {
        Selection::Found(image) => Some((selection, image)),
        Selection::Unavailable => None,
    }
}

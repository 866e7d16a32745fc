//! Build pageviews from requests and hand them to the tracker.

use tracing::{info, warn};

use super::types::{AttributionInfo, Pageview};
use super::Tracker;
use crate::campaign::CampaignSelection;
use crate::web::RequestContext;

/// Reconstruct the URL the client requested.
pub fn tracked_url(ctx: &RequestContext) -> String {
    let scheme = if ctx.encrypted { "https" } else { "http" };

    match ctx.query.as_deref() {
        Some(query) => format!("{}://{}{}?{}", scheme, ctx.host, ctx.path, query),
        None => format!("{}://{}{}", scheme, ctx.host, ctx.path),
    }
}

/// Assemble the pageview for a resolved campaign.
pub fn build_pageview(selection: &CampaignSelection, ctx: &RequestContext) -> Pageview {
    Pageview {
        client_ip: ctx.remote_ip.map(|ip| ip.to_string()),
        user_agent: ctx.user_agent.clone(),
        url: tracked_url(ctx),
        referrer: ctx.referrer.clone(),
        attribution: AttributionInfo::new(&selection.campaign, &selection.keyword, &ctx.referrer),
        title: format!(
            "Reprint Tracker for: {} (keyword: {})",
            selection.campaign,
            selection.keyword_label()
        ),
    }
}

/// Report one pageview. Failures are logged and swallowed.
///
/// Returns whether the tracker accepted the pageview.
pub async fn report_pageview(
    tracker: &dyn Tracker,
    selection: &CampaignSelection,
    ctx: &RequestContext,
) -> bool {
    let pageview = build_pageview(selection, ctx);

    match tracker.record_pageview(&pageview).await {
        Ok(()) => {
            info!(
                campaign = %selection.campaign,
                keyword = %selection.keyword,
                url = %pageview.url,
                "pageview_tracked"
            );
            true
        }
        Err(e) => {
            warn!(
                campaign = %selection.campaign,
                keyword = %selection.keyword,
                url = %pageview.url,
                error = %e,
                "pageview_tracking_failed"
            );
            false
        }
    }
}

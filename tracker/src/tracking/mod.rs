//! Pageview reporting to the external visit tracker.
//!
//! ```text
//! CampaignSelection + RequestContext → Pageview → Tracker::record_pageview
//! ```
//!
//! Reporting is fire-and-forget for the request pipeline: failures are logged
//! by [`report_pageview`] and never reach the client.

pub mod piwik;
pub mod reporter;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use piwik::PiwikTracker;
pub use reporter::{build_pageview, report_pageview, tracked_url};
pub use types::{AttributionInfo, Pageview};

/// Errors raised while recording a pageview.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid tracker URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("tracking request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("tracker responded with status {0}")]
    Status(u16),
}

/// Port to the visit-tracking service.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Record a single pageview with campaign attribution.
    async fn record_pageview(&self, pageview: &Pageview) -> Result<(), TrackError>;
}

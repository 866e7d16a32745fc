//! Reprint Tracker - tracking pixel server with Piwik campaign attribution.
//!
//! Serves a campaign image for every request and records the visit as a
//! Piwik pageview tagged with the campaign and keyword.
//!
//! ## Architecture
//!
//! ```text
//! Request → CampaignResolver → ImageSelector ─┬─ Unavailable → 503
//!                                             └─ Found → Tracker → image (200)
//! ```

pub mod campaign;
pub mod config;
pub mod store;
pub mod tracking;
pub mod web;

// Re-export commonly used types
pub use campaign::{CampaignResolver, CampaignSelection};
pub use config::Config;
pub use store::{ImageSelector, ResolvedImage, Selection};
pub use tracking::{PiwikTracker, TrackError, Tracker};
pub use web::{router, AppState};

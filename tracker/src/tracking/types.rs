//! Pageview payload types.

use serde::Serialize;

/// Campaign attribution attached to a pageview.
///
/// Serializes as an ordered array `[campaign, keyword, timestamp, referrer]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributionInfo(
    /// Campaign name
    pub String,
    /// Keyword, empty when absent
    pub String,
    /// Referral timestamp; always zero for pixel requests
    pub u64,
    /// Referrer URL
    pub String,
);

impl AttributionInfo {
    pub fn new(campaign: &str, keyword: &str, referrer: &str) -> Self {
        Self(campaign.to_string(), keyword.to_string(), 0, referrer.to_string())
    }

    pub fn campaign(&self) -> &str {
        &self.0
    }

    pub fn keyword(&self) -> &str {
        &self.1
    }

    pub fn timestamp(&self) -> u64 {
        self.2
    }

    pub fn referrer(&self) -> &str {
        &self.3
    }
}

/// Everything needed to record one pageview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageview {
    pub client_ip: Option<String>,
    pub user_agent: String,
    /// Full URL of the pixel request
    pub url: String,
    pub referrer: String,
    pub attribution: AttributionInfo,
    /// Human-readable page title
    pub title: String,
}

//! Piwik HTTP tracking API client.
//!
//! Sends one GET request per pageview to `piwik.php`, carrying the visitor
//! details and campaign attribution as query parameters.
//! Reference: https://developer.matomo.org/api-reference/tracking-api

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use url::Url;

use super::types::Pageview;
use super::{TrackError, Tracker};
use crate::Config;

/// Script name appended to base URLs that do not already point at a script.
const TRACKER_SCRIPT: &str = "piwik.php";

/// Reports pageviews to a Piwik installation.
#[derive(Debug, Clone)]
pub struct PiwikTracker {
    client: Client,
    endpoint: Url,
    idsite: u32,
    token_auth: Option<String>,
    timeout: Duration,
}

impl PiwikTracker {
    pub fn new(client: Client, config: &Config) -> Result<Self, TrackError> {
        Ok(Self {
            client,
            endpoint: tracker_endpoint(&config.piwik_url)?,
            idsite: config.idsite,
            token_auth: config.token_auth.clone(),
            timeout: Duration::from_millis(config.tracker_timeout_ms),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the tracking request URL for a pageview.
    ///
    /// `cache_buster` and `visitor_id` are random per request.
    fn request_url(&self, pageview: &Pageview, cache_buster: u32, visitor_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("idsite", &self.idsite.to_string())
                .append_pair("rec", "1")
                .append_pair("apiv", "1")
                .append_pair("r", &format!("{:06}", cache_buster))
                .append_pair("_id", visitor_id)
                .append_pair("url", &pageview.url)
                .append_pair("urlref", &pageview.referrer)
                .append_pair("action_name", &pageview.title)
                .append_pair("_rcn", pageview.attribution.campaign())
                .append_pair("_rck", pageview.attribution.keyword())
                .append_pair("_refts", &pageview.attribution.timestamp().to_string())
                .append_pair("_ref", pageview.attribution.referrer())
                .append_pair("ua", &pageview.user_agent);

            // Piwik only accepts a visitor IP override from an authenticated caller
            if let Some(token) = &self.token_auth {
                if let Some(ip) = &pageview.client_ip {
                    query.append_pair("cip", ip);
                }
                query.append_pair("token_auth", token);
            }

            query.append_pair("send_image", "0");
        }
        url
    }
}

#[async_trait]
impl Tracker for PiwikTracker {
    async fn record_pageview(&self, pageview: &Pageview) -> Result<(), TrackError> {
        let (cache_buster, visitor_id) = {
            let mut rng = rand::thread_rng();
            let id: [u8; 8] = rng.gen();
            (rng.gen_range(0..1_000_000), hex::encode(id))
        };
        let url = self.request_url(pageview, cache_buster, &visitor_id);

        tracing::debug!(
            endpoint = %self.endpoint,
            timeout_seconds = self.timeout.as_secs_f64(),
            "piwik_request_starting"
        );

        let mut request = self.client.get(url).timeout(self.timeout);
        if !pageview.user_agent.is_empty() {
            request = request.header(reqwest::header::USER_AGENT, pageview.user_agent.as_str());
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_timeout() {
                    tracing::error!(
                        endpoint = %self.endpoint,
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "piwik_request_timeout"
                    );
                } else {
                    tracing::error!(
                        endpoint = %self.endpoint,
                        error = %e,
                        "piwik_request_error"
                    );
                }
                return Err(TrackError::Request(e));
            }
        };

        let status = resp.status().as_u16();
        tracing::debug!(status_code = status, "piwik_request_complete");

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(TrackError::Status(status))
        }
    }
}

/// Resolve the configured URL to the tracking script endpoint.
fn tracker_endpoint(raw: &str) -> Result<Url, TrackError> {
    let mut url = Url::parse(raw)?;
    url.set_query(None);
    url.set_fragment(None);

    if url.path().ends_with(".php") {
        return Ok(url);
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url.join(TRACKER_SCRIPT)?)
}

//! Resolve the campaign and keyword for a pixel request.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

/// Query parameter naming the campaign when the filename does not.
pub const CAMPAIGN_PARAM: &str = "pk_campaign";

/// Query parameter naming the keyword when the filename does not.
pub const KEYWORD_PARAM: &str = "pk_keyword";

/// Campaign and keyword attributed to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSelection {
    pub campaign: String,
    /// Empty when the request carries no keyword.
    pub keyword: String,
}

impl CampaignSelection {
    /// Keyword as shown in human-readable labels.
    pub fn keyword_label(&self) -> &str {
        if self.keyword.is_empty() {
            "none"
        } else {
            &self.keyword
        }
    }
}

/// Extracts `(campaign, keyword)` from `campaign[.keyword].ext` filenames,
/// falling back to `pk_campaign` / `pk_keyword` query parameters.
///
/// The filename pattern is compiled once from the configured extensions.
#[derive(Debug, Clone)]
pub struct CampaignResolver {
    default_campaign: String,
    /// `None` when no extensions are configured; nothing can match then.
    pattern: Option<Regex>,
}

impl CampaignResolver {
    pub fn new(default_campaign: &str, extensions: &[String]) -> Result<Self, regex::Error> {
        let pattern = if extensions.is_empty() {
            None
        } else {
            let alternation = extensions
                .iter()
                .map(|ext| regex::escape(ext))
                .collect::<Vec<_>>()
                .join("|");

            Some(Regex::new(&format!(
                r"^([A-Za-z0-9_-]+)(?:\.([A-Za-z0-9_-]+))?\.(?:{})$",
                alternation
            ))?)
        };

        Ok(Self {
            default_campaign: default_campaign.to_string(),
            pattern,
        })
    }

    /// Resolve the campaign for a request path and its decoded query parameters.
    ///
    /// A matching filename always wins; the query is only consulted when the
    /// last path segment does not match the pattern at all.
    pub fn resolve(&self, path: &str, query: &HashMap<String, String>) -> CampaignSelection {
        let filename = last_segment(path);

        if let Some(selection) = self.match_filename(filename) {
            debug!(
                filename = %filename,
                campaign = %selection.campaign,
                keyword = %selection.keyword,
                "campaign_from_filename"
            );
            return selection;
        }

        let campaign = non_empty(query, CAMPAIGN_PARAM)
            .unwrap_or(self.default_campaign.as_str())
            .to_string();
        let keyword = non_empty(query, KEYWORD_PARAM).unwrap_or_default().to_string();

        debug!(
            filename = %filename,
            campaign = %campaign,
            keyword = %keyword,
            "campaign_from_query"
        );

        CampaignSelection { campaign, keyword }
    }

    fn match_filename(&self, filename: &str) -> Option<CampaignSelection> {
        let captures = self.pattern.as_ref()?.captures(filename)?;

        let campaign = captures.get(1)?.as_str().to_string();
        let keyword = captures
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Some(CampaignSelection { campaign, keyword })
    }
}

/// Whether `name` only uses the characters allowed in campaign filenames.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn non_empty<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

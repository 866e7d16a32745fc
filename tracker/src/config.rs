//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup and shared read-only afterwards.

use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Piwik installation (or the full `piwik.php` endpoint)
    pub piwik_url: String,

    /// Piwik site identifier
    pub idsite: u32,

    /// Piwik auth token, required for overriding the visitor IP
    pub token_auth: Option<String>,

    /// Campaign used when the request does not name one
    pub default_campaign: String,

    /// Recognized image extensions, in lookup order
    pub image_extensions: Vec<String>,

    /// Directory holding `<campaign>.<ext>` and `default.<ext>` images
    pub image_dir: PathBuf,

    /// Port for the web server to listen on
    pub port: u16,

    /// Timeout for the tracking request in milliseconds
    pub tracker_timeout_ms: u64,

    /// Honour X-Forwarded-For / X-Forwarded-Proto / X-Forwarded-Host
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            piwik_url: "http://localhost/piwik/".to_string(),
            idsite: 1,
            token_auth: None,
            default_campaign: "default".to_string(),
            image_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            image_dir: PathBuf::from("images"),
            port: 8080,
            tracker_timeout_ms: 5000,
            trust_proxy_headers: false,
        }
    }
}

const DEFAULT_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg"];

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            piwik_url: env::var("PIWIK_URL").unwrap_or(defaults.piwik_url),

            idsite: env::var("PIWIK_IDSITE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.idsite),

            token_auth: env::var("PIWIK_TOKEN_AUTH")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            default_campaign: env::var("DEFAULT_CAMPAIGN")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_campaign),

            image_extensions: parse_extensions("IMAGE_EXTENSIONS")
                .unwrap_or(defaults.image_extensions),

            image_dir: env::var("IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.image_dir),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),

            tracker_timeout_ms: env::var("TRACKER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tracker_timeout_ms),

            trust_proxy_headers: parse_bool("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers),
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

/// Parse the extension list, dropping leading dots and duplicates while keeping order.
fn parse_extensions(name: &str) -> Option<Vec<String>> {
    let raw = parse_csv(name)?;

    let mut extensions: Vec<String> = Vec::with_capacity(raw.len());
    for ext in raw {
        let ext = ext.trim_start_matches('.').to_string();
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }

    if extensions.is_empty() {
        warn!(env_var = name, "Empty extension list, using default");
        return None;
    }

    Some(extensions)
}

/// Parse a boolean flag such as "1", "true" or "yes".
fn parse_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" | "" => false,
            _ => {
                warn!(env_var = name, value = %v, "Invalid boolean, using default");
                default
            }
        },
        Err(_) => default,
    }
}

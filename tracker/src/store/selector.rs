//! Pick the image file to serve for a campaign.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::mime::{sniff_content_type, SNIFF_LEN};
use crate::campaign::resolver::is_valid_name;

/// Base name of the fallback image.
pub const DEFAULT_IMAGE: &str = "default";

/// An image that existed and was readable when it was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub path: PathBuf,
    pub content_type: &'static str,
}

/// Outcome of an image lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Found(ResolvedImage),
    /// Neither a campaign image nor a default image exists.
    Unavailable,
}

/// Looks up `<campaign>.<ext>`, then `default.<ext>`, in extension order.
#[derive(Debug, Clone)]
pub struct ImageSelector {
    image_dir: PathBuf,
    extensions: Vec<String>,
}

impl ImageSelector {
    pub fn new(image_dir: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            image_dir: image_dir.into(),
            extensions,
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Select the image for `campaign`.
    ///
    /// The first readable match in configured extension order wins. Campaign
    /// names outside `[A-Za-z0-9_-]` never reach the filesystem; they go
    /// straight to the default image.
    pub async fn select(&self, campaign: &str) -> Selection {
        if is_valid_name(campaign) {
            if let Some(image) = self.first_readable(campaign).await {
                return Selection::Found(image);
            }
        } else {
            warn!(campaign = %campaign, "campaign_name_rejected_for_lookup");
        }

        if let Some(image) = self.first_readable(DEFAULT_IMAGE).await {
            info!(
                campaign = %campaign,
                path = %image.path.display(),
                "campaign_image_fallback_default"
            );
            return Selection::Found(image);
        }

        warn!(
            campaign = %campaign,
            image_dir = %self.image_dir.display(),
            extensions = ?self.extensions,
            "campaign_image_unavailable"
        );
        Selection::Unavailable
    }

    async fn first_readable(&self, name: &str) -> Option<ResolvedImage> {
        for ext in &self.extensions {
            let path = self.image_dir.join(format!("{}.{}", name, ext));
            if let Some(image) = probe(&path).await {
                return Some(image);
            }
        }
        None
    }
}

/// Open `path`, confirm it is a regular file and detect its content type.
async fn probe(path: &Path) -> Option<ResolvedImage> {
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "image_probe_miss");
            return None;
        }
    };

    match file.metadata().await {
        Ok(meta) if meta.is_file() => {}
        _ => {
            debug!(path = %path.display(), "image_probe_not_a_file");
            return None;
        }
    }

    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    if let Err(e) = file.take(SNIFF_LEN as u64).read_to_end(&mut prefix).await {
        warn!(path = %path.display(), error = %e, "image_probe_unreadable");
        return None;
    }

    Some(ResolvedImage {
        path: path.to_path_buf(),
        content_type: sniff_content_type(&prefix, path),
    })
}

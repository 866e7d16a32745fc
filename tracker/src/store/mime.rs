//! Content type detection from file contents.
//!
//! The type is taken from the leading bytes of the file, not its name. The
//! extension is only consulted when the contents are not recognised.

use std::path::Path;

/// Number of leading bytes read for detection.
pub const SNIFF_LEN: usize = 512;

const OCTET_STREAM: &str = "application/octet-stream";

/// Detect the MIME type of an image from its first bytes.
pub fn sniff_content_type(prefix: &[u8], path: &Path) -> &'static str {
    if let Ok(format) = ::image::guess_format(prefix) {
        return format.to_mime_type();
    }

    if looks_like_svg(prefix) {
        return "image/svg+xml";
    }

    content_type_for_extension(path.extension().and_then(|e| e.to_str()))
}

fn looks_like_svg(prefix: &[u8]) -> bool {
    let text = String::from_utf8_lossy(prefix);
    let text = text.trim_start_matches('\u{feff}').trim_start();

    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn content_type_for_extension(extension: Option<&str>) -> &'static str {
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => OCTET_STREAM,
    }
}

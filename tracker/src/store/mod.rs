//! Image store lookup and content type detection.

pub mod mime;
pub mod selector;

pub use mime::sniff_content_type;
pub use selector::{ImageSelector, ResolvedImage, Selection, DEFAULT_IMAGE};

//! Locator encodings
//!
//! A locator string is one of:
//! - `blob:<id>`, a reference into the in-memory [`BlobStore`](super::BlobStore)
//! - an absolute path (`/…` or a platform absolute path)
//! - `data:<media type>;base64,<payload>`
//! - a path relative to the project root; it must contain a `.`

use std::path::Path;

/// Media type of base64 GLB payloads
pub const GLB_MEDIA_TYPE: &str = "model/gltf-binary";
/// Media type of base64 zip payloads
pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// A parsed locator borrowing from its string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    /// In-memory blob reference, the full `blob:` URL
    Blob(&'a str),
    /// Absolute file path
    AbsolutePath(&'a str),
    /// Embedded base64 payload
    Data {
        /// Media type before `;base64`
        media_type: &'a str,
        /// Base64 text after the comma
        payload: &'a str,
    },
    /// Path relative to the project root
    RelativePath(&'a str),
}

impl<'a> Locator<'a> {
    /// Classify a locator; `None` if it matches no supported encoding
    pub fn parse(locator: &'a str) -> Option<Self> {
        if locator.starts_with("blob:") {
            return Some(Locator::Blob(locator));
        }
        if locator.starts_with('/') || Path::new(locator).is_absolute() {
            return Some(Locator::AbsolutePath(locator));
        }
        if let Some(rest) = locator.strip_prefix("data:") {
            let (header, payload) = rest.split_once(',')?;
            let media_type = header.strip_suffix(";base64")?;
            return Some(Locator::Data { media_type, payload });
        }
        if locator.contains('.') {
            return Some(Locator::RelativePath(locator));
        }
        None
    }

    /// Whether the bytes behind this locator are a zip archive wrapping a model
    pub fn is_zipped(&self) -> bool {
        match self {
            Locator::Data { media_type, .. } => *media_type == ZIP_MEDIA_TYPE,
            Locator::AbsolutePath(path) | Locator::RelativePath(path) => {
                path.to_ascii_lowercase().contains(".glb.zip")
            }
            Locator::Blob(_) => false,
        }
    }
}

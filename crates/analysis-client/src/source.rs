//! The image (or video) the next request operates on.
//!
//! Exactly one [`SourceRef`] is current per session. Replacing it is a single
//! assignment of a new value, so a source is never half file and half URL.

use crate::error::{ClientError, Result};
use base64::Engine;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Owned binary payload with the metadata a multipart upload needs.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub file_name: String,
}

impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            file_name: file_name.into(),
        }
    }

    /// Read a local file, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(bytes, guess_mime(path), file_name))
    }

    /// Natural (encoded) resolution, if the payload is a decodable image.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }

    /// Inline `data:` URI for embedding in rendered output.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

fn guess_mime(path: &Path) -> String {
    if let Ok(format) = image::ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    None,
    File,
    Url,
}

/// What the next request should operate on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceRef {
    #[default]
    None,
    File(ImageBlob),
    Url(String),
}

impl SourceRef {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::None => SourceKind::None,
            Self::File(_) => SourceKind::File,
            Self::Url(_) => SourceKind::Url,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Builds a source from user input, preferring a file over a URL.
    /// A blank URL counts as absent.
    pub fn from_input(file: Option<ImageBlob>, url: Option<&str>) -> Self {
        match (file, url.map(str::trim).filter(|u| !u.is_empty())) {
            (Some(blob), _) => Self::File(blob),
            (None, Some(url)) => Self::Url(url.to_string()),
            (None, None) => Self::None,
        }
    }
}

/// Decode a base64 image returned by the service into an owned PNG blob.
///
/// Accepts a bare payload or a full `data:image/...;base64,` URI.
pub fn decode_image_payload(encoded: &str, file_name: &str) -> Result<ImageBlob> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ClientError::Payload("empty image payload".to_string()));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ClientError::Payload(e.to_string()))?;
    debug!("decoded {} byte image payload as {}", bytes.len(), file_name);
    Ok(ImageBlob::new(bytes, "image/png", file_name))
}

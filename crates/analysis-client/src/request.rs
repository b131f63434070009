//! Multipart request construction.
//!
//! Building a payload is pure: the same source and fields always produce the
//! same [`FormPayload`]. Conversion to a `reqwest` form happens at send time.

use crate::error::{ClientError, Result};
use crate::source::{ImageBlob, SourceRef};

/// Form field name carrying an uploaded file.
pub const FILE_FIELD: &str = "file";
/// Form field name carrying an image URL.
pub const IMAGE_URL_FIELD: &str = "image_url";
/// Form field name carrying a video URL.
pub const YOUTUBE_URL_FIELD: &str = "youtube_url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, blob: ImageBlob },
}

impl FormField {
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// An outgoing multipart body, kept inspectable until it is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<FormField>,
}

impl FormPayload {
    /// Encodes the source as `file` or `image_url`, followed by `extra`.
    pub fn build(source: &SourceRef, extra: &[(&str, String)]) -> Result<Self> {
        let mut payload = Self::with_source(source, IMAGE_URL_FIELD)?;
        for (name, value) in extra {
            payload = payload.with(*name, value.clone());
        }
        Ok(payload)
    }

    /// Encodes a video source as `file` or `youtube_url`.
    pub fn for_video(source: &SourceRef) -> Result<Self> {
        Self::with_source(source, YOUTUBE_URL_FIELD).map_err(|e| match e {
            ClientError::NoSource => ClientError::NoVideo,
            other => other,
        })
    }

    fn with_source(source: &SourceRef, url_field: &str) -> Result<Self> {
        let field = match source {
            SourceRef::None => return Err(ClientError::NoSource),
            SourceRef::File(blob) => FormField::File {
                name: FILE_FIELD.to_string(),
                blob: blob.clone(),
            },
            SourceRef::Url(url) => FormField::Text {
                name: url_field.to_string(),
                value: url.clone(),
            },
        };
        Ok(Self {
            fields: vec![field],
        })
    }

    /// Append a text field
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(FormField::Text {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Value of the first text field with this name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// The uploaded file, if any.
    pub fn file(&self) -> Option<&ImageBlob> {
        self.fields.iter().find_map(|f| match f {
            FormField::File { blob, .. } => Some(blob),
            _ => None,
        })
    }

    pub fn into_multipart(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for field in self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File { name, blob } => {
                    let part = reqwest::multipart::Part::bytes(blob.bytes)
                        .file_name(blob.file_name)
                        .mime_str(&blob.mime)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

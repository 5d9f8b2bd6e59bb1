//! Chooses the content payload for a document according to the upload format.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::str::FromStr;

use crate::document::{Document, FIELD_RAW_CONTENT, FIELD_TEXT_CONTENT};
use crate::error::IndexWriterError;
use crate::item::{ContentFormat, ContentPayload};

/// Which document field supplies the content, and how it is declared to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadFormat {
    /// Base64 `binaryContent` field, submitted as raw bytes.
    #[default]
    Raw,
    /// Extracted `content` field, submitted as UTF-8 text.
    Text,
}

impl UploadFormat {
    pub fn content_format(&self) -> ContentFormat {
        match self {
            UploadFormat::Raw => ContentFormat::Raw,
            UploadFormat::Text => ContentFormat::Text,
        }
    }
}

impl FromStr for UploadFormat {
    type Err = IndexWriterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RAW" => Ok(UploadFormat::Raw),
            "TEXT" => Ok(UploadFormat::Text),
            _ => Err(IndexWriterError::InvalidUploadFormat(s.to_string())),
        }
    }
}

impl fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadFormat::Raw => f.write_str("RAW"),
            UploadFormat::Text => f.write_str("TEXT"),
        }
    }
}

/// Extract the payload for `doc`.
///
/// The content type is checked first so that a document missing it fails the
/// same way regardless of the upload format.
pub fn select_content(
    doc: &Document,
    format: UploadFormat,
) -> Result<ContentPayload, IndexWriterError> {
    let content_type = doc
        .content_type()
        .ok_or(IndexWriterError::ContentTypeMissing)?;

    match format {
        UploadFormat::Raw => {
            let encoded = doc
                .first(FIELD_RAW_CONTENT)
                .ok_or(IndexWriterError::ContentDecode(None))?;
            let bytes = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| IndexWriterError::ContentDecode(Some(e)))?;
            Ok(ContentPayload::new(content_type, bytes))
        }
        UploadFormat::Text => {
            let text = doc
                .first(FIELD_TEXT_CONTENT)
                .ok_or(IndexWriterError::ContentMissing)?;
            Ok(ContentPayload::new(content_type, text.as_bytes().to_vec()))
        }
    }
}

//! Supporting document payloads
//!
//! The classifier takes documents as data URIs
//! (`data:<mimetype>;base64,<encoded_data>`), so that is the one encoding
//! this module cares about.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Why a data URI could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("not a data URI")]
    NotADataUri,

    #[error("data URI is missing a media type")]
    MissingMediaType,

    #[error("data URI is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// An uploaded supporting document
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl DocumentPayload {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Decodes a `data:` URI, giving the document the supplied file name
    pub fn from_data_uri(file_name: impl Into<String>, uri: &str) -> Result<Self, DocumentError> {
        let rest = uri.strip_prefix("data:").ok_or(DocumentError::NotADataUri)?;
        let (header, data) = rest.split_once(',').ok_or(DocumentError::NotADataUri)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(DocumentError::NotBase64)?;
        if media_type.is_empty() {
            return Err(DocumentError::MissingMediaType);
        }

        let bytes = STANDARD
            .decode(data)
            .map_err(|e| DocumentError::InvalidBase64(e.to_string()))?;

        Ok(Self::new(file_name, media_type, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// An empty upload does not count as a document
    pub fn is_present(&self) -> bool {
        !self.bytes.is_empty()
    }

    /// `data:<media type>;base64,<bytes>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

// Bytes are left out so logs never carry document contents
impl fmt::Debug for DocumentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentPayload")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_format() {
        let doc = DocumentPayload::new("bill.png", "image/png", b"abc".to_vec());
        assert_eq!(doc.to_data_uri(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_decode_data_uri() {
        let doc = DocumentPayload::from_data_uri("r.jpg", "data:image/jpeg;base64,YWJj").unwrap();
        assert_eq!(doc.media_type(), "image/jpeg");
        assert_eq!(doc.bytes(), b"abc");
    }

    #[test]
    fn test_decode_rejects_plain_text_uri() {
        let err = DocumentPayload::from_data_uri("r.txt", "data:text/plain,hello").unwrap_err();
        assert_eq!(err, DocumentError::NotBase64);
        assert_eq!(
            DocumentPayload::from_data_uri("r", "https://example.com/a.png").unwrap_err(),
            DocumentError::NotADataUri
        );
        assert_eq!(
            DocumentPayload::from_data_uri("r", "data:;base64,YWJj").unwrap_err(),
            DocumentError::MissingMediaType
        );
    }

    #[test]
    fn test_empty_payload_is_not_present() {
        let doc = DocumentPayload::new("empty.png", "image/png", Vec::new());
        assert!(!doc.is_present());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let doc = DocumentPayload::new("bill.png", "image/png", vec![1, 2, 3]);
        let debug = format!("{doc:?}");
        assert!(debug.contains("size: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }
}

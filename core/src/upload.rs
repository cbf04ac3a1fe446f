//! Uploaded file parts.

use crate::pipeline::Many;
use bytes::Bytes;
use std::fmt;

/// One file field of a multipart request.
///
/// The body is not buffered: [`FilePart::into_content`] hands out the
/// chunk stream, which can be consumed once. Each chunk is owned by
/// whoever holds it and is released when dropped.
pub struct FilePart {
    name: String,
    filename: String,
    content_type: Option<String>,
    headers: Vec<(String, String)>,
    content: Many<Bytes>,
}

impl FilePart {
    /// A part for field `name` carrying the client-supplied `filename`.
    #[must_use]
    pub fn new(name: impl Into<String>, filename: impl Into<String>, content: Many<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            content_type: None,
            headers: Vec::new(),
            content,
        }
    }

    /// Set the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Record a raw part header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Form field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename as sent by the client. Not sanitized.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw part headers in arrival order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Take the body as a stream of chunks.
    pub fn into_content(self) -> Many<Bytes> {
        self.content
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

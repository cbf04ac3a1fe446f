//! Streaming `multipart/form-data` extraction.
//!
//! [`MultipartForm`] reads parts in the order the client sent them. A
//! file part is handed over as a [`FilePart`] whose body is still on the
//! wire; it must be consumed or dropped before the next part can be read.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
};
use everydoc_core::error::DomainError;
use everydoc_core::pipeline::{Many, Single};
use everydoc_core::upload::FilePart;
use futures::TryStreamExt;

/// One part of a multipart form.
#[derive(Debug)]
pub enum FormPart {
    /// A part that carried a filename.
    File(FilePart),
    /// A plain form field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
}

/// The parts of a `multipart/form-data` request body, read lazily.
///
/// # Example
///
/// ```ignore
/// async fn upload(form: MultipartForm) -> Result<String, AppError> {
///     reply::text(form.file("file").and_then(|part| uploads.save_file(part))).await
/// }
/// ```
pub struct MultipartForm {
    inner: multer::Multipart<'static>,
}

impl std::fmt::Debug for MultipartForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MultipartForm(<body>)")
    }
}

fn malformed(err: multer::Error) -> DomainError {
    DomainError::validation(format!("malformed multipart body: {err}"))
}

impl MultipartForm {
    /// Read the next part.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the body is not valid multipart, or
    /// if the previous file part is still being read.
    pub async fn next_part(&mut self) -> Result<Option<FormPart>, DomainError> {
        let Some(field) = self.inner.next_field().await.map_err(malformed)? else {
            return Ok(None);
        };
        let name = field.name().unwrap_or_default().to_owned();

        let Some(filename) = field.file_name().map(ToOwned::to_owned) else {
            let value = field.text().await.map_err(malformed)?;
            return Ok(Some(FormPart::Text { name, value }));
        };

        let content_type = field.content_type().map(ToString::to_string);
        let headers: Vec<(String, String)> = field
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_owned(), value.to_owned()))
            })
            .collect();

        let mut part = FilePart::new(name, filename, Many::from_stream(field.map_err(malformed)));
        if let Some(content_type) = content_type {
            part = part.with_content_type(content_type);
        }
        for (key, value) in headers {
            part = part.with_header(key, value);
        }
        Ok(Some(FormPart::File(part)))
    }

    /// The first file part named `name`. Parts before it are skipped.
    ///
    /// Fails with `Validation` if the form has no such part.
    pub fn file(mut self, name: &str) -> Single<FilePart> {
        let wanted = name.to_owned();
        Single::from_future(async move {
            while let Some(part) = self.next_part().await? {
                if let FormPart::File(file) = part {
                    if file.name() == wanted {
                        return Ok(file);
                    }
                }
            }
            Err(DomainError::validation(format!("missing file part: {wanted}")))
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let boundary = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|content_type| multer::parse_boundary(content_type).ok())
            .ok_or_else(|| AppError::validation("expected a multipart/form-data request"))?;

        let body = req.into_body().into_data_stream();
        Ok(Self {
            inner: multer::Multipart::new(body, boundary),
        })
    }
}

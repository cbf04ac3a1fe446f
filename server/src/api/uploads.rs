//! File upload endpoints (`multipart/form-data`, file part `file`).
//!
//! - GET|POST /test/step17/info             - Filename and content type
//! - GET|POST /test/step17/read             - Size and first characters
//! - GET|POST /test/step17/upload           - Store the file
//! - GET|POST /test/step17/upload-with-meta - Store the file, echo the `description` part
//! - GET|POST /test/step17/upload-dbu       - Store as `dbu_<filename>` without truncating

use crate::server::state::AppState;
use crate::services::uploads::describe;
use axum::extract::State;
use everydoc_core::error::DomainError;
use everydoc_core::pipeline::Single;
use everydoc_web::{FormPart, MultipartForm, WebResult, reply};
use std::sync::Arc;

/// Name of the file part every endpoint reads.
pub const FILE_PART: &str = "file";

/// Name of the text part read by `upload-with-meta`.
pub const DESCRIPTION_PART: &str = "description";

/// Describe the uploaded file without reading it.
///
/// # Errors
///
/// `VALIDATION_ERROR` when the request has no `file` part.
pub async fn file_info(State(state): State<AppState>, form: MultipartForm) -> WebResult<String> {
    let uploads = Arc::clone(&state.uploads);
    reply::text(form.file(FILE_PART).and_then(move |part| uploads.info(part))).await
}

/// Read the uploaded file into memory and summarize it.
///
/// # Errors
///
/// `VALIDATION_ERROR` when the request has no `file` part.
pub async fn read_file(State(state): State<AppState>, form: MultipartForm) -> WebResult<String> {
    let uploads = Arc::clone(&state.uploads);
    reply::text(form.file(FILE_PART).and_then(move |part| uploads.read_content(part))).await
}

/// Store the uploaded file.
///
/// # Errors
///
/// `VALIDATION_ERROR` without a usable `file` part, `INTERNAL_ERROR` when
/// writing fails.
pub async fn upload_file(State(state): State<AppState>, form: MultipartForm) -> WebResult<String> {
    let uploads = Arc::clone(&state.uploads);
    reply::text(form.file(FILE_PART).and_then(move |part| uploads.save_file(part))).await
}

/// Store the uploaded file under the `dbu_` prefix.
///
/// # Errors
///
/// See [`upload_file`].
pub async fn upload_with_open_options(
    State(state): State<AppState>,
    form: MultipartForm,
) -> WebResult<String> {
    let uploads = Arc::clone(&state.uploads);
    reply::text(
        form.file(FILE_PART)
            .and_then(move |part| uploads.save_with_open_options(part)),
    )
    .await
}

/// Store the uploaded file and echo the `description` part.
///
/// The parts may come in either order. A file that arrives before its
/// description is stored first.
///
/// # Errors
///
/// `VALIDATION_ERROR` when either part is missing.
pub async fn upload_with_meta(
    State(state): State<AppState>,
    mut form: MultipartForm,
) -> WebResult<String> {
    let uploads = Arc::clone(&state.uploads);

    let pipeline = Single::from_future(async move {
        let mut description: Option<String> = None;
        let mut saved: Option<String> = None;

        while let Some(part) = form.next_part().await? {
            match part {
                FormPart::Text { name, value } if name == DESCRIPTION_PART => {
                    description = Some(value);
                }
                FormPart::File(file) if file.name() == FILE_PART && saved.is_none() => {
                    if let Some(description) = description.take() {
                        return uploads
                            .upload_with_meta(file, description)
                            .await?
                            .ok_or_else(|| missing("file", FILE_PART));
                    }
                    saved = uploads.save_file(file).await?;
                }
                _ => {}
            }
        }

        let saved = saved.ok_or_else(|| missing("file", FILE_PART))?;
        let description = description.ok_or_else(|| missing("text", DESCRIPTION_PART))?;
        Ok(describe(&description, &saved))
    });

    reply::text(pipeline).await
}

fn missing(kind: &str, name: &str) -> DomainError {
    DomainError::validation(format!("missing {kind} part: {name}"))
}

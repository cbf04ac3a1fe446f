//! Handling of uploaded file parts.
//!
//! Files are streamed chunk by chunk into the upload directory. A chunk is
//! released as soon as it has been written; nothing but
//! [`UploadService::read_content`] holds a whole file in memory.
//!
//! Destinations are named after the last path component of the client's
//! filename. An existing file with the same name is overwritten.
//!
//! Bodies are written to a hidden `.part` file next to the destination and
//! renamed into place once the last chunk is flushed. A failed or cancelled
//! upload removes its `.part` file and leaves the destination untouched.

use bytes::{Bytes, BytesMut};
use everydoc_core::error::{DomainError, DomainResult};
use everydoc_core::pipeline::{Many, Single};
use everydoc_core::upload::FilePart;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Number of characters of a file shown by [`UploadService::read_content`].
pub const PREVIEW_CHARS: usize = 100;

/// Prefix of files written by [`UploadService::save_with_open_options`].
pub const OPEN_OPTIONS_PREFIX: &str = "dbu_";

/// Stores and inspects uploaded parts.
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    /// Store uploads under `dir`, created on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Upload directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename and content type of `part`. The body is not read.
    pub fn info(&self, part: FilePart) -> Single<String> {
        let content_type = part.content_type().unwrap_or("unknown").to_owned();
        Single::just(format!(
            "파일명: {}\nContent-Type: {content_type}",
            part.filename()
        ))
    }

    /// Read the whole body and summarize it: its size and the first
    /// [`PREVIEW_CHARS`] characters.
    ///
    /// The body is buffered in full.
    pub fn read_content(&self, part: FilePart) -> Single<String> {
        part.into_content()
            .reduce(BytesMut::new(), |mut buffer, chunk| {
                buffer.extend_from_slice(&chunk);
                buffer
            })
            .map(|buffer| {
                let preview: String = String::from_utf8_lossy(&buffer)
                    .chars()
                    .take(PREVIEW_CHARS)
                    .collect();
                format!("파일 내용 ({} bytes): {preview}", buffer.len())
            })
    }

    /// Stream the body to `<dir>/<filename>`, replacing any existing file,
    /// and emit the absolute path.
    pub fn save_file(&self, part: FilePart) -> Single<String> {
        self.store(part, "", true)
            .map(|path| format!("저장 완료: {}", path.display()))
    }

    /// Stream the body to `<dir>/dbu_<filename>` opened with create and
    /// write but without truncation.
    pub fn save_with_open_options(&self, part: FilePart) -> Single<String> {
        self.store(part, OPEN_OPTIONS_PREFIX, false)
            .map(|path| format!("create+write 저장 완료: {}", path.display()))
    }

    /// [`UploadService::save_file`], then prefix the result with `description`.
    pub fn upload_with_meta(&self, part: FilePart, description: String) -> Single<String> {
        self.save_file(part)
            .map(move |saved| describe(&description, &saved))
    }

    fn store(&self, part: FilePart, prefix: &'static str, truncate: bool) -> Single<PathBuf> {
        let dir = self.dir.clone();
        Single::defer(move || {
            let Some(filename) = final_component(part.filename()) else {
                return Single::error(DomainError::validation(format!(
                    "unusable filename: {:?}",
                    part.filename()
                )));
            };
            let dest = dir.join(format!("{prefix}{filename}"));
            Single::from_future(write_part(dir, dest, part.into_content(), truncate))
        })
    }
}

/// Two-line acknowledgement of an upload with a description.
#[must_use]
pub fn describe(description: &str, saved: &str) -> String {
    format!("설명: {description}\n{saved}")
}

/// Last component of a client-supplied path, if it names a file.
fn final_component(filename: &str) -> Option<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.trim().is_empty() && *name != "." && *name != "..")
}

fn io_failure(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> DomainError {
    let path = path.display().to_string();
    move |err| {
        tracing::error!(operation, path = %path, error = %err, "upload I/O failed");
        DomainError::internal(err)
    }
}

async fn write_part(
    dir: PathBuf,
    dest: PathBuf,
    content: Many<Bytes>,
    truncate: bool,
) -> DomainResult<PathBuf> {
    fs::create_dir_all(&dir)
        .await
        .map_err(io_failure("create upload directory", &dir))?;

    let staging = PartialFile::new(staging_path(&dir, &dest));
    if !truncate {
        seed_from_existing(&dest, staging.path()).await?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(staging.path())
        .await
        .map_err(io_failure("open staging file", staging.path()))?;

    let written = match copy_chunks(file, content, staging.path()).await {
        Ok(written) => written,
        Err(err) => {
            staging.discard().await;
            return Err(err);
        }
    };
    if let Err(err) = fs::rename(staging.path(), &dest).await {
        let err = io_failure("move into place", &dest)(err);
        staging.discard().await;
        return Err(err);
    }
    staging.keep();

    let path = fs::canonicalize(&dest).await.unwrap_or(dest);
    tracing::info!(path = %path.display(), bytes = written, "Upload stored");
    Ok(path)
}

/// Hidden sibling of `dest` that receives the body while it streams in.
fn staging_path(dir: &Path, dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!(".{name}.{}.part", Uuid::new_v4()))
}

/// Start the staging file from the current destination so chunks overwrite
/// its leading bytes instead of replacing it.
async fn seed_from_existing(dest: &Path, staging: &Path) -> DomainResult<()> {
    match fs::copy(dest, staging).await {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_failure("copy existing destination", dest)(err)),
    }
}

/// Write every chunk to `file`, closing it before returning.
async fn copy_chunks(mut file: File, mut content: Many<Bytes>, dest: &Path) -> DomainResult<u64> {
    let mut written: u64 = 0;
    while let Some(chunk) = content.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(io_failure("write chunk", dest))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_failure("flush", dest))?;
    Ok(written)
}

/// A staging file that is removed unless it was moved into place.
///
/// Failures remove it inline with [`PartialFile::discard`]. When the upload
/// is cancelled the file is removed on the blocking pool from `Drop`.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    const fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) {
        self.armed = false;
    }

    async fn discard(mut self) {
        self.armed = false;
        match fs::remove_file(&self.path).await {
            Ok(()) => tracing::warn!(path = %self.path.display(), "Removed partial upload"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "Failed to remove partial upload");
            }
        }
    }
}

fn remove_abandoned(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::warn!(path = %path.display(), "Removed abandoned upload"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "Failed to remove abandoned upload");
        }
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_abandoned(&path));
            }
            Err(_) => remove_abandoned(&path),
        }
    }
}

//! Hand-built upload parts for exercising upload code without HTTP.

use bytes::Bytes;
use everydoc_core::error::DomainError;
use everydoc_core::pipeline::Many;
use everydoc_core::upload::FilePart;

/// A `text/plain` part whose body arrives as `chunks`, in order.
///
/// # Example
///
/// ```
/// use everydoc_testing::file_parts::text_part;
///
/// let part = text_part("file", "notes.txt", ["hello ", "world"]);
/// assert_eq!(part.filename(), "notes.txt");
/// ```
#[must_use]
pub fn text_part<I, C>(name: &str, filename: &str, chunks: I) -> FilePart
where
    I: IntoIterator<Item = C>,
    C: Into<Bytes>,
{
    let chunks: Vec<Bytes> = chunks.into_iter().map(Into::into).collect();
    FilePart::new(name, filename, Many::from_iterable(chunks))
        .with_content_type("text/plain")
        .with_header("content-disposition", disposition(name, filename))
        .with_header("content-type", "text/plain")
}

/// A part that delivers `chunks` and then fails, like a dropped connection.
#[must_use]
pub fn failing_part<I, C>(name: &str, filename: &str, chunks: I) -> FilePart
where
    I: IntoIterator<Item = C>,
    C: Into<Bytes>,
{
    let items: Vec<Result<Bytes, DomainError>> = chunks
        .into_iter()
        .map(|chunk| Ok(chunk.into()))
        .chain(std::iter::once(Err(DomainError::internal(anyhow::anyhow!(
            "connection reset by peer"
        )))))
        .collect();
    FilePart::new(name, filename, Many::from_stream(futures::stream::iter(items)))
        .with_content_type("application/octet-stream")
}

/// A part that delivers `chunks` and then never finishes.
#[must_use]
pub fn stalled_part<I, C>(name: &str, filename: &str, chunks: I) -> FilePart
where
    I: IntoIterator<Item = C>,
    C: Into<Bytes>,
{
    use futures::StreamExt;

    let chunks: Vec<Result<Bytes, DomainError>> =
        chunks.into_iter().map(|chunk| Ok(chunk.into())).collect();
    let body = futures::stream::iter(chunks).chain(futures::stream::pending());
    FilePart::new(name, filename, Many::from_stream(body))
        .with_content_type("application/octet-stream")
}

fn disposition(name: &str, filename: &str) -> String {
    format!("form-data; name=\"{name}\"; filename=\"{filename}\"")
}

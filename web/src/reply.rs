//! Turning pipelines into responses.
//!
//! Handlers build a pipeline and hand it to one of these functions, which
//! subscribe to it exactly once. A failure anywhere in the pipeline is
//! rendered by [`AppError`], so the envelope and the log line are the same
//! for every endpoint.

use crate::error::AppError;
use crate::extractors::StreamFormat;
use axum::{
    Json,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use everydoc_core::pipeline::{Many, Signal, Single};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;

/// Resolve `single` into its value, treating empty completion as 404.
///
/// # Errors
///
/// Returns the pipeline's error, or a `NOT_FOUND` error when it completed
/// without a value.
pub async fn value<T>(single: Single<T>) -> Result<T, AppError>
where
    T: Send + 'static,
{
    single.await?.ok_or_else(|| AppError::not_found(""))
}

/// Respond with the value of `single` as JSON.
///
/// # Errors
///
/// See [`value`].
pub async fn json<T>(single: Single<T>) -> Result<Json<T>, AppError>
where
    T: Serialize + Send + 'static,
{
    value(single).await.map(Json)
}

/// Respond with the string emitted by `single` as `text/plain`.
///
/// # Errors
///
/// See [`value`].
pub async fn text(single: Single<String>) -> Result<String, AppError> {
    value(single).await
}

/// Respond with every element of `many`, encoded per `format`.
///
/// As a JSON array the whole sequence is gathered first, so a failure
/// produces a plain error envelope. As server-sent events elements are
/// written as they arrive, and a failure becomes a final `error` event
/// carrying the envelope.
pub async fn many<T>(format: StreamFormat, many: Many<T>) -> Response
where
    T: Serialize + Send + 'static,
{
    match format {
        StreamFormat::JsonArray => match many.collect_list().await {
            Ok(items) => Json(items.unwrap_or_default()).into_response(),
            Err(err) => AppError::from(err).into_response(),
        },
        StreamFormat::EventStream => Sse::new(events(many))
            .keep_alive(KeepAlive::default())
            .into_response(),
    }
}

fn error_event(err: AppError) -> Event {
    err.report();
    Event::default()
        .event("error")
        .json_data(err.body())
        .unwrap_or_else(|_| Event::default().event("error").data(err.message()))
}

fn events<T>(many: Many<T>) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Serialize + Send + 'static,
{
    let mut signals = many.materialize();
    async_stream::stream! {
        while let Some(signal) = signals.next().await {
            match signal {
                Signal::Next(value) => match Event::default().json_data(&value) {
                    Ok(event) => {
                        yield Ok(event);
                    }
                    Err(err) => {
                        yield Ok(error_event(AppError::internal(err)));
                        break;
                    }
                },
                Signal::Error(err) => {
                    yield Ok(error_event(err.into()));
                }
                Signal::Complete => {}
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::{StatusCode, header};
    use everydoc_core::error::DomainError;

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_single_is_not_found() {
        let err = value(Single::<i32>::empty()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "resource not found");
    }

    #[tokio::test]
    async fn test_json_array() {
        let response = many(StreamFormat::JsonArray, Many::range(1, 5)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "[1,2,3,4,5]");
    }

    #[tokio::test]
    async fn test_json_array_failure_is_envelope() {
        let source = futures::stream::iter(vec![Ok(1), Err(DomainError::not_found("gone"))]);
        let response = many(StreamFormat::JsonArray, Many::from_stream(source)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_string(response).await,
            r#"{"code":"NOT_FOUND","message":"gone"}"#
        );
    }

    #[tokio::test]
    async fn test_event_stream() {
        let response = many(StreamFormat::EventStream, Many::range(1, 2)).await;
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            StreamFormat::EVENT_STREAM
        );
        let body = body_string(response).await;
        assert!(body.contains("data: 1\n\n"));
        assert!(body.contains("data: 2\n\n"));
    }

    #[tokio::test]
    async fn test_event_stream_failure_is_error_event() {
        let source = futures::stream::iter(vec![Ok(1), Err(DomainError::validation("bad"))]);
        let response = many(StreamFormat::EventStream, Many::from_stream(source)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("data: 1\n\n"));
        assert!(body.contains("event: error\ndata: {\"code\":\"VALIDATION_ERROR\",\"message\":\"bad\"}"));
    }
}

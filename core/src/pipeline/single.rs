//! `Single`: a lazy pipeline producing at most one value.

use super::signal::{FinallyGuard, SignalType};
use crate::error::{DomainError, DomainResult};
use futures::StreamExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::{Future, IntoFuture};

/// Outcome of a [`Single`]: a value, nothing, or an error.
pub type SingleResult<T> = DomainResult<Option<T>>;

/// A lazy, cancellable computation yielding zero or one value.
///
/// Nothing runs until the pipeline is awaited. Awaiting is subscribing,
/// and dropping the future before it resolves cancels every stage,
/// running `do_finally` hooks with [`SignalType::Cancel`].
///
/// # Example
///
/// ```
/// use everydoc_core::pipeline::Single;
///
/// # tokio_test::block_on(async {
/// let greeting = Single::just(7)
///     .filter(|n| *n > 0)
///     .map(|n| format!("item {n}"));
///
/// assert_eq!(greeting.await.ok().flatten(), Some("item 7".to_string()));
/// # });
/// ```
#[must_use = "pipelines do nothing until awaited"]
pub struct Single<T> {
    inner: BoxFuture<'static, SingleResult<T>>,
}

impl<T> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Single(<pipeline>)")
    }
}

impl<T: Send + 'static> Single<T> {
    /// Build a pipeline from a future that may complete empty.
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = SingleResult<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(fut),
        }
    }

    /// Build a pipeline from a future that always yields a value on success.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = DomainResult<T>> + Send + 'static,
    {
        Self::new(async move { fut.await.map(Some) })
    }

    /// Emit `value`.
    pub fn just(value: T) -> Self {
        Self::new(futures::future::ready(Ok(Some(value))))
    }

    /// Complete without a value.
    pub fn empty() -> Self {
        Self::new(futures::future::ready(Ok(None)))
    }

    /// Fail with `err`.
    pub fn error(err: DomainError) -> Self {
        Self::new(futures::future::ready(Err(err)))
    }

    /// Emit the value if present, otherwise complete empty.
    pub fn from_option(value: Option<T>) -> Self {
        Self::new(futures::future::ready(Ok(value)))
    }

    /// Assemble the pipeline only when it is subscribed.
    pub fn defer<F>(factory: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Self::new(async move { factory().inner.await })
    }

    /// Run blocking code on the bounded blocking pool.
    ///
    /// The caller's task is never blocked. A panic in `work` surfaces as
    /// an `Internal` error. Cancelling the pipeline abandons the result
    /// but cannot interrupt `work` once it has started.
    pub fn from_blocking<F, E>(work: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<DomainError> + Send + 'static,
    {
        Self::new(async move {
            match tokio::task::spawn_blocking(work).await {
                Ok(result) => result.map(Some).map_err(Into::into),
                Err(join) => Err(DomainError::internal(join)),
            }
        })
    }

    /// Transform the value.
    pub fn map<U, F>(self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Single::new(async move { self.inner.await.map(|value| value.map(f)) })
    }

    /// Transform the value with a step that may fail.
    pub fn try_map<U, F>(self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> DomainResult<U> + Send + 'static,
    {
        Single::new(async move {
            match self.inner.await? {
                Some(value) => f(value).map(Some),
                None => Ok(None),
            }
        })
    }

    /// Chain a dependent pipeline. Skipped when this one is empty.
    pub fn and_then<U, F>(self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Single<U> + Send + 'static,
    {
        Single::new(async move {
            match self.inner.await? {
                Some(value) => f(value).inner.await,
                None => Ok(None),
            }
        })
    }

    /// Drop the value unless `predicate` holds.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        Self::new(async move { Ok(self.inner.await?.filter(predicate)) })
    }

    /// Subscribe to `fallback` if this pipeline completes empty.
    pub fn switch_if_empty(self, fallback: Self) -> Self {
        Self::new(async move {
            match self.inner.await? {
                Some(value) => Ok(Some(value)),
                None => fallback.inner.await,
            }
        })
    }

    /// Turn an empty completion into the error built by `err`.
    pub fn or_else_error<F>(self, err: F) -> Self
    where
        F: FnOnce() -> DomainError + Send + 'static,
    {
        Self::new(async move {
            match self.inner.await? {
                Some(value) => Ok(Some(value)),
                None => Err(err()),
            }
        })
    }

    /// Turn an empty completion into `NotFound(message)`.
    pub fn or_not_found(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.or_else_error(move || DomainError::not_found(message))
    }

    /// Wait for this pipeline, discard its value and emit `value`.
    pub fn then_return<U>(self, value: U) -> Single<U>
    where
        U: Send + 'static,
    {
        Single::new(async move {
            self.inner.await?;
            Ok(Some(value))
        })
    }

    /// Rewrite an error.
    pub fn on_error_map<F>(self, f: F) -> Self
    where
        F: FnOnce(DomainError) -> DomainError + Send + 'static,
    {
        Self::new(async move { self.inner.await.map_err(f) })
    }

    /// Replace an error with a fallback pipeline.
    pub fn on_error_resume<F>(self, f: F) -> Self
    where
        F: FnOnce(DomainError) -> Self + Send + 'static,
    {
        Self::new(async move {
            match self.inner.await {
                Ok(value) => Ok(value),
                Err(err) => f(err).inner.await,
            }
        })
    }

    /// Replace an error with a fixed value.
    pub fn on_error_return(self, value: T) -> Self {
        Self::new(async move {
            match self.inner.await {
                Ok(found) => Ok(found),
                Err(_) => Ok(Some(value)),
            }
        })
    }

    /// Run `hook` at subscription, before any upstream work.
    pub fn do_on_subscribe<F>(self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(async move {
            hook();
            self.inner.await
        })
    }

    /// Observe the value, if any.
    pub fn do_on_next<F>(self, hook: F) -> Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        Self::new(async move {
            let outcome = self.inner.await;
            if let Ok(Some(value)) = &outcome {
                hook(value);
            }
            outcome
        })
    }

    /// Observe the error, if any.
    pub fn do_on_error<F>(self, hook: F) -> Self
    where
        F: FnOnce(&DomainError) + Send + 'static,
    {
        Self::new(async move {
            let outcome = self.inner.await;
            if let Err(err) = &outcome {
                hook(err);
            }
            outcome
        })
    }

    /// Run `hook` exactly once when the pipeline completes, fails or is
    /// cancelled. A pipeline that is never subscribed never runs it.
    pub fn do_finally<F>(self, hook: F) -> Self
    where
        F: FnOnce(SignalType) + Send + 'static,
    {
        Self::new(async move {
            let mut guard = FinallyGuard::new(hook);
            let outcome = self.inner.await;
            guard.fire(if outcome.is_ok() {
                SignalType::Complete
            } else {
                SignalType::Error
            });
            outcome
        })
    }

    /// View this pipeline as a sequence of zero or one element.
    pub fn into_many(self) -> super::Many<T> {
        let values = futures::stream::once(self.inner)
            .filter_map(|outcome| futures::future::ready(outcome.transpose()));
        super::Many::from_stream(values)
    }
}

impl<T: Send + 'static> IntoFuture for Single<T> {
    type Output = SingleResult<T>;
    type IntoFuture = BoxFuture<'static, SingleResult<T>>;

    fn into_future(self) -> Self::IntoFuture {
        self.inner
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_map_and_filter() {
        let out = Single::just(3).filter(|n| *n > 0).map(|n| n * 2).await;
        assert_eq!(out.unwrap(), Some(6));

        let out = Single::just(-1).filter(|n| *n > 0).map(|n| n * 2).await;
        assert_eq!(out.unwrap(), None);
    }

    #[tokio::test]
    async fn test_nothing_runs_before_await() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pipeline = Single::defer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Single::just("x")
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let _ = pipeline.await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_switch_if_empty_is_lazy() {
        let out = Single::just(1)
            .switch_if_empty(Single::error(DomainError::not_found("never")))
            .await;
        assert_eq!(out.unwrap(), Some(1));

        let err = Single::<i32>::empty()
            .or_not_found("item not found: id=9")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "item not found: id=9");
    }

    #[tokio::test]
    async fn test_error_skips_downstream_stages() {
        let touched = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&touched);
        let err = Single::<i32>::error(DomainError::validation("bad"))
            .map(move |n| {
                seen.fetch_add(1, Ordering::SeqCst);
                n
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(touched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_on_error_map_and_resume() {
        let mapped = Single::<i32>::error(DomainError::internal(anyhow::anyhow!("io")))
            .on_error_map(|_| DomainError::validation("rewritten"))
            .await
            .unwrap_err();
        assert_eq!(mapped.to_string(), "rewritten");

        let resumed = Single::<i32>::error(DomainError::validation("x"))
            .on_error_resume(|_| Single::just(42))
            .await;
        assert_eq!(resumed.unwrap(), Some(42));

        let fixed = Single::<i32>::error(DomainError::validation("x"))
            .on_error_return(0)
            .await;
        assert_eq!(fixed.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_then_return_waits_for_upstream() {
        let out = Single::<()>::empty().then_return("deleted: id=1").await;
        assert_eq!(out.unwrap(), Some("deleted: id=1"));

        let err = Single::<()>::error(DomainError::validation("x"))
            .then_return("never")
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_hooks_fire_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));
        let out = Single::just(5)
            .do_on_subscribe(move || a.lock().unwrap().push("subscribe".to_string()))
            .do_on_next(move |n| b.lock().unwrap().push(format!("next {n}")))
            .do_finally(move |s| c.lock().unwrap().push(format!("{s:?}")))
            .await;

        assert_eq!(out.unwrap(), Some(5));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["subscribe", "next 5", "Complete"]
        );
    }

    #[tokio::test]
    async fn test_do_finally_reports_error() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let _ = Single::<i32>::error(DomainError::validation("x"))
            .do_finally(move |s| *sink.lock().unwrap() = Some(s))
            .await;
        assert_eq!(*seen.lock().unwrap(), Some(SignalType::Error));
    }

    #[tokio::test]
    async fn test_do_finally_reports_cancel() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let pipeline = Single::<i32>::new(futures::future::pending())
            .do_finally(move |s| *sink.lock().unwrap() = Some(s));

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(10), pipeline.into_future()).await;
        assert!(timed_out.is_err());
        assert_eq!(*seen.lock().unwrap(), Some(SignalType::Cancel));
    }

    #[tokio::test]
    async fn test_do_finally_silent_without_subscription() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let pipeline = Single::just(1).do_finally(move |s| *sink.lock().unwrap() = Some(s));
        drop(pipeline);
        assert_eq!(*seen.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn test_from_blocking_runs_off_the_caller() {
        let out = Single::from_blocking(|| Ok::<_, DomainError>(21 * 2)).await;
        assert_eq!(out.unwrap(), Some(42));

        let err = Single::<i32>::from_blocking(|| Err(DomainError::validation("sync failure")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_from_blocking_panic_is_internal() {
        #[allow(clippy::panic)]
        let err = Single::<i32>::from_blocking(|| -> Result<i32, DomainError> { panic!("boom") })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_into_many() {
        use futures::TryStreamExt;

        let items: Vec<i32> = Single::just(1).into_many().try_collect().await.unwrap();
        assert_eq!(items, vec![1]);

        let none: Vec<i32> = Single::<i32>::empty().into_many().try_collect().await.unwrap();
        assert!(none.is_empty());
    }
}

//! `Many`: a lazy pipeline producing a sequence of values.

use super::signal::{FinallyGuard, Signal, SignalType};
use super::single::Single;
use crate::error::{DomainError, DomainResult};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A lazy, cancellable sequence of values that may end in an error.
///
/// The first error is terminal: nothing is emitted after it, whatever
/// the upstream source does. Dropping the stream cancels it.
#[must_use = "pipelines do nothing until polled"]
pub struct Many<T> {
    inner: BoxStream<'static, DomainResult<T>>,
}

impl<T> fmt::Debug for Many<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Many(<pipeline>)")
    }
}

/// Ends `stream` right after its first error.
fn stop_after_error<S, T>(stream: S) -> impl Stream<Item = DomainResult<T>> + Send + 'static
where
    S: Stream<Item = DomainResult<T>> + Send + 'static,
    T: Send + 'static,
{
    stream.scan(false, |failed, item| {
        if *failed {
            return futures::future::ready(None);
        }
        *failed = item.is_err();
        futures::future::ready(Some(item))
    })
}

impl<T: Send + 'static> Many<T> {
    /// Wrap a fallible stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = DomainResult<T>> + Send + 'static,
    {
        Self {
            inner: stop_after_error(stream).boxed(),
        }
    }

    /// Emit every element of `items`, then complete.
    pub fn from_iterable<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::from_stream(futures::stream::iter(items.into_iter().map(Ok)))
    }

    /// Complete immediately.
    pub fn empty() -> Self {
        Self::from_stream(futures::stream::empty())
    }

    /// Fail immediately.
    pub fn error(err: DomainError) -> Self {
        Self::from_stream(futures::stream::once(futures::future::ready(Err(err))))
    }

    /// Transform each element.
    pub fn map<U, F>(self, mut f: F) -> Many<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        Many::from_stream(self.inner.map_ok(move |value| f(value)))
    }

    /// Transform each element with a step that may fail.
    pub fn try_map<U, F>(self, mut f: F) -> Many<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> DomainResult<U> + Send + 'static,
    {
        Many::from_stream(self.inner.map(move |item| item.and_then(&mut f)))
    }

    /// Keep the elements that satisfy `predicate`.
    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        Self::from_stream(self.inner.try_filter(move |value| {
            futures::future::ready(predicate(value))
        }))
    }

    /// Replace each element with a sub-sequence, in order.
    pub fn flat_map<U, F>(self, mut f: F) -> Many<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Many<U> + Send + 'static,
    {
        Many::from_stream(
            self.inner
                .map_ok(move |value| f(value).inner)
                .try_flatten(),
        )
    }

    /// Run `hook` at subscription, before any upstream work.
    pub fn do_on_subscribe<F>(self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.inner;
        Self::from_stream(async_stream::stream! {
            hook();
            while let Some(item) = inner.next().await {
                yield item;
            }
        })
    }

    /// Observe each element.
    pub fn do_on_next<F>(self, mut hook: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        Self::from_stream(self.inner.inspect_ok(move |value| hook(value)))
    }

    /// Observe the terminal error, if any.
    pub fn do_on_error<F>(self, hook: F) -> Self
    where
        F: FnOnce(&DomainError) + Send + 'static,
    {
        let mut hook = Some(hook);
        Self::from_stream(self.inner.inspect_err(move |err| {
            if let Some(hook) = hook.take() {
                hook(err);
            }
        }))
    }

    /// Run `hook` exactly once when the sequence completes, fails or is
    /// cancelled. A sequence that is never polled never runs it.
    pub fn do_finally<F>(self, hook: F) -> Self
    where
        F: FnOnce(SignalType) + Send + 'static,
    {
        let mut inner = self.inner;
        Self::from_stream(async_stream::stream! {
            let mut guard = FinallyGuard::new(hook);
            while let Some(item) = inner.next().await {
                if item.is_err() {
                    guard.fire(SignalType::Error);
                }
                yield item;
            }
            guard.fire(SignalType::Complete);
        })
    }

    /// Gather every element. Fails with the first error.
    pub fn collect_list(self) -> Single<Vec<T>> {
        Single::from_future(self.inner.try_collect())
    }

    /// Fold the sequence into one value.
    pub fn reduce<U, F>(self, initial: U, mut f: F) -> Single<U>
    where
        U: Send + 'static,
        F: FnMut(U, T) -> U + Send + 'static,
    {
        Single::from_future(
            self.inner
                .try_fold(initial, move |acc, value| futures::future::ready(Ok(f(acc, value)))),
        )
    }

    /// Count the elements.
    pub fn count(self) -> Single<u64> {
        self.reduce(0, |n, _| n + 1)
    }

    /// Expose every event, including the terminal one, as a value.
    pub fn materialize(self) -> BoxStream<'static, Signal<T>> {
        let mut inner = self.inner;
        async_stream::stream! {
            let mut failed = false;
            while let Some(item) = inner.next().await {
                match item {
                    Ok(value) => {
                        yield Signal::Next(value);
                    }
                    Err(err) => {
                        failed = true;
                        yield Signal::Error(err);
                    }
                }
            }
            if !failed {
                yield Signal::Complete;
            }
        }
        .boxed()
    }
}

impl Many<i32> {
    /// Emit `count` consecutive integers starting at `start`.
    ///
    /// Stops early at `i32::MAX` instead of overflowing.
    pub fn range(start: i32, count: i32) -> Self {
        Self::from_iterable(
            (0..count.max(0)).map_while(move |offset| start.checked_add(offset)),
        )
    }
}

impl<T: Send + 'static> From<Single<T>> for Many<T> {
    fn from(single: Single<T>) -> Self {
        single.into_many()
    }
}

impl<T> Stream for Many<T> {
    type Item = DomainResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

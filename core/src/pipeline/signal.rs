//! Pipeline signals and termination hooks.

use crate::error::DomainError;

/// One observable event of a pipeline, as produced by
/// [`Many::materialize`](super::Many::materialize).
#[derive(Debug)]
pub enum Signal<T> {
    /// A value was emitted.
    Next(T),
    /// The pipeline failed. Nothing follows.
    Error(DomainError),
    /// The pipeline completed. Nothing follows.
    Complete,
}

impl<T> Signal<T> {
    /// `true` for `Error` and `Complete`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Complete)
    }
}

/// How a pipeline ended, passed to `do_finally` hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// Ran to completion, with or without a value.
    Complete,
    /// Ended with an error.
    Error,
    /// Dropped by its subscriber before terminating.
    Cancel,
}

/// Runs a termination hook exactly once.
///
/// Firing explicitly records `Complete` or `Error`; dropping an unfired
/// guard records `Cancel`.
pub(crate) struct FinallyGuard<F>
where
    F: FnOnce(SignalType),
{
    hook: Option<F>,
}

impl<F> FinallyGuard<F>
where
    F: FnOnce(SignalType),
{
    pub(crate) const fn new(hook: F) -> Self {
        Self { hook: Some(hook) }
    }

    pub(crate) fn fire(&mut self, signal: SignalType) {
        if let Some(hook) = self.hook.take() {
            hook(signal);
        }
    }
}

impl<F> Drop for FinallyGuard<F>
where
    F: FnOnce(SignalType),
{
    fn drop(&mut self) {
        self.fire(SignalType::Cancel);
    }
}

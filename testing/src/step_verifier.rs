//! Step-by-step assertions over pipelines.
//!
//! A fluent API for checking what a [`Single`] or [`Many`] emits, in
//! order, and how it terminates.

#![allow(clippy::module_name_repetitions)] // StepVerifier is the natural name

use everydoc_core::error::{DomainError, ErrorKind};
use everydoc_core::pipeline::{Many, Signal};
use futures::StreamExt;
use std::fmt;

/// Type alias for per-element assertion functions
type NextAssertion<T> = Box<dyn FnOnce(&T)>;

/// Type alias for error predicates
type ErrorPredicate = Box<dyn FnOnce(&DomainError) -> bool>;

enum Step<T> {
    Next(NextAssertion<T>),
    Skip(usize),
}

enum Terminal {
    Complete,
    ErrorKind(ErrorKind),
    ErrorMatching(ErrorPredicate),
}

/// Subscribes to a pipeline and checks its signals one at a time.
///
/// # Example
///
/// ```
/// use everydoc_core::pipeline::Many;
/// use everydoc_testing::StepVerifier;
///
/// # tokio_test::block_on(async {
/// StepVerifier::create(Many::range(1, 3))
///     .expect_next(1)
///     .assert_next(|n| assert!(*n > 1))
///     .expect_next_count(1)
///     .verify_complete()
///     .await;
/// # });
/// ```
pub struct StepVerifier<T> {
    source: Many<T>,
    steps: Vec<Step<T>>,
    terminal: Option<Terminal>,
}

impl<T> StepVerifier<T>
where
    T: fmt::Debug + Send + 'static,
{
    /// Start verifying `source`. A `Single` is treated as a sequence of
    /// at most one element.
    pub fn create(source: impl Into<Many<T>>) -> Self {
        Self {
            source: source.into(),
            steps: Vec::new(),
            terminal: None,
        }
    }

    /// Expect the next element to equal `expected`.
    #[must_use]
    pub fn expect_next(self, expected: T) -> Self
    where
        T: PartialEq + 'static,
    {
        self.assert_next(move |actual| assert_eq!(actual, &expected, "unexpected element"))
    }

    /// Expect `count` more elements, whatever they are.
    #[must_use]
    pub fn expect_next_count(mut self, count: usize) -> Self {
        self.steps.push(Step::Skip(count));
        self
    }

    /// Run `assertion` against the next element.
    #[must_use]
    pub fn assert_next<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&T) + 'static,
    {
        self.steps.push(Step::Next(Box::new(assertion)));
        self
    }

    /// Expect the pipeline to fail with `kind` once the elements run out.
    #[must_use]
    pub fn expect_error(mut self, kind: ErrorKind) -> Self {
        self.terminal = Some(Terminal::ErrorKind(kind));
        self
    }

    /// Expect the pipeline to fail with an error satisfying `predicate`.
    #[must_use]
    pub fn expect_error_matches<F>(mut self, predicate: F) -> Self
    where
        F: FnOnce(&DomainError) -> bool + 'static,
    {
        self.terminal = Some(Terminal::ErrorMatching(Box::new(predicate)));
        self
    }

    /// Expect normal completion and run the verification.
    ///
    /// # Panics
    ///
    /// Panics on the first signal that does not match.
    pub async fn verify_complete(mut self) {
        self.terminal = Some(Terminal::Complete);
        self.verify().await;
    }

    /// Expect a failure of `kind` and run the verification.
    ///
    /// # Panics
    ///
    /// Panics on the first signal that does not match.
    pub async fn verify_error(self, kind: ErrorKind) {
        self.expect_error(kind).verify().await;
    }

    /// Run the verification against the expectations set so far.
    /// Without a terminal expectation, completion is expected.
    ///
    /// # Panics
    ///
    /// Panics on the first signal that does not match.
    #[allow(clippy::panic)] // Assertion failures are panics
    pub async fn verify(self) {
        let mut signals = self.source.materialize();
        let mut position = 0_usize;

        for step in self.steps {
            match step {
                Step::Next(assertion) => {
                    match signals.next().await {
                        Some(Signal::Next(value)) => assertion(&value),
                        other => panic!(
                            "expected element #{position}, got {}",
                            describe(other.as_ref())
                        ),
                    }
                    position += 1;
                }
                Step::Skip(count) => {
                    for _ in 0..count {
                        match signals.next().await {
                            Some(Signal::Next(_)) => {}
                            other => panic!(
                                "expected element #{position}, got {}",
                                describe(other.as_ref())
                            ),
                        }
                        position += 1;
                    }
                }
            }
        }

        let last = signals.next().await;
        match (self.terminal.unwrap_or(Terminal::Complete), last) {
            (Terminal::Complete, Some(Signal::Complete)) => {}
            (Terminal::ErrorKind(kind), Some(Signal::Error(err))) => {
                assert_eq!(err.kind(), kind, "unexpected error kind: {err}");
            }
            (Terminal::ErrorMatching(predicate), Some(Signal::Error(err))) => {
                assert!(predicate(&err), "error did not match: {err:?}");
            }
            (Terminal::Complete, other) => {
                panic!("expected completion, got {}", describe(other.as_ref()));
            }
            (_, other) => panic!("expected an error, got {}", describe(other.as_ref())),
        }
    }
}

fn describe<T: fmt::Debug>(signal: Option<&Signal<T>>) -> String {
    match signal {
        Some(Signal::Next(value)) => format!("element {value:?}"),
        Some(Signal::Error(err)) => format!("error {:?}: {err}", err.kind()),
        Some(Signal::Complete) => "completion".to_string(),
        None => "nothing".to_string(),
    }
}

//! Small pipelines used by the step 19 endpoints.

use everydoc_core::error::DomainError;
use everydoc_core::pipeline::{Many, Single};

/// Greeting and counting pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingService;

impl GreetingService {
    /// Greet `name`.
    ///
    /// A blank name is a programming error on the caller's side and fails
    /// with `Internal`.
    pub fn greet(self, name: &str) -> Single<String> {
        if name.trim().is_empty() {
            return Single::error(DomainError::internal(anyhow::anyhow!(
                "name must not be blank"
            )));
        }
        Single::just(format!("안녕하세요, {name} 님!"))
    }

    /// `1, 2, 3, 4, 5`.
    pub fn numbers(self) -> Many<i32> {
        Many::range(1, 5)
    }

    /// Sum of [`GreetingService::numbers`].
    pub fn sum(self) -> Single<i64> {
        self.numbers().map(i64::from).reduce(0, |total, n| total + n)
    }

    /// `"아이템-{id}"` for a positive `id`, otherwise empty.
    pub fn find_optional(self, id: i64) -> Single<String> {
        Single::from_option((id > 0).then(|| format!("아이템-{id}")))
    }
}

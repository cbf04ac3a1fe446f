//! Item lookups and the external API call used by the step 20 endpoints.
//!
//! Both show the usual request flow: validate the input, look the value
//! up, turn an empty result into `NotFound`, transform, and let any
//! failure travel to the error mapper.

use everydoc_core::error::DomainError;
use everydoc_core::pipeline::Single;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by an [`ExternalApi`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalApiError {
    /// The remote system is in a state where it cannot answer right now.
    #[error("{0}")]
    IllegalState(String),

    /// Any other failure of the call.
    #[error("external call failed: {0}")]
    Failed(String),
}

impl From<ExternalApiError> for DomainError {
    fn from(err: ExternalApiError) -> Self {
        Self::internal(err)
    }
}

/// A synchronous dependency. Calls may block the current thread.
pub trait ExternalApi: Send + Sync {
    /// Ask the remote system about `param`.
    ///
    /// # Errors
    ///
    /// Returns the remote system's failure.
    fn call(&self, param: &str) -> Result<String, ExternalApiError>;
}

/// Stand-in remote system: `"error"` puts it in an illegal state, any
/// other parameter is echoed back.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedExternalApi;

impl ExternalApi for SimulatedExternalApi {
    fn call(&self, param: &str) -> Result<String, ExternalApiError> {
        if param == "error" {
            return Err(ExternalApiError::IllegalState(
                "external system failure".to_string(),
            ));
        }
        Ok(format!("외부 API 응답: {param}"))
    }
}

/// Lookups against a fixed item table.
#[derive(Clone)]
pub struct ItemService {
    items: BTreeMap<i64, &'static str>,
    external: Arc<dyn ExternalApi>,
}

impl Default for ItemService {
    fn default() -> Self {
        Self::new(Arc::new(SimulatedExternalApi))
    }
}

impl ItemService {
    /// Create the service with the standard item table, calling `external`
    /// for [`ItemService::call_external_api`].
    #[must_use]
    pub fn new(external: Arc<dyn ExternalApi>) -> Self {
        let items = BTreeMap::from([(1, "노트북"), (2, "마우스"), (3, "키보드")]);
        Self { items, external }
    }

    /// Describe item `id`.
    ///
    /// Fails with `Validation` when `id` is not positive and with `NotFound`
    /// when no such item exists.
    pub fn find_item(&self, id: i64) -> Single<String> {
        if id <= 0 {
            return Single::error(DomainError::validation(format!(
                "id must be positive: {id}"
            )));
        }

        Single::from_option(self.items.get(&id).copied())
            .or_not_found(format!("item not found: id={id}"))
            .map(move |name| format!("아이템[{id}]: {name}"))
    }

    /// [`ItemService::find_item`] with the request, the result and any
    /// failure logged.
    pub fn find_item_with_logging(&self, id: i64) -> Single<String> {
        self.find_item(id)
            .do_on_subscribe(move || tracing::info!(item_id = id, "find_item started"))
            .do_on_next(|result| tracing::info!(result = %result, "find_item completed"))
            .do_on_error(move |err| {
                tracing::error!(item_id = id, error = %err, "find_item failed");
            })
    }

    /// Call the external API on the blocking pool.
    ///
    /// An illegal-state failure is reported to the client as
    /// `Validation("external error: ...")`; other failures pass through.
    pub fn call_external_api(&self, param: impl Into<String>) -> Single<String> {
        let param = param.into();
        let external = Arc::clone(&self.external);

        Single::from_blocking(move || external.call(&param)).on_error_map(|err| {
            if let Some(ExternalApiError::IllegalState(message)) =
                err.source_as::<ExternalApiError>()
            {
                return DomainError::validation(format!("external error: {message}"));
            }
            err
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use everydoc_core::error::ErrorKind;
    use everydoc_testing::StepVerifier;
    use proptest::prelude::*;
    use std::io;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[tokio::test]
    async fn test_find_item() {
        let service = ItemService::default();

        StepVerifier::create(service.find_item(1))
            .expect_next("아이템[1]: 노트북".to_string())
            .verify_complete()
            .await;
        StepVerifier::create(service.find_item(3))
            .expect_next("아이템[3]: 키보드".to_string())
            .verify_complete()
            .await;
    }

    #[tokio::test]
    async fn test_find_item_errors() {
        let service = ItemService::default();

        StepVerifier::create(service.find_item(0))
            .expect_error_matches(|e| e.to_string() == "id must be positive: 0")
            .verify()
            .await;
        StepVerifier::create(service.find_item(99))
            .expect_error_matches(|e| {
                e.kind() == ErrorKind::NotFound && e.to_string() == "item not found: id=99"
            })
            .verify()
            .await;
    }

    #[tokio::test]
    async fn test_external_api_remaps_illegal_state() {
        let service = ItemService::default();

        StepVerifier::create(service.call_external_api("ping"))
            .expect_next("외부 API 응답: ping".to_string())
            .verify_complete()
            .await;
        StepVerifier::create(service.call_external_api("error"))
            .expect_error_matches(|e| {
                e.kind() == ErrorKind::Validation
                    && e.to_string() == "external error: external system failure"
            })
            .verify()
            .await;
    }

    struct BrokenApi;

    impl ExternalApi for BrokenApi {
        fn call(&self, _param: &str) -> Result<String, ExternalApiError> {
            Err(ExternalApiError::Failed("timeout".to_string()))
        }
    }

    #[tokio::test]
    async fn test_external_api_other_failures_pass_through() {
        let service = ItemService::new(Arc::new(BrokenApi));

        let err = service.call_external_api("ping").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(
            err.source_as::<ExternalApiError>(),
            Some(&ExternalApiError::Failed("timeout".to_string()))
        );
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_captured_logs<T>(run: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, run);
        (out, captured.text())
    }

    #[test]
    fn test_logging_hooks_observe_without_changing_the_result() {
        let service = ItemService::default();

        let (found, logs) = with_captured_logs(|| {
            tokio_test::block_on(service.find_item_with_logging(2).into_future())
        });
        assert_eq!(found.unwrap(), Some("아이템[2]: 마우스".to_string()));
        assert!(logs.contains("find_item started"));
        assert!(logs.contains("find_item completed"));
        assert!(!logs.contains("find_item failed"));

        let (failed, logs) = with_captured_logs(|| {
            tokio_test::block_on(service.find_item_with_logging(-5).into_future())
        });
        assert_eq!(failed.unwrap_err().to_string(), "id must be positive: -5");
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("find_item failed"));
        assert!(logs.contains("item_id=-5"));
    }

    proptest! {
        #[test]
        fn prop_non_positive_ids_are_invalid(id in i64::MIN..=0) {
            let outcome = tokio_test::block_on(ItemService::default().find_item(id).into_future());
            prop_assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Validation);
        }

        #[test]
        fn prop_unknown_ids_are_not_found(id in 4_i64..) {
            let outcome = tokio_test::block_on(ItemService::default().find_item(id).into_future());
            prop_assert_eq!(outcome.unwrap_err().kind(), ErrorKind::NotFound);
        }
    }
}

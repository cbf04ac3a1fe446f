//! Application state for the Everydoc HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Order service (over the configured repository)
//! - Item, greeting and upload services
//! - The tutorial catalog
//! - A readiness probe on the same store the orders use

use crate::services::{GreetingService, ItemService, OrderService, TutorialCatalog, UploadService};
use axum::extract::FromRef;
use everydoc_core::repository::{OrderRepository, ReadinessProbe};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// It's cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Order use cases
    pub orders: Arc<OrderService>,
    /// Item lookups and the external API call
    pub items: Arc<ItemService>,
    /// Step 19 pipelines
    pub greetings: GreetingService,
    /// Upload handling
    pub uploads: Arc<UploadService>,
    /// Tutorial step titles
    pub tutorials: TutorialCatalog,
    /// Liveness of the order store
    pub readiness: Arc<dyn ReadinessProbe>,
}

impl AppState {
    /// Wire the services around `repository`, storing uploads in `upload_dir`.
    #[must_use]
    pub fn new<R>(repository: Arc<R>, upload_dir: impl Into<PathBuf>) -> Self
    where
        R: OrderRepository + ReadinessProbe + 'static,
    {
        let readiness: Arc<dyn ReadinessProbe> = repository.clone();
        Self {
            orders: Arc::new(OrderService::new(repository)),
            items: Arc::new(ItemService::default()),
            greetings: GreetingService,
            uploads: Arc::new(UploadService::new(upload_dir)),
            tutorials: TutorialCatalog,
            readiness,
        }
    }

    /// Replace the item service.
    #[must_use]
    pub fn with_items(mut self, items: ItemService) -> Self {
        self.items = Arc::new(items);
        self
    }
}

impl FromRef<AppState> for Arc<dyn ReadinessProbe> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.readiness)
    }
}

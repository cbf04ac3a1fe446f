//! Application services.
//!
//! Services build pipelines and never await them; the HTTP layer
//! subscribes once per request.

pub mod greetings;
pub mod items;
pub mod orders;
pub mod tutorial;
pub mod uploads;

pub use greetings::GreetingService;
pub use items::{ExternalApi, ExternalApiError, ItemService, SimulatedExternalApi};
pub use orders::OrderService;
pub use tutorial::TutorialCatalog;
pub use uploads::UploadService;

//! API endpoints for the Everydoc server, organized by tutorial step:
//! - Uploads (step 17): multipart file handling
//! - Orders (step 18): the order store
//! - Greetings (step 19): small pipelines
//! - Items (step 20): validation, not-found and error remapping
//! - Tutorial: static step pages

pub mod greetings;
pub mod items;
pub mod orders;
pub mod tutorial;
pub mod uploads;

//! Lazy, cancellable pipelines.
//!
//! A [`Single`] yields zero or one value, a [`Many`] yields a sequence.
//! Both describe work without doing it: stages run only once the
//! pipeline is awaited or polled, each stage sees the previous stage's
//! value or error, and dropping the pipeline cancels whatever is still
//! in flight.
//!
//! Blocking code enters a pipeline through [`Single::from_blocking`],
//! which runs it on the runtime's bounded blocking pool.

mod many;
mod signal;
mod single;

pub use many::Many;
pub use signal::{Signal, SignalType};
pub use single::{Single, SingleResult};

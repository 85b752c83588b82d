//! # Built-in subscribers.
//!
//! Ready-made [`Handler`](crate::Handler)s for events.
//!
//! ## Subscriber types
//! - [`LogWriter`] - records each delivery through `tracing`

mod log;

pub use log::LogWriter;

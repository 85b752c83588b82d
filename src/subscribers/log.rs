//! # Logging subscriber for debugging and demos.
//!
//! [`LogWriter`] builds handlers that record each delivery as a `tracing`
//! event at `INFO` level, target `taskcast::deliveries`.
//!
//! ## Output format (with a fmt subscriber installed)
//! ```text
//! INFO taskcast::deliveries: [delivered] event="on_failure" arg=Timeout
//! INFO taskcast::deliveries: [delivered] event="on_success" arg=42
//! ```
//!
//! ## Example
//! ```rust
//! use taskcast::{Future, LogWriter};
//!
//! let f: Future<u32> = Future::new();
//! LogWriter::attach(f.success_event());
//! f.on_success(42).unwrap();
//! ```

use std::fmt::Debug;

use tracing::info;

use crate::events::{Event, Handler};

/// Handler factory that logs every delivery.
///
/// Enabled via the `logging` feature. Meant for development; implement a
/// custom [`Handler`] for anything that needs structured fields of its own.
pub struct LogWriter;

impl LogWriter {
    /// Returns a handler that logs deliveries under the label `event`.
    pub fn handler<A: Debug + 'static>(event: &'static str) -> Handler<A> {
        Handler::new(move |arg: &A| {
            info!(target: "taskcast::deliveries", event, ?arg, "[delivered]");
            Ok(())
        })
    }

    /// Subscribes a logging handler to `event` and returns it for later removal.
    pub fn attach<A: Debug + 'static>(event: &Event<A>) -> Handler<A> {
        let handler = Self::handler(event.name());
        event.subscribe(handler.clone());
        handler
    }
}

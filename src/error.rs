//! Error types used by event channels, transactions and tasks.
//!
//! Everything fallible in this crate returns [`Error`]:
//!
//! - [`Error::EventHandler`]: a subscriber failed while an event was delivered.
//! - [`Error::HandlerNotFound`]: unsubscribing a handler that was never attached.
//! - [`Error::NoFailureHandler`]: a failure was signalled that nobody observes.
//! - [`Error::InvalidState`]: a lifecycle verb was used on a stopped task.
//! - [`Error::Precondition`]: an outcome accessor was read at the wrong time.
//!
//! None of these are retried by the crate; they propagate to the immediate caller.

use std::rc::Rc;
use thiserror::Error;

/// Error returned by a subscriber.
///
/// Subscribers may fail with anything implementing [`std::error::Error`],
/// including this crate's own [`Error`].
pub type BoxError = Box<dyn std::error::Error>;

/// Failure value carried by `on_failure`.
///
/// Shared so the same failure can be recorded by a child task and forwarded
/// to the task that adopted it.
pub type Failure = Rc<dyn std::error::Error>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// # Errors produced by events and task lifecycles.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A subscriber returned an error while an event was being delivered.
    ///
    /// Delivery of the remaining subscribers of the same pass is aborted.
    #[error("handler for event `{event}` failed")]
    EventHandler {
        /// Name of the event being delivered.
        event: &'static str,
        /// The error returned by the subscriber.
        #[source]
        source: BoxError,
    },

    /// `unsubscribe` was called with a handler that is not subscribed.
    #[error("handler is not subscribed to event `{event}`")]
    HandlerNotFound {
        /// Name of the event.
        event: &'static str,
    },

    /// `on_failure` was signalled without any failure handler attached.
    ///
    /// The task stays running.
    #[error("task `{task}` failed without a failure handler attached")]
    NoFailureHandler {
        /// Name of the task.
        task: String,
    },

    /// A lifecycle operation was applied to a task that is no longer running.
    #[error("{operation}() called on non-running task `{task}`")]
    InvalidState {
        /// Name of the task.
        task: String,
        /// The rejected operation.
        operation: &'static str,
    },

    /// An outcome field was read before the task stopped, or for the wrong outcome.
    #[error("cannot read `{field}` of task `{task}`: {reason}")]
    Precondition {
        /// Name of the task.
        task: String,
        /// The field that was read.
        field: &'static str,
        /// Why the read is not allowed.
        reason: &'static str,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskcast::Error;
    ///
    /// let err = Error::HandlerNotFound { event: "on_change" };
    /// assert_eq!(err.as_label(), "handler_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::EventHandler { .. } => "event_handler_failed",
            Error::HandlerNotFound { .. } => "handler_not_found",
            Error::NoFailureHandler { .. } => "no_failure_handler",
            Error::InvalidState { .. } => "invalid_state",
            Error::Precondition { .. } => "precondition_failed",
        }
    }

    /// Returns `true` if this error wraps a failing subscriber.
    pub fn is_handler_error(&self) -> bool {
        matches!(self, Error::EventHandler { .. })
    }

    pub(crate) fn invalid_state(task: &str, operation: &'static str) -> Self {
        Error::InvalidState {
            task: task.to_string(),
            operation,
        }
    }

    pub(crate) fn precondition(task: &str, field: &'static str, reason: &'static str) -> Self {
        Error::Precondition {
            task: task.to_string(),
            field,
            reason,
        }
    }
}

//! Events: bound channels, subscriber handles and transaction scopes.
//!
//! This module groups the dispatch primitives that task types are built from.
//!
//! ## Contents
//! - [`Event`] per-instance channel with a subscriber list
//! - [`Handler`] shared subscriber callable, compared by identity
//! - [`Transaction`] reentrancy guard that defers delivery to the outermost scope
//! - [`EventSource`] what an owner must expose for its events to fire
//!
//! ## Quick reference
//! ```text
//! owner.method()
//!   └─► event.fire(owner, arg, body)
//!         ├─► body(&arg)                         (synchronous, errors propagate)
//!         └─► owner.transaction().enqueue(...)   (deliver now, or at outermost run)
//! ```

mod event;
mod handler;
mod transaction;

pub use event::Event;
pub use handler::{Handler, HandlerResult};
pub use transaction::Transaction;

/// Owner of one or more [`Event`]s.
///
/// Passed explicitly to [`Event::fire`] so a channel never needs a back
/// reference to the instance it belongs to.
pub trait EventSource {
    /// The owner's transaction scope.
    fn transaction(&self) -> &Transaction;

    /// Whether subscribers should still be notified.
    fn is_running(&self) -> bool;
}

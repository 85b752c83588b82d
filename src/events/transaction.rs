//! # Per-instance transaction scope.
//!
//! A [`Transaction`] batches subscriber notification. While a transaction is
//! open, notifications are queued instead of delivered; the outermost
//! [`run`](Transaction::run) replays them once its body has returned.
//!
//! ## Rules
//! - **Nesting collapses**: an inner `run` reuses the open queue; only the
//!   outermost call flushes.
//! - **FIFO**: deferred notifications are replayed in enqueue order.
//! - **No replay on error**: if the body returns `Err` (or unwinds), the queue
//!   is discarded unflushed.
//! - **Detached flush**: the queue is closed before replay, so events raised by
//!   a subscriber during the flush form a transaction of their own.
//! - **Abort on first error**: a failing notification stops the flush; the
//!   remaining entries are dropped.
//!
//! ```text
//! run(body) ── open queue ──► body() ──► fire(A) ─► enqueue(notify A)
//!                                   └──► run(inner) ─► fire(B) ─► enqueue(notify B)
//!           ◄── close queue ◄──┘
//!           ──► notify A ──► notify B        (only if body returned Ok)
//! ```

use std::cell::RefCell;
use std::fmt;

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A queued notification.
type Deferred = Box<dyn FnOnce() -> Result<()>>;

type Queue = RefCell<Option<Vec<Deferred>>>;

/// Reentrancy guard and deferred-callback queue owned by one instance.
pub struct Transaction {
    queue: Queue,
}

/// Clears the active queue when the outermost scope ends, including on unwind.
struct OpenScope<'a>(&'a Queue);

impl Drop for OpenScope<'_> {
    fn drop(&mut self) {
        if let Ok(mut queue) = self.0.try_borrow_mut() {
            queue.take();
        }
    }
}

impl Transaction {
    /// Creates an idle transaction scope.
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(None),
        }
    }

    /// Returns `true` while a transaction body is executing.
    pub fn is_active(&self) -> bool {
        self.queue.borrow().is_some()
    }

    /// Number of notifications waiting for the outermost scope to finish.
    pub fn pending(&self) -> usize {
        self.queue.borrow().as_ref().map_or(0, Vec::len)
    }

    /// Runs `body` inside the transaction.
    ///
    /// If no transaction is active, opens one, runs `body`, and on `Ok` replays
    /// every queued notification in FIFO order. If one is already active, runs
    /// `body` directly and leaves the flush to the outermost caller.
    ///
    /// # Errors
    /// - whatever `body` returns (the queue is then discarded);
    /// - the first error of a replayed notification, typically
    ///   [`Error::EventHandler`].
    pub fn run<R, E, F>(&self, body: F) -> Result<R, E>
    where
        F: FnOnce() -> Result<R, E>,
        E: From<Error>,
    {
        if self.is_active() {
            return body();
        }

        *self.queue.borrow_mut() = Some(Vec::new());
        let scope = OpenScope(&self.queue);
        let outcome = body();
        let queue = self.queue.borrow_mut().take().unwrap_or_default();
        drop(scope);

        match outcome {
            Ok(value) => {
                trace!(pending = queue.len(), "flushing transaction");
                for deferred in queue {
                    deferred()?;
                }
                Ok(value)
            }
            Err(err) => {
                if !queue.is_empty() {
                    debug!(
                        discarded = queue.len(),
                        "transaction body failed; dropping queued notifications"
                    );
                }
                Err(err)
            }
        }
    }

    /// Queues `deferred` on the active transaction, or runs it now if none is open.
    pub fn enqueue<F>(&self, deferred: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        if let Some(queue) = self.queue.borrow_mut().as_mut() {
            queue.push(Box::new(deferred));
            return Ok(());
        }
        deferred()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("active", &self.is_active())
            .field("pending", &self.pending())
            .finish()
    }
}

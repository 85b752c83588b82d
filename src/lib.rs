//! # taskcast
//!
//! **taskcast** is a single-threaded event dispatch and task lifecycle library.
//!
//! Objects declare named events that any number of handlers may subscribe to.
//! Delivery is batched per instance inside a *transaction*, so an operation
//! that raises events from nested calls only notifies subscribers after the
//! outermost call has finished. On top of that sit [`Task`] (running/stopped,
//! optional failure, adoption of child tasks) and [`Future`] (a task that
//! succeeds with a value).
//!
//! Everything is synchronous and cooperative: no threads, no scheduler,
//! nothing blocks. "Cancellation" is a plain call to [`Task::stop`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────────────────────── task instance ───────────────────────────────┐
//!   │  TaskCore                                                                    │
//!   │   - running / exception                                                      │
//!   │   - Transaction (deferred queue)  ◄──────────────┐                           │
//!   │   - adopted: [Weak<dyn Task>]                    │ enqueue(notify)           │
//!   │   - on_failure: Event<Failure>  ──fire──► body ──┘                           │
//!   │  (Future) on_success: Event<T>  ──fire──► body ──┘                           │
//!   └──────────────────────────────────────────────────────────────────────────────┘
//!                      │ flush at outermost transaction, FIFO
//!                      ▼
//!            Handler 1 ─► Handler 2 ─► ... (first error aborts the pass)
//! ```
//!
//! ### Failure adoption
//! ```text
//! leaf.on_failure(e) ─► leaf stops ─► notify ─► mid.on_failure(e) ─► mid stops ─► notify ─► root.on_failure(e)
//!                                                                                          └─ no handler? NoFailureHandler
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                    |
//! |-------------------|---------------------------------------------------------------|---------------------------------------|
//! | **Events**        | Per-instance channels with subscribe/unsubscribe/fire.         | [`Event`], [`Handler`], [`EventSource`] |
//! | **Transactions**  | Defer delivery until the outermost call returns.               | [`Transaction`]                       |
//! | **Tasks**         | Running/stopped lifecycle, failure, adoption, cleanup hook.    | [`Task`], [`TaskCore`], [`stop_task`] |
//! | **Futures**       | Tasks that succeed with a result.                              | [`Future`]                            |
//! | **Errors**        | Typed errors for handlers and lifecycle misuse.                | [`Error`]                             |
//! | **Configuration** | Per-task name and queue sizing.                                | [`TaskConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a handler that records deliveries through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use taskcast::{Failure, Future, Handler, Task};
//!
//! let parent: Rc<Future<()>> = Future::shared();
//! let child: Rc<Future<u32>> = Future::shared();
//!
//! parent.failure_event().subscribe(Handler::new(|e: &Failure| {
//!     eprintln!("pipeline failed: {e}");
//!     Ok(())
//! }));
//! Future::adopt(&parent, &child)?;
//!
//! let err: Failure = Rc::new(std::io::Error::other("upstream closed"));
//! child.on_failure(Rc::clone(&err))?;
//!
//! assert!(!parent.running());
//! assert!(Rc::ptr_eq(&parent.exception()?, &err));
//! # Ok::<(), taskcast::Error>(())
//! ```
mod config;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use config::TaskConfig;
pub use error::{BoxError, Error, Failure, Result};
pub use events::{Event, EventSource, Handler, HandlerResult, Transaction};
pub use tasks::{Future, Task, TaskCore, stop_task};

// Optional: expose a simple built-in logging subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod subscribers;
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

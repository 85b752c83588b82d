//! # Task lifecycle and failure adoption.
//!
//! A [`Task`] is created running and stops exactly once, through
//! [`stop`](Task::stop), through its own [`on_failure`](Task::on_failure), or
//! (for a [`Future`](crate::Future)) through `on_success`.
//!
//! ```text
//!              stop() / on_failure(e) / on_success(v)
//!   Running ───────────────────────────────────────────► Stopped { failed }
//!      │                                                     │
//!      └─ stop() again ─► InvalidState                       └─ immutable
//! ```
//!
//! ## Adoption
//! [`Task::adopt`] registers a child and forwards the child's failure to the
//! parent's `on_failure`. Because `on_failure` refuses to run without a
//! subscriber, a failure climbs the adoption tree until some task has a
//! handler, or surfaces as [`Error::NoFailureHandler`] wrapped in
//! [`Error::EventHandler`] at the task that raised it.
//!
//! Stopping a parent stops every adopted child that is still running.

use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::error::{Error, Failure, Result};
use crate::events::{Event, EventSource, Handler};
use crate::tasks::TaskCore;

/// # Stoppable unit with an optional failure outcome.
///
/// Implementors embed a [`TaskCore`] and return it from [`core`](Task::core).
/// Every other method has a default; override [`cleanup`](Task::cleanup) to
/// release resources when the task stops.
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use taskcast::{Failure, Handler, Task, TaskCore};
///
/// struct Download {
///     core: TaskCore,
///     closed: Cell<bool>,
/// }
///
/// impl Task for Download {
///     fn core(&self) -> &TaskCore { &self.core }
///
///     fn cleanup(&self) -> taskcast::Result<()> {
///         self.closed.set(true);
///         Ok(())
///     }
/// }
///
/// let d = Download { core: TaskCore::new("download"), closed: Cell::new(false) };
/// d.failure_event().subscribe(Handler::new(|e: &Failure| {
///     eprintln!("download failed: {e}");
///     Ok(())
/// }));
///
/// let err: Failure = Rc::new(std::io::Error::other("connection reset"));
/// d.on_failure(err).unwrap();
/// assert!(!d.running());
/// assert!(d.closed.get());
/// assert!(d.failed().unwrap());
/// ```
pub trait Task {
    /// The embedded per-instance state.
    fn core(&self) -> &TaskCore;

    /// Called once by [`stop`](Task::stop) after `running` became `false`.
    ///
    /// Errors propagate out of `stop` (and out of a parent's `stop`).
    fn cleanup(&self) -> Result<()> {
        Ok(())
    }

    /// Task name used in errors and log records.
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Whether the task is still running.
    fn running(&self) -> bool {
        self.core().is_running()
    }

    /// Whether the task stopped because of a failure.
    ///
    /// # Errors
    /// [`Error::Precondition`] while the task is running.
    fn failed(&self) -> Result<bool> {
        let core = self.core();
        core.ensure_stopped("failed")?;
        Ok(core.has_exception())
    }

    /// The failure the task stopped with.
    ///
    /// # Errors
    /// [`Error::Precondition`] while the task is running, or if it stopped without failing.
    fn exception(&self) -> Result<Failure> {
        let core = self.core();
        core.ensure_stopped("exception")?;
        core.exception()
            .ok_or_else(|| Error::precondition(core.name(), "exception", "task did not fail"))
    }

    /// The bound `on_failure` channel, for subscribing failure handlers.
    fn failure_event(&self) -> &Event<Failure> {
        self.core().failure_event()
    }

    /// Whether [`on_failure`](Task::on_failure) would find a subscriber.
    fn has_failure_handler(&self) -> bool {
        self.core().failure_event().has_subscribers()
    }

    /// Stops the task, runs [`cleanup`](Task::cleanup), then stops every
    /// still-running adopted child.
    ///
    /// # Errors
    /// - [`Error::InvalidState`] if the task is already stopped;
    /// - the first cleanup error of this task or of a child.
    fn stop(&self) -> Result<()> {
        let core = self.core();
        core.mark_stopped()?;
        debug!(task = %core.name(), "task stopped");

        self.cleanup()?;
        for child in core.adopted() {
            stop_task(Some(&*child))?;
        }
        Ok(())
    }

    /// Signals that the task failed with `exception`.
    ///
    /// Records the failure, stops the task, then notifies the failure handlers.
    ///
    /// # Errors
    /// - [`Error::InvalidState`] if the task is already stopped;
    /// - [`Error::NoFailureHandler`] if nobody subscribed to `on_failure`
    ///   (the task keeps running);
    /// - errors from [`stop`](Task::stop) or from the handlers.
    fn on_failure(&self, exception: Failure) -> Result<()> {
        let core = self.core();
        core.ensure_running("on_failure")?;

        if !self.has_failure_handler() {
            warn!(task = %core.name(), error = %exception, "failure signalled without a failure handler");
            return Err(Error::NoFailureHandler {
                task: core.name().to_string(),
            });
        }

        core.failure_event().fire(core, exception, |failure| {
            core.record_exception(Rc::clone(failure));
            self.stop()
        })
    }

    /// Adopts `child`, subscribing `failure_handler` to the child's `on_failure`.
    ///
    /// The child is held weakly; stopping this task stops the child if it is
    /// still alive and running.
    ///
    /// # Errors
    /// [`Error::InvalidState`] if this task or `child` already stopped.
    fn adopt_with<C>(&self, child: &Rc<C>, failure_handler: Handler<Failure>) -> Result<()>
    where
        Self: Sized,
        C: Task + 'static,
    {
        self.core().ensure_running("adopt")?;
        child.core().ensure_running("adopt")?;

        let weak = Rc::downgrade(child);
        let weak: Weak<dyn Task> = weak;
        self.core().push_adopted(weak);
        child.failure_event().subscribe(failure_handler);
        debug!(parent = %self.name(), child = %child.name(), "task adopted");
        Ok(())
    }

    /// Adopts `child` so that its failure is re-raised on `this`.
    ///
    /// The forwarding handler keeps `this` alive for as long as the child holds it.
    /// A failure arriving after `this` stopped is dropped, since the parent
    /// already reached its outcome (e.g. a child shared by two adopters).
    ///
    /// # Errors
    /// [`Error::InvalidState`] if this task or `child` already stopped.
    fn adopt<C>(this: &Rc<Self>, child: &Rc<C>) -> Result<()>
    where
        Self: Sized + 'static,
        C: Task + 'static,
    {
        let parent = Rc::clone(this);
        let forward = Handler::new(move |failure: &Failure| {
            if !parent.running() {
                return Ok(());
            }
            parent.on_failure(Rc::clone(failure)).map_err(Into::into)
        });
        this.adopt_with(child, forward)
    }

    /// Runs `body` as a transaction-scoped method of this task.
    ///
    /// Subscribers of events raised inside `body` are notified once the
    /// outermost transaction of this task returns `Ok`.
    fn in_transaction<R, E, F>(&self, body: F) -> Result<R, E>
    where
        Self: Sized,
        F: FnOnce() -> Result<R, E>,
        E: From<Error>,
    {
        self.core().transaction().run(body)
    }

    /// Creates a task that has already failed with `exception`.
    ///
    /// The task's `Default` must subscribe a failure handler, otherwise this
    /// returns [`Error::NoFailureHandler`]; see [`create_failure_with`](Task::create_failure_with).
    fn create_failure(exception: Failure) -> Result<Self>
    where
        Self: Sized + Default,
    {
        let task = Self::default();
        task.on_failure(exception)?;
        Ok(task)
    }

    /// Like [`create_failure`](Task::create_failure), subscribing `failure_handler` first.
    fn create_failure_with(exception: Failure, failure_handler: Handler<Failure>) -> Result<Self>
    where
        Self: Sized + Default,
    {
        let task = Self::default();
        task.failure_event().subscribe(failure_handler);
        task.on_failure(exception)?;
        Ok(task)
    }
}

/// Stops `task` if it is present and running; otherwise does nothing.
///
/// # Errors
/// Cleanup errors from [`Task::stop`].
pub fn stop_task<T>(task: Option<&T>) -> Result<()>
where
    T: Task + ?Sized,
{
    match task {
        Some(task) if task.running() => task.stop(),
        _ => Ok(()),
    }
}

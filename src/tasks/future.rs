//! # Futures: tasks that succeed with a value.
//!
//! [`Future`] is a [`Task`] with a second terminal outcome. It stops either
//! through `on_failure` (like any task) or through [`Future::on_success`],
//! which records the result before notifying subscribers.
//!
//! The result is kept behind an `Rc`, so any `T` can be a result and
//! subscribers see the very value the future recorded.
//!
//! This is a synchronous completion cell, unrelated to `std::future::Future`:
//! nothing is polled, completion is signalled by calling `on_success`.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use taskcast::{Future, Handler, Task};
//!
//! let answer: Future<u32> = Future::new();
//! answer.success_event().subscribe(Handler::new(|v: &Rc<u32>| {
//!     println!("resolved with {v}");
//!     Ok(())
//! }));
//!
//! answer.on_success(42).unwrap();
//! assert!(!answer.running());
//! assert!(answer.succeeded().unwrap());
//! assert_eq!(*answer.result().unwrap(), 42);
//! ```

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::TaskConfig;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::tasks::{Task, TaskCore};

/// Task that completes with a result of type `T`.
pub struct Future<T> {
    core: TaskCore,
    result: RefCell<Option<Rc<T>>>,
    on_success: Event<Rc<T>>,
}

impl<T: 'static> Future<T> {
    /// Creates a running future named `"future"`.
    pub fn new() -> Self {
        Self::with_config(TaskConfig::named("future"))
    }

    /// Creates a running future with the given name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_config(TaskConfig::named(name))
    }

    /// Creates a running future from `config`.
    pub fn with_config(config: TaskConfig) -> Self {
        Self {
            core: TaskCore::with_config(config),
            result: RefCell::new(None),
            on_success: Event::new("on_success"),
        }
    }

    /// The bound `on_success` channel.
    #[inline]
    pub fn success_event(&self) -> &Event<Rc<T>> {
        &self.on_success
    }

    /// Whether the future stopped with a result.
    ///
    /// # Errors
    /// [`Error::Precondition`] while the future is running.
    pub fn succeeded(&self) -> Result<bool> {
        self.core.ensure_stopped("succeeded")?;
        Ok(self.result.borrow().is_some())
    }

    /// The result the future succeeded with.
    ///
    /// # Errors
    /// [`Error::Precondition`] while running, or if the future stopped without succeeding.
    pub fn result(&self) -> Result<Rc<T>> {
        self.core.ensure_stopped("result")?;
        self.result.borrow().clone().ok_or_else(|| {
            Error::precondition(self.core.name(), "result", "future did not succeed")
        })
    }

    /// Completes the future with `result`, stops it, then notifies subscribers.
    ///
    /// # Errors
    /// - [`Error::InvalidState`] if the future already stopped;
    /// - errors from [`Task::stop`] or from the handlers.
    pub fn on_success(&self, result: T) -> Result<()> {
        self.core.ensure_running("on_success")?;
        self.on_success.fire(&self.core, Rc::new(result), |value| {
            *self.result.borrow_mut() = Some(Rc::clone(value));
            self.stop()
        })
    }

    /// Creates a future that has already succeeded with `result`.
    pub fn create_success(result: T) -> Result<Self> {
        let future = Self::new();
        future.on_success(result)?;
        Ok(future)
    }

    /// Creates a shared future, ready to be adopted by other tasks.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }
}

impl<T: 'static> Default for Future<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Task for Future<T> {
    fn core(&self) -> &TaskCore {
        &self.core
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("core", &self.core)
            .field("result", &self.result.borrow())
            .finish()
    }
}

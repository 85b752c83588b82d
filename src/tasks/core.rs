//! # Per-instance task state.
//!
//! [`TaskCore`] is what every task type embeds: the running flag, the
//! transaction scope its events fire through, the recorded failure, the
//! adopted children and the bound `on_failure` channel.
//!
//! ## Invariants
//! - `running` goes from `true` to `false` exactly once
//! - `exception` is only written while running, by `on_failure`
//! - adopted children are held weakly; the core never keeps a child alive

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::TaskConfig;
use crate::error::{Error, Failure, Result};
use crate::events::{Event, EventSource, Transaction};
use crate::tasks::Task;

/// State shared by all task types.
pub struct TaskCore {
    name: Cow<'static, str>,
    running: Cell<bool>,
    transaction: Transaction,
    exception: RefCell<Option<Failure>>,
    adopted: RefCell<Vec<Weak<dyn Task>>>,
    on_failure: Event<Failure>,
}

impl TaskCore {
    /// Creates a running core with the given name and default settings.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_config(TaskConfig::named(name))
    }

    /// Creates a running core from `config`.
    pub fn with_config(config: TaskConfig) -> Self {
        Self {
            running: Cell::new(true),
            transaction: Transaction::new(),
            exception: RefCell::new(None),
            adopted: RefCell::new(Vec::new()),
            on_failure: Event::new("on_failure"),
            name: config.name,
        }
    }

    /// Task name used in errors and log records.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound `on_failure` channel.
    #[inline]
    pub fn failure_event(&self) -> &Event<Failure> {
        &self.on_failure
    }

    /// Number of children adopted so far (stopped or dropped ones included).
    pub fn adopted_count(&self) -> usize {
        self.adopted.borrow().len()
    }

    /// Flips `running` to `false`.
    ///
    /// # Errors
    /// [`Error::InvalidState`] if the task was already stopped.
    pub(crate) fn mark_stopped(&self) -> Result<()> {
        if !self.running.replace(false) {
            return Err(Error::invalid_state(&self.name, "stop"));
        }
        Ok(())
    }

    /// Fails with [`Error::InvalidState`] unless the task is running.
    pub(crate) fn ensure_running(&self, operation: &'static str) -> Result<()> {
        if self.running.get() {
            Ok(())
        } else {
            Err(Error::invalid_state(&self.name, operation))
        }
    }

    /// Fails with [`Error::Precondition`] unless the task has stopped.
    pub(crate) fn ensure_stopped(&self, field: &'static str) -> Result<()> {
        if self.running.get() {
            Err(Error::precondition(&self.name, field, "task is still running"))
        } else {
            Ok(())
        }
    }

    pub(crate) fn record_exception(&self, failure: Failure) {
        *self.exception.borrow_mut() = Some(failure);
    }

    pub(crate) fn exception(&self) -> Option<Failure> {
        self.exception.borrow().clone()
    }

    pub(crate) fn has_exception(&self) -> bool {
        self.exception.borrow().is_some()
    }

    pub(crate) fn push_adopted(&self, child: Weak<dyn Task>) {
        self.adopted.borrow_mut().push(child);
    }

    /// Adopted children that are still alive, in adoption order.
    pub(crate) fn adopted(&self) -> Vec<Rc<dyn Task>> {
        self.adopted
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl EventSource for TaskCore {
    #[inline]
    fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    #[inline]
    fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Default for TaskCore {
    fn default() -> Self {
        Self::with_config(TaskConfig::default())
    }
}

impl fmt::Debug for TaskCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCore")
            .field("name", &self.name)
            .field("running", &self.running.get())
            .field("failed", &self.has_exception())
            .field("adopted", &self.adopted.borrow().len())
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_core_is_running_and_idle() {
        let core = TaskCore::new("fetch");
        assert_eq!(core.name(), "fetch");
        assert!(core.is_running());
        assert!(!core.transaction().is_active());
        assert!(!core.failure_event().has_subscribers());
        assert_eq!(core.adopted_count(), 0);
    }

    #[test]
    fn test_mark_stopped_only_once() {
        let core = TaskCore::default();
        core.mark_stopped().unwrap();
        assert!(!core.is_running());
        assert!(matches!(
            core.mark_stopped(),
            Err(Error::InvalidState { operation: "stop", .. })
        ));
    }

    #[test]
    fn test_guards_follow_running_flag() {
        let core = TaskCore::default();
        assert!(core.ensure_running("on_failure").is_ok());
        assert!(matches!(
            core.ensure_stopped("failed"),
            Err(Error::Precondition { field: "failed", .. })
        ));

        core.mark_stopped().unwrap();
        assert!(core.ensure_stopped("failed").is_ok());
        assert!(matches!(
            core.ensure_running("on_failure"),
            Err(Error::InvalidState { operation: "on_failure", .. })
        ));
    }

    #[test]
    fn test_debug_shows_state() {
        let core = TaskCore::new("inspect");
        let text = format!("{core:?}");
        assert!(text.contains("\"inspect\""));
        assert!(text.contains("running: true"));
    }
}

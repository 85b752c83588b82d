//! # Per-task configuration.
//!
//! Provides [`TaskConfig`], the settings a [`TaskCore`](crate::TaskCore) is built from.

use std::borrow::Cow;

/// Configuration for a single task instance.
///
/// ## Field semantics
/// - `name`: label used in errors and log records
#[derive(Clone, Debug)]
pub struct TaskConfig {
    /// Human-readable task name.
    pub name: Cow<'static, str>,
}

impl TaskConfig {
    /// Creates a configuration with the given name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TaskConfig {
    /// Default configuration:
    ///
    /// - `name = "task"`
    fn default() -> Self {
        Self::named("task")
    }
}

//! # Task lifecycle types.
//!
//! This module provides the task-related types:
//! - [`TaskCore`] - per-instance state every task embeds
//! - [`Task`] - lifecycle trait (stop, failure, adoption)
//! - [`Future`] - task completing with a result value
//! - [`stop_task`] - stop an optional task if it is still running

mod core;
mod future;
mod task;

pub use self::core::TaskCore;
pub use future::Future;
pub use task::{Task, stop_task};

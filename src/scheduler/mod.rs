//! Wall-clock scheduler for the event cache refreshes.
//!
//! Three built-in tasks keep the cache current: a midnight refresh of both
//! fields, a 09:00 refresh of today's events and a first-of-month refresh of
//! the month's events.

pub mod runner;
pub mod tasks;

pub use runner::{RunLog, Scheduler, TaskExecutor};
pub use tasks::{RefreshTarget, Schedule, ScheduledTask, TaskResult, TaskRunRecord};

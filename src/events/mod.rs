//! Event core: recurrence math, today/month classification, countdown
//! views and the refreshed in-memory cache that serves them.

pub mod cache;
pub mod classify;
pub mod recurrence;
pub mod upcoming;

pub use cache::EventCache;
pub use classify::{Classified, classify, classify_month, classify_today};
pub use recurrence::{Occurrence, next_occurrence};
pub use upcoming::upcoming_events;

//! Bat: team birthday and work-anniversary tracker.
//!
//! Keeps an employee directory in SQLite and answers "who has an event today",
//! "who has an event this month" and "how many days until each birthday or
//! anniversary".
//!
//! # Architecture
//!
//! - **Store**: `rusqlite` behind the async [`store::Store`] trait
//! - **Event core**: recurrence math and today/month classification ([`events`])
//! - **Cache**: [`events::EventCache`], refreshed by the wall-clock [`scheduler`]
//!   at midnight, 09:00 and on the first of each month
//! - **HTTP**: axum routes for accounts, the directory and the event views ([`server`])

pub mod auth;
pub mod bat_dirs;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod scheduler;
pub mod server;
pub mod store;

pub use config::BatConfig;
pub use error::{BatError, Result};
pub use events::EventCache;
pub use model::{Employee, UpcomingEvent};
pub use store::{SqliteStore, Store};

//! Backing store for users and employees.
//!
//! The event core only ever reads the full employee list; the HTTP layer adds
//! inserts and user lookups. [`Store`] is the seam that lets tests substitute
//! a failing or scripted store for [`SqliteStore`].

mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::model::{Employee, User};

pub use sqlite::SqliteStore;

/// Errors raised by a [`Store`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("lock poisoned: {0}")]
    Lock(String),

    /// The blocking task running the query panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),

    /// A unique column (email) already holds this value.
    #[error("duplicate value: {0}")]
    Conflict(String),

    /// Store is unreachable (used by non-SQLite implementations).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent repository of users and employees.
#[async_trait]
pub trait Store: Send + Sync {
    /// All employees in insertion order.
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    /// Insert an employee. Fails with [`StoreError::Conflict`] on a duplicate email.
    async fn insert_employee(&self, employee: Employee) -> Result<(), StoreError>;

    /// First user registered with `username`, if any.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user. Fails with [`StoreError::Conflict`] on a duplicate email.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;
}

//! SQLite-backed [`Store`].
//!
//! The connection lives behind `Arc<Mutex<_>>` and every query runs on the
//! blocking thread pool, so awaiting a store call never stalls the runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};

use super::schema::{apply_schema, read_schema_version};
use super::{Store, StoreError};
use crate::model::{Employee, User};

/// SQLite store shared by the HTTP handlers and the event cache.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories
    /// and applying the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        apply_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Read the current schema version from the database.
    pub async fn schema_version(&self) -> Result<Option<u32>, StoreError> {
        self.with_conn(|conn| Ok(read_schema_version(conn)?)).await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, department, dob, doj, photo \
                 FROM employees ORDER BY seq ASC",
            )?;
            let rows = stmt.query_map([], row_to_employee)?;

            let mut employees = Vec::new();
            for row in rows {
                employees.push(row?);
            }
            Ok(employees)
        })
        .await
    }

    async fn insert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO employees (id, name, email, department, dob, doj, photo, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    employee.id,
                    employee.name,
                    employee.email,
                    employee.department,
                    employee.dob,
                    employee.doj,
                    employee.photo,
                    now_epoch_secs(),
                ],
            )
            .map_err(|e| conflict_or(e, &employee.email))?;
            Ok(())
        })
        .await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let username = username.to_owned();
        self.with_conn(move |conn| {
            let user = conn
                .query_row(
                    "SELECT id, username, email, password_hash FROM users \
                     WHERE username = ?1 ORDER BY created_at ASC, rowid ASC LIMIT 1",
                    params![username],
                    row_to_user,
                )
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password_hash, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    now_epoch_secs(),
                ],
            )
            .map_err(|e| conflict_or(e, &user.email))?;
            Ok(())
        })
        .await
    }
}

fn conflict_or(err: rusqlite::Error, value: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _) if code.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(value.to_owned())
        }
        _ => StoreError::Sqlite(err),
    }
}

fn row_to_employee(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department: row.get(3)?,
        dob: row.get(4)?,
        doj: row.get(5)?,
        photo: row.get(6)?,
    })
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

//! Store outages: on-demand views fail with 500, cached views stay up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bat::model::{Employee, User};
use bat::store::{SqliteStore, Store, StoreError};
use reqwest::StatusCode;
use serde_json::json;

use crate::helpers::{at, employee_body, names, spawn_with_store};

/// SQLite store that fails every call while `down` is set.
struct SwitchableStore {
    inner: SqliteStore,
    down: AtomicBool,
}

impl SwitchableStore {
    fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            down: AtomicBool::new(false),
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SwitchableStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.check()?;
        self.inner.list_employees().await
    }

    async fn insert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        self.check()?;
        self.inner.insert_employee(employee).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        self.inner.find_user_by_username(username).await
    }

    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.check()?;
        self.inner.insert_user(user).await
    }
}

fn down_store() -> Arc<SwitchableStore> {
    let store = SwitchableStore::new();
    store.down.store(true, Ordering::SeqCst);
    Arc::new(store)
}

#[tokio::test]
async fn on_demand_views_return_server_error() {
    let server = spawn_with_store(down_store(), at(2024, 6, 15, 12, 0)).await;

    for path in [
        "/employee",
        "/employee?search=ada",
        "/employee/birthdays",
        "/employee/anniversary",
        "/employee/events/current-month",
    ] {
        let (status, body) = server.get_json(path).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(body["message"], "Server error", "{path}");
    }
}

#[tokio::test]
async fn writes_and_logins_return_server_error() {
    let server = spawn_with_store(down_store(), at(2024, 6, 15, 12, 0)).await;

    let (status, body) = server
        .post_json("/employee", &employee_body("Ada", "1990-06-20", "2021-02-01"))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server error while adding employee");

    let (status, _) = server
        .post_json(
            "/signup",
            &json!({"username": "ada", "email": "ada@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = server
        .post_json("/login", &json!({"username": "ada", "password": "pw"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cached_views_keep_serving_during_outage() {
    let store = Arc::new(SwitchableStore::new());
    let server = spawn_with_store(
        Arc::clone(&store) as Arc<dyn Store>,
        at(2024, 6, 15, 12, 0),
    )
    .await;
    server.add_employee("Today", "1990-06-15", "2020-01-10").await;
    server.add_employee("Later", "1991-06-20", "2019-03-01").await;
    server.refresh_cache().await;

    store.down.store(true, Ordering::SeqCst);
    let now = server.state.now();
    assert!(server.state.cache.refresh_today_at(now).await.is_err());
    assert!(server.state.cache.refresh_month_at(now).await.is_err());

    let (status, today) = server.get_json("/events/today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&today), ["Today"]);

    let (status, month) = server.get_json("/events/month").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&month), ["Today", "Later"]);

    let (status, health) = server.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["today_count"], 1);

    let (status, _) = server.get_json("/employee/birthdays").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

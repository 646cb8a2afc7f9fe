//! Refreshed in-memory cache of today's and this month's events.
//!
//! Each field is replaced wholesale on refresh. Readers clone the inner `Arc`
//! and never observe a partially written list. A failed store fetch leaves the
//! previous contents in place until the next trigger.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::events::classify::{classify_month, classify_today, search_directory};
use crate::model::Employee;
use crate::scheduler::tasks::local_now;
use crate::scheduler::{RefreshTarget, ScheduledTask, TaskExecutor, TaskResult};
use crate::store::{Store, StoreError};

/// Last computed today/month event sets.
pub struct EventCache {
    store: Arc<dyn Store>,
    today: RwLock<Arc<Vec<Employee>>>,
    month: RwLock<Arc<Vec<Employee>>>,
    last_refreshed_at: RwLock<Option<NaiveDateTime>>,
}

impl EventCache {
    /// Empty cache reading from `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            today: RwLock::new(Arc::new(Vec::new())),
            month: RwLock::new(Arc::new(Vec::new())),
            last_refreshed_at: RwLock::new(None),
        }
    }

    /// Recompute today's events as of the local wall clock.
    pub async fn refresh_today(&self) -> Result<usize, StoreError> {
        self.refresh_today_at(local_now()).await
    }

    /// Recompute today's events relative to `now`. Returns the new count.
    pub async fn refresh_today_at(&self, now: NaiveDateTime) -> Result<usize, StoreError> {
        let records = self.fetch("today").await?;
        let today = classify_today(&records, now.date());
        let count = today.len();
        replace(&self.today, today);
        self.touch(now);
        info!("refreshed today's events: {count} of {} records", records.len());
        Ok(count)
    }

    /// Recompute this month's events as of the local wall clock.
    pub async fn refresh_month(&self) -> Result<usize, StoreError> {
        self.refresh_month_at(local_now()).await
    }

    /// Recompute this month's events relative to `now`. Returns the new count.
    pub async fn refresh_month_at(&self, now: NaiveDateTime) -> Result<usize, StoreError> {
        let records = self.fetch("month").await?;
        let month = classify_month(&records, now.date());
        let count = month.len();
        replace(&self.month, month);
        self.touch(now);
        info!("refreshed this month's events: {count} of {} records", records.len());
        Ok(count)
    }

    /// Run the given refreshes in order. A failed target does not skip the
    /// ones after it.
    pub async fn refresh_targets_at(
        &self,
        targets: &[RefreshTarget],
        now: NaiveDateTime,
    ) -> Vec<(RefreshTarget, Result<usize, StoreError>)> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = match target {
                RefreshTarget::Today => self.refresh_today_at(now).await,
                RefreshTarget::Month => self.refresh_month_at(now).await,
            };
            outcomes.push((*target, outcome));
        }
        outcomes
    }

    /// Records with an event today, as of the last successful refresh.
    pub fn today(&self) -> Arc<Vec<Employee>> {
        Arc::clone(&*self.today.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Records with an event this month, narrowed by name, department or email.
    pub fn month(&self, search: Option<&str>) -> Vec<Employee> {
        let month = Arc::clone(&*self.month.read().unwrap_or_else(PoisonError::into_inner));
        search_directory(&month, search)
    }

    /// Time of the last successful refresh of either field.
    pub fn last_refreshed_at(&self) -> Option<NaiveDateTime> {
        *self
            .last_refreshed_at
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, field: &str) -> Result<Vec<Employee>, StoreError> {
        self.store.list_employees().await.map_err(|e| {
            warn!("{field} refresh abandoned, keeping previous events: {e}");
            e
        })
    }

    fn touch(&self, now: NaiveDateTime) {
        *self
            .last_refreshed_at
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(now);
    }
}

fn replace(slot: &RwLock<Arc<Vec<Employee>>>, value: Vec<Employee>) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(value);
}

#[async_trait]
impl TaskExecutor for EventCache {
    async fn execute(&self, task: &ScheduledTask, now: NaiveDateTime) -> TaskResult {
        let outcomes = self.refresh_targets_at(&task.targets, now).await;

        let mut done = Vec::new();
        let mut failed = Vec::new();
        for (target, outcome) in outcomes {
            match outcome {
                Ok(count) => done.push(format!("{target:?}: {count}")),
                Err(e) => failed.push(format!("{target:?}: {e}")),
            }
        }

        if failed.is_empty() {
            TaskResult::Success(format!("refreshed {}", done.join(", ")))
        } else {
            TaskResult::Error(format!("refresh failed ({})", failed.join(", ")))
        }
    }
}

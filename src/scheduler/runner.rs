//! Scheduler background loop.
//!
//! Spawns a tokio task that sleeps until the earliest armed trigger, then
//! runs every due task in registration order. Sleeps are capped so a wall
//! clock jump (suspend, DST change, manual adjustment) is noticed within
//! [`MAX_SLEEP_SECS`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::config::ScheduleConfig;
use crate::scheduler::tasks::{
    self, ScheduledTask, TaskResult, TaskRunRecord, builtin_refresh_tasks,
};

/// Longest single sleep before the wall clock is re-read (seconds).
pub const MAX_SLEEP_SECS: u64 = 60;

/// Number of run-history entries to keep.
const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Runs a task's work.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Execute `task` for the tick at local time `now`.
    async fn execute(&self, task: &ScheduledTask, now: NaiveDateTime) -> TaskResult;
}

/// Source of "now" in local wall-clock time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Bounded run history, oldest first. Shared between the scheduler loop and
/// readers such as the health endpoint.
#[derive(Debug)]
pub struct RunLog {
    entries: Mutex<VecDeque<TaskRunRecord>>,
    limit: usize,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl RunLog {
    /// Empty log keeping at most `limit` records (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            limit: limit.max(1),
        }
    }

    /// Append `record`, dropping the oldest entries past the limit.
    pub fn push(&self, record: TaskRunRecord) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push_back(record);
        while entries.len() > self.limit {
            entries.pop_front();
        }
    }

    /// Snapshot of the retained records, oldest first.
    pub fn recent(&self) -> Vec<TaskRunRecord> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// Background scheduler that runs wall-clock triggered tasks.
pub struct Scheduler {
    /// Registered tasks, in registration order.
    tasks: Vec<ScheduledTask>,
    /// Recent run history.
    runs: Arc<RunLog>,
    executor: Arc<dyn TaskExecutor>,
    clock: Clock,
}

impl Scheduler {
    /// Create an empty scheduler that runs tasks through `executor`.
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            tasks: Vec::new(),
            runs: Arc::new(RunLog::default()),
            executor,
            clock: Arc::new(tasks::local_now),
        }
    }

    /// Record runs into `runs` instead of a private log.
    pub fn with_run_log(mut self, runs: Arc<RunLog>) -> Self {
        self.runs = runs;
        self
    }

    /// Replace the wall clock used by [`Scheduler::run`].
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Register the midnight, morning and monthly cache refresh tasks.
    pub fn with_event_refreshes(mut self, config: &ScheduleConfig) -> Self {
        for task in builtin_refresh_tasks(config) {
            self.add_task_if_missing(task);
        }
        self
    }

    /// Add (or replace) a task.
    pub fn add_task(&mut self, task: ScheduledTask) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            self.tasks.push(task);
        }
    }

    fn add_task_if_missing(&mut self, task: ScheduledTask) {
        let exists = self.tasks.iter().any(|existing| existing.id == task.id);
        if !exists {
            self.tasks.push(task);
        }
    }

    /// Returns registered tasks.
    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Handle to the run history.
    pub fn run_log(&self) -> Arc<RunLog> {
        Arc::clone(&self.runs)
    }

    /// Compute the first trigger after `now` for every unarmed task.
    pub fn arm(&mut self, now: NaiveDateTime) {
        for task in &mut self.tasks {
            task.arm(now);
            match task.next_run {
                Some(at) => debug!("task {} ({}) next fires at {at}", task.id, task.schedule),
                None => warn!("task {} has no valid trigger ({})", task.id, task.schedule),
            }
        }
    }

    /// Earliest trigger among armed tasks.
    pub fn next_wakeup(&self) -> Option<NaiveDateTime> {
        self.tasks.iter().filter_map(|t| t.next_run).min()
    }

    /// Start the scheduler background loop.
    pub fn run(mut self) -> tokio::task::JoinHandle<()> {
        let now = (self.clock)();
        self.arm(now);

        tokio::spawn(async move {
            info!("scheduler started with {} tasks", self.tasks.len());

            loop {
                let now = (self.clock)();
                let Some(next) = self.next_wakeup() else {
                    warn!("no armed scheduler tasks remain, stopping");
                    return;
                };

                if next > now {
                    let wait = (next - now)
                        .to_std()
                        .unwrap_or(Duration::ZERO)
                        .min(Duration::from_secs(MAX_SLEEP_SECS));
                    tokio::time::sleep(wait).await;
                    continue;
                }

                self.tick(now).await;
            }
        })
    }

    /// Run every task due at `now`, in registration order. Returns how many ran.
    pub async fn tick(&mut self, now: NaiveDateTime) -> usize {
        let due_ids: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.is_due(now))
            .map(|t| t.id.clone())
            .collect();

        let ran = due_ids.len();
        for task_id in due_ids {
            let task_snapshot = match self.tasks.iter().find(|t| t.id == task_id).cloned() {
                Some(task) => task,
                None => continue,
            };

            debug!("executing scheduled task: {}", task_snapshot.id);
            let started = Instant::now();
            let result = self.executor.execute(&task_snapshot, now).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let TaskResult::Error(err) = &result {
                warn!("scheduled task {} failed: {err}", task_snapshot.id);
            }

            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
                task.mark_run(now);
            }

            self.runs.push(TaskRunRecord {
                task_id: task_snapshot.id,
                fired_at: now,
                elapsed_ms,
                outcome: result.outcome(),
                summary: result.summary(),
            });
        }
        ran
    }
}

//! Scheduled task definitions and the built-in cache refresh tasks.
//!
//! Defines the [`ScheduledTask`] type, the [`Schedule`] enum for wall-clock
//! triggers and the [`RefreshTarget`]s a task recomputes.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Built-in task: midnight refresh of both caches.
pub const TASK_MIDNIGHT_REFRESH: &str = "refresh_midnight";

/// Built-in task: morning refresh of the today cache.
pub const TASK_MORNING_REFRESH: &str = "refresh_morning";

/// Built-in task: first-of-month refresh of the month cache.
pub const TASK_MONTHLY_REFRESH: &str = "refresh_monthly";

/// Months searched for a valid monthly trigger before giving up.
const MONTHLY_SEARCH_LIMIT: u32 = 48;

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// When a task fires, in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Once a day at the given hour and minute.
    Daily {
        /// Hour of day (0-23).
        hour: u8,
        /// Minute of hour (0-59).
        min: u8,
    },
    /// Once a month on the given day. Months without that day are skipped.
    Monthly {
        /// Day of month (1-31).
        day: u8,
        /// Hour of day (0-23).
        hour: u8,
        /// Minute of hour (0-59).
        min: u8,
    },
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily { hour, min } => write!(f, "daily at {hour:02}:{min:02}"),
            Self::Monthly { day, hour, min } => {
                write!(f, "monthly on day {day} at {hour:02}:{min:02}")
            }
        }
    }
}

impl Schedule {
    /// Check field ranges.
    pub fn validate(&self) -> Result<(), String> {
        let (hour, min) = match self {
            Self::Daily { hour, min } => (*hour, *min),
            Self::Monthly { day, hour, min } => {
                if !(1..=31).contains(day) {
                    return Err(format!("day {day} out of range 1-31"));
                }
                (*hour, *min)
            }
        };
        if hour > 23 {
            return Err(format!("hour {hour} out of range 0-23"));
        }
        if min > 59 {
            return Err(format!("minute {min} out of range 0-59"));
        }
        Ok(())
    }

    /// First trigger time strictly after `now`.
    ///
    /// Returns `None` for out-of-range fields.
    pub fn next_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            Self::Daily { hour, min } => {
                let today = now
                    .date()
                    .and_hms_opt(u32::from(hour), u32::from(min), 0)?;
                if today > now {
                    Some(today)
                } else {
                    today.checked_add_days(Days::new(1))
                }
            }
            Self::Monthly { day, hour, min } => {
                let (mut year, mut month) = (now.year(), now.month());
                for _ in 0..MONTHLY_SEARCH_LIMIT {
                    let candidate = NaiveDate::from_ymd_opt(year, month, u32::from(day))
                        .and_then(|d| d.and_hms_opt(u32::from(hour), u32::from(min), 0));
                    if let Some(at) = candidate.filter(|at| *at > now) {
                        return Some(at);
                    }
                    if month == 12 {
                        year += 1;
                        month = 1;
                    } else {
                        month += 1;
                    }
                }
                None
            }
        }
    }
}

/// Cache field a task recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTarget {
    /// Records with an event today.
    Today,
    /// Records with an event this calendar month.
    Month,
}

/// Outcome of executing a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully with a summary message.
    Success(String),
    /// Task failed with an error message.
    Error(String),
}

impl TaskResult {
    pub fn outcome(&self) -> TaskRunOutcome {
        match self {
            Self::Success(_) => TaskRunOutcome::Success,
            Self::Error(_) => TaskRunOutcome::Error,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Success(msg) | Self::Error(msg) => msg.clone(),
        }
    }
}

/// Run outcome kept in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRunOutcome {
    Success,
    Error,
}

/// One entry of the scheduler's [`RunLog`](super::runner::RunLog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunRecord {
    pub task_id: String,
    /// Wall-clock time of the tick that ran the task.
    pub fired_at: NaiveDateTime,
    pub elapsed_ms: u64,
    pub outcome: TaskRunOutcome,
    pub summary: String,
}

/// A task that runs on a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique task identifier (e.g. `"refresh_midnight"`).
    pub id: String,
    /// Human-readable task name.
    pub name: String,
    /// When to run this task.
    pub schedule: Schedule,
    /// Cache fields recomputed on each run, in order.
    pub targets: Vec<RefreshTarget>,
    /// Last time the task ran, if any.
    pub last_run: Option<NaiveDateTime>,
    /// Next trigger time; `None` until the scheduler arms the task.
    pub next_run: Option<NaiveDateTime>,
}

impl ScheduledTask {
    /// Create a new unarmed task.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        schedule: Schedule,
        targets: Vec<RefreshTarget>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schedule,
            targets,
            last_run: None,
            next_run: None,
        }
    }

    /// Compute the first trigger after `now` if not yet armed.
    pub fn arm(&mut self, now: NaiveDateTime) {
        if self.next_run.is_none() {
            self.next_run = self.schedule.next_after(now);
        }
    }

    /// Returns `true` if the task is armed and its trigger time has passed.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_run.is_some_and(|at| at <= now)
    }

    /// Record a run at `now` and move the trigger to the next slot after it.
    ///
    /// Triggers missed while the process was suspended collapse into this run.
    pub fn mark_run(&mut self, now: NaiveDateTime) {
        self.last_run = Some(now);
        self.next_run = self.schedule.next_after(now);
    }
}

/// The three cache refresh tasks, in registration order.
pub fn builtin_refresh_tasks(config: &crate::config::ScheduleConfig) -> Vec<ScheduledTask> {
    vec![
        ScheduledTask::new(
            TASK_MIDNIGHT_REFRESH,
            "Refresh today and month events",
            config.midnight_refresh.clone(),
            vec![RefreshTarget::Today, RefreshTarget::Month],
        ),
        ScheduledTask::new(
            TASK_MORNING_REFRESH,
            "Refresh today's events",
            config.morning_refresh.clone(),
            vec![RefreshTarget::Today],
        ),
        ScheduledTask::new(
            TASK_MONTHLY_REFRESH,
            "Refresh this month's events",
            config.monthly_refresh.clone(),
            vec![RefreshTarget::Month],
        ),
    ]
}

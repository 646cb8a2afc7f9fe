//! Cached today/month views, countdown views and scheduled refreshes.

use std::sync::Arc;

use bat::config::ScheduleConfig;
use bat::scheduler::{Scheduler, TaskExecutor};
use reqwest::StatusCode;
use serde_json::json;

use crate::helpers::{at, names, spawn_server};

#[tokio::test]
async fn cached_views_are_empty_until_refreshed() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Today", "2024-06-15", "2020-01-10").await;

    let (status, today) = server.get_json("/events/today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today, json!([]));

    let (_, health) = server.get_json("/health").await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["today_count"], 0);
    assert!(health["last_refreshed_at"].is_null());
    assert_eq!(health["recent_runs"], json!([]));
}

#[tokio::test]
async fn refreshed_views_split_today_and_month() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Today", "2024-06-15", "2020-01-10").await;
    server.add_employee("Later", "1990-06-20", "2019-03-01").await;
    server.add_employee("Joined", "1988-02-02", "2015-06-15").await;
    server.add_employee("Other", "1991-08-08", "2018-09-09").await;
    server.refresh_cache().await;

    let (_, today) = server.get_json("/events/today").await;
    assert_eq!(names(&today), ["Today", "Joined"]);

    let (_, month) = server.get_json("/events/month").await;
    assert_eq!(names(&month), ["Today", "Later", "Joined"]);

    let (_, health) = server.get_json("/health").await;
    assert_eq!(health["today_count"], 2);
    assert_eq!(health["month_count"], 3);
    assert_eq!(health["last_refreshed_at"], "2024-06-15T12:00:00");
}

#[tokio::test]
async fn month_search_covers_name_department_and_email() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Ada Lovelace", "1990-06-20", "2021-02-01").await;
    server.add_employee("Grace Hopper", "1985-06-09", "2019-07-01").await;
    server.refresh_cache().await;

    let (_, hits) = server.get_json("/events/month?search=lovelace").await;
    assert_eq!(names(&hits), ["Ada Lovelace"]);

    let (_, hits) = server.get_json("/events/month?search=ENGINEERING").await;
    assert_eq!(names(&hits), ["Ada Lovelace", "Grace Hopper"]);

    let (_, hits) = server.get_json("/events/month?search=grace.hopper@").await;
    assert_eq!(names(&hits), ["Grace Hopper"]);
}

#[tokio::test]
async fn cache_does_not_see_new_employees_until_next_refresh() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.refresh_cache().await;
    server.add_employee("Today", "2024-06-15", "2020-01-10").await;

    let (_, today) = server.get_json("/events/today").await;
    assert_eq!(today, json!([]));

    server.refresh_cache().await;
    let (_, today) = server.get_json("/events/today").await;
    assert_eq!(names(&today), ["Today"]);
}

#[tokio::test]
async fn birthdays_count_down_in_ascending_order() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("New Year", "1980-01-01", "2010-05-05").await;
    server.add_employee("Soon", "1990-06-20", "2011-05-05").await;
    server.add_employee("Now", "1985-06-15", "2012-05-05").await;

    let (status, rows) = server.get_json("/employee/birthdays").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&rows), ["Now", "Soon", "New Year"]);

    let days: Vec<i64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["daysLeft"].as_i64().unwrap())
        .collect();
    assert_eq!(days, [0, 5, 200]);

    assert_eq!(rows[0]["dob"], "1985-06-15");
    assert!(rows[0].get("doj").is_none());
}

#[tokio::test]
async fn birthday_on_new_years_day_is_one_day_from_year_end() {
    let server = spawn_server(at(2024, 12, 31, 18, 30)).await;
    server.add_employee("New Year", "1985-01-01", "2010-05-05").await;

    let (_, rows) = server.get_json("/employee/birthdays").await;
    assert_eq!(rows[0]["daysLeft"], 1);
}

#[tokio::test]
async fn anniversaries_filter_by_name() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Ada Lovelace", "1990-01-01", "2021-06-16").await;
    server.add_employee("Grace Hopper", "1985-01-01", "2019-06-15").await;

    let (_, rows) = server.get_json("/employee/anniversary").await;
    assert_eq!(names(&rows), ["Grace Hopper", "Ada Lovelace"]);
    assert_eq!(rows[0]["doj"], "2019-06-15");
    assert!(rows[0].get("dob").is_none());

    let (_, rows) = server.get_json("/employee/anniversary?search=ada").await;
    assert_eq!(names(&rows), ["Ada Lovelace"]);
    assert_eq!(rows[0]["daysLeft"], 1);
}

#[tokio::test]
async fn scheduled_midnight_refresh_updates_served_cache() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Tomorrow", "1990-06-16", "2020-01-10").await;
    server.refresh_cache().await;

    let (_, today) = server.get_json("/events/today").await;
    assert_eq!(today, json!([]));

    let mut scheduler =
        Scheduler::new(Arc::clone(&server.state.cache) as Arc<dyn TaskExecutor>)
            .with_run_log(Arc::clone(&server.state.runs))
            .with_event_refreshes(&ScheduleConfig::default());
    scheduler.arm(at(2024, 6, 15, 12, 0));
    assert_eq!(scheduler.tick(at(2024, 6, 16, 0, 0)).await, 1);

    let (_, today) = server.get_json("/events/today").await;
    assert_eq!(names(&today), ["Tomorrow"]);

    let (_, health) = server.get_json("/health").await;
    assert_eq!(health["last_refreshed_at"], "2024-06-16T00:00:00");
    let runs = health["recent_runs"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["task_id"], "refresh_midnight");
    assert_eq!(runs[0]["outcome"], "success");
    assert_eq!(runs[0]["fired_at"], "2024-06-16T00:00:00");
}

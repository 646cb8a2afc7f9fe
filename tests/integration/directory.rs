//! Employee directory and on-demand month events.

use reqwest::StatusCode;
use serde_json::json;

use crate::helpers::{at, employee_body, names, spawn_server};

#[tokio::test]
async fn created_employee_is_listed_with_defaults() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    let (status, body) = server
        .post_json("/employee", &employee_body("Ada Lovelace", "1990-06-20", "2021-02-01"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Employee added successfully!");

    let (status, list) = server.get_json("/employee").await;
    assert_eq!(status, StatusCode::OK);
    let employee = &list[0];
    assert_eq!(employee["name"], "Ada Lovelace");
    assert_eq!(employee["email"], "ada.lovelace@example.com");
    assert_eq!(employee["dob"], "1990-06-20");
    assert_eq!(employee["doj"], "2021-02-01");
    assert_eq!(employee["photo"], bat::model::DEFAULT_PHOTO_URL);
    assert!(employee["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn timestamp_dates_keep_their_date_part() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server
        .add_employee("Grace", "1985-01-01T00:00:00.000Z", "2020-03-15T00:00:00Z")
        .await;

    let (_, list) = server.get_json("/employee").await;
    assert_eq!(list[0]["dob"], "1985-01-01");
    assert_eq!(list[0]["doj"], "2020-03-15");
}

#[tokio::test]
async fn create_requires_every_field() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    let (status, body) = server
        .post_json(
            "/employee",
            &json!({"name": "No Dates", "email": "nd@example.com", "department": "Ops"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    let (_, list) = server.get_json("/employee").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn duplicate_employee_email_is_rejected() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Ada", "1990-06-20", "2021-02-01").await;

    let (status, body) = server
        .post_json("/employee", &employee_body("Ada", "1991-01-01", "2022-01-01"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Employee with this email already exists");
}

#[tokio::test]
async fn list_search_matches_name_only() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Ada Lovelace", "1990-06-20", "2021-02-01").await;
    server.add_employee("Grace Hopper", "1985-12-09", "2019-07-01").await;

    let (_, list) = server.get_json("/employee?search=HOP").await;
    assert_eq!(names(&list), ["Grace Hopper"]);

    // Department is not part of the directory name search.
    let (_, list) = server.get_json("/employee?search=engineering").await;
    assert_eq!(list, json!([]));

    let (_, list) = server.get_json("/employee?search=").await;
    assert_eq!(names(&list), ["Ada Lovelace", "Grace Hopper"]);
}

#[tokio::test]
async fn current_month_lists_birth_and_joining_months() {
    let server = spawn_server(at(2024, 6, 15, 12, 0)).await;
    server.add_employee("Born June", "1990-06-20", "2021-02-01").await;
    server.add_employee("Joined June", "1988-03-03", "2015-06-30").await;
    server.add_employee("Neither", "1988-03-03", "2015-09-30").await;

    let (status, body) = server.get_json("/employee/events/current-month").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["events"]), ["Born June", "Joined June"]);
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn current_month_reports_empty_month() {
    let server = spawn_server(at(2024, 11, 2, 12, 0)).await;
    server.add_employee("Born June", "1990-06-20", "2021-02-01").await;

    let (status, body) = server.get_json("/employee/events/current-month").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "No events this month", "events": []})
    );
}

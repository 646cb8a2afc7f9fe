//! Signup, login and the dashboard greeting.

use reqwest::StatusCode;
use serde_json::json;

use crate::helpers::{TestServer, at, spawn_server};

async fn server() -> TestServer {
    spawn_server(at(2024, 6, 15, 12, 0)).await
}

async fn dashboard(server: &TestServer, authorization: Option<&str>) -> (StatusCode, String) {
    let mut req = server.client.get(server.url("/dashboard"));
    if let Some(value) = authorization {
        req = req.header("Authorization", value);
    }
    let resp = req.send().await.unwrap();
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap();
    (status, body["message"].as_str().unwrap().to_owned())
}

#[tokio::test]
async fn signup_token_opens_dashboard() {
    let server = server().await;
    let (status, body) = server
        .post_json(
            "/signup",
            &json!({"username": "ada", "email": "ada@example.com", "password": "pw1"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Signup successful!");

    let token = body["token"].as_str().unwrap();
    let (status, message) = dashboard(&server, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message, "Hi ada");
}

#[tokio::test]
async fn signup_requires_every_field() {
    let server = server().await;
    for body in [
        json!({"username": "ada", "email": "ada@example.com"}),
        json!({"username": "", "email": "ada@example.com", "password": "pw"}),
        json!({}),
    ] {
        let (status, resp) = server.post_json("/signup", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp["message"], "All fields are required");
    }
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let server = server().await;
    let body = json!({"username": "ada", "email": "ada@example.com", "password": "pw"});
    let (status, _) = server.post_json("/signup", &body).await;
    assert_eq!(status, StatusCode::CREATED);

    let again = json!({"username": "other", "email": "ada@example.com", "password": "pw"});
    let (status, resp) = server.post_json("/signup", &again).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], "Email already exists");
}

#[tokio::test]
async fn login_issues_working_token() {
    let server = server().await;
    server
        .post_json(
            "/signup",
            &json!({"username": "grace", "email": "grace@example.com", "password": "hopper"}),
        )
        .await;

    let (status, body) = server
        .post_json("/login", &json!({"username": "grace", "password": "hopper"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful!");

    let token = body["token"].as_str().unwrap();
    let (status, message) = dashboard(&server, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message, "Hi grace");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let server = server().await;
    server
        .post_json(
            "/signup",
            &json!({"username": "grace", "email": "grace@example.com", "password": "hopper"}),
        )
        .await;

    for body in [
        json!({"username": "grace", "password": "wrong"}),
        json!({"username": "nobody", "password": "hopper"}),
    ] {
        let (status, resp) = server.post_json("/login", &body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
        assert_eq!(resp["message"], "Invalid credentials");
    }

    let (status, resp) = server.post_json("/login", &json!({"username": "grace"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], "All fields are required");
}

#[tokio::test]
async fn dashboard_rejects_missing_and_invalid_tokens() {
    let server = server().await;

    let (status, message) = dashboard(&server, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "No token provided");

    let (status, message) = dashboard(&server, Some("Basic abc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "No token provided");

    let (status, message) = dashboard(&server, Some("Bearer not.a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "Invalid token");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = server().await;
    let resp = server
        .client
        .post(server.url("/login"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["message"].is_string());
}

//! Signup, login and the token-protected dashboard greeting.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{debug, info};

use super::AppState;
use super::error::{ApiError, SERVER_ERROR};
use crate::auth::{Authenticator, bearer_token};
use crate::model::{User, new_id};
use crate::store::StoreError;

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SignupBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let (Some(username), Some(email), Some(password)) = (
        required(body.username.as_deref().map(str::trim)),
        required(body.email.as_deref().map(str::trim)),
        required(body.password.as_deref()),
    ) else {
        return Err(ApiError::bad_request(ALL_FIELDS_REQUIRED));
    };

    let auth = state.auth.as_ref().clone();
    let owned_password = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || auth.hash_password(&owned_password))
        .await
        .map_err(|e| ApiError::internal(SERVER_ERROR, e))?
        .map_err(|e| ApiError::internal(SERVER_ERROR, e))?;

    let user = User {
        id: new_id(),
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash,
    };
    match state.store.insert_user(user.clone()).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => return Err(ApiError::bad_request("Email already exists")),
        Err(e) => return Err(e.into()),
    }

    let token = state
        .auth
        .issue_token(&user)
        .map_err(|e| ApiError::internal(SERVER_ERROR, e))?;
    info!("registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Signup successful!", "token": token })),
    ))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let (Some(username), Some(password)) = (
        required(body.username.as_deref().map(str::trim)),
        required(body.password.as_deref()),
    ) else {
        return Err(ApiError::bad_request(ALL_FIELDS_REQUIRED));
    };

    let Some(user) = state.store.find_user_by_username(username).await? else {
        debug!("login for unknown user {username}");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let owned_password = password.to_owned();
    let encoded = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || {
        Authenticator::verify_password(&owned_password, &encoded)
    })
    .await
    .map_err(|e| ApiError::internal(SERVER_ERROR, e))?;
    if !matches {
        debug!("login with wrong password for {username}");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state
        .auth
        .issue_token(&user)
        .map_err(|e| ApiError::internal(SERVER_ERROR, e))?;

    Ok(Json(serde_json::json!({ "message": "Login successful!", "token": token })))
}

pub(crate) async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = state.auth.verify_token(token).map_err(|e| {
        debug!("rejected dashboard token: {e}");
        ApiError::unauthorized("Invalid token")
    })?;

    Ok(Json(serde_json::json!({ "message": format!("Hi {}", claims.username) })))
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

//! Employee directory endpoints and the on-demand event views.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use super::error::ApiError;
use super::{AppState, SearchQuery};
use crate::events::classify::{classify_month, search_name};
use crate::events::upcoming::upcoming_events;
use crate::model::{Employee, EventKind, NewEmployee, UpcomingEvent};
use crate::store::StoreError;

pub(crate) async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewEmployee>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let employee = body
        .into_employee()
        .ok_or_else(|| ApiError::bad_request("All fields are required"))?;
    let name = employee.name.clone();

    match state.store.insert_employee(employee).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::bad_request(
                "Employee with this email already exists",
            ));
        }
        Err(e) => return Err(ApiError::internal("Server error while adding employee", e)),
    }
    info!("added employee {name}");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Employee added successfully!" })),
    ))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let records = state.store.list_employees().await?;
    Ok(Json(search_name(&records, query.term())))
}

pub(crate) async fn current_month(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.store.list_employees().await?;
    let events = classify_month(&records, state.now().date());

    let body = if events.is_empty() {
        serde_json::json!({ "message": "No events this month", "events": [] })
    } else {
        serde_json::json!({ "events": events })
    };
    Ok(Json(body))
}

pub(crate) async fn birthdays(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UpcomingEvent>>, ApiError> {
    upcoming(&state, EventKind::Birthday, &query).await
}

pub(crate) async fn anniversaries(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UpcomingEvent>>, ApiError> {
    upcoming(&state, EventKind::Anniversary, &query).await
}

async fn upcoming(
    state: &AppState,
    kind: EventKind,
    query: &SearchQuery,
) -> Result<Json<Vec<UpcomingEvent>>, ApiError> {
    let records = state.store.list_employees().await?;
    Ok(Json(upcoming_events(
        &records,
        state.now(),
        kind,
        query.term(),
    )))
}

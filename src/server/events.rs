//! Cached today/month event views.

use axum::Json;
use axum::extract::{Query, State};

use super::{AppState, SearchQuery};
use crate::model::Employee;

/// Records with an event today, exactly as last cached.
pub(crate) async fn today(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.cache.today().as_ref().clone())
}

/// Records with an event this month, narrowed by name, department or email.
pub(crate) async fn month(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Employee>> {
    Json(state.cache.month(query.term()))
}

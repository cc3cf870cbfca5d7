use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::NewEvent;
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<NewEvent>,
) -> Result<Response, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("event name must not be empty".to_string()));
    }
    let event = state.events.create(req).await?;
    Ok(created(event, "Event created").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event {} not found", id)))?;
    Ok(success(event, "Event retrieved").into_response())
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list().await?;
    Ok(success(events, "Events retrieved").into_response())
}

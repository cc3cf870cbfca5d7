use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::NewTicket;
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<NewTicket>,
) -> Result<Response, AppError> {
    let ticket = state.tickets.create_ticket(req).await?;
    Ok(created(ticket, "Ticket created").into_response())
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let ticket = state.tickets.get_ticket(id).await?;
    Ok(success(ticket, "Ticket retrieved").into_response())
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.tickets.delete_ticket(id).await?;
    Ok(empty_success("Ticket deleted").into_response())
}

pub async fn list_event_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let tickets = state.tickets.list_by_event(event_id).await?;
    Ok(success(tickets, "Tickets retrieved").into_response())
}

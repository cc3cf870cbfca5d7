use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::models::{NewTicket, Ticket};
use crate::store::{EventStore, TicketStore};
use crate::utils::error::AppError;

/// Ticket management around the lifecycle engine: creation against an
/// existing event, lookup, and deletion of tickets not yet sold.
#[derive(Clone)]
pub struct TicketService {
    events: Arc<dyn EventStore>,
    tickets: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(events: Arc<dyn EventStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self { events, tickets }
    }

    pub async fn create_ticket(&self, new: NewTicket) -> Result<Ticket, AppError> {
        if new.price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "ticket price must be positive".to_string(),
            ));
        }
        if self.events.find_by_id(new.event_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "event {} not found",
                new.event_id
            )));
        }
        let ticket = self.tickets.create(new).await?;
        info!(ticket_id = ticket.id, event_id = ticket.event_id, "Ticket created");
        Ok(ticket)
    }

    pub async fn get_ticket(&self, id: i64) -> Result<Ticket, AppError> {
        self.tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket {} not found", id)))
    }

    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, AppError> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(AppError::NotFound(format!("event {} not found", event_id)));
        }
        self.tickets.list_by_event(event_id).await
    }

    /// A ticket attached to an order cannot be deleted; the order has
    /// to be cancelled or refunded first.
    pub async fn delete_ticket(&self, id: i64) -> Result<(), AppError> {
        if self.tickets.delete_available(id).await? {
            info!(ticket_id = id, "Ticket deleted");
            return Ok(());
        }
        match self.tickets.find_by_id(id).await? {
            Some(_) => Err(AppError::Conflict(
                "ticket is attached to an order and cannot be deleted".to_string(),
            )),
            None => Err(AppError::NotFound(format!("ticket {} not found", id))),
        }
    }
}

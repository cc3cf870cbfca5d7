use async_trait::async_trait;

use crate::models::{
    Event, NewEvent, NewOrder, NewTicket, Order, OrderStats, OrderStatus, Ticket,
};
use crate::utils::error::AppError;

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::{PgEventStore, PgOrderStore, PgTicketStore};

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, new: NewEvent) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError>;
    async fn list(&self) -> Result<Vec<Event>, AppError>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create(&self, new: NewTicket) -> Result<Ticket, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, AppError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Ticket>, AppError>;
    async fn list_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, AppError>;
    async fn list_by_order(&self, order_id: i64) -> Result<Vec<Ticket>, AppError>;

    /// Deletes the ticket only while it is still available. Returns
    /// false when no available ticket with that id was deleted.
    async fn delete_available(&self, id: i64) -> Result<bool, AppError>;
}

/// Order persistence. The compound operations are the transactional
/// boundaries of the system: each one commits or fails as a unit, so
/// ticket availability can never drift out of sync with order status.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order row and flips all referenced tickets to
    /// unavailable (attaching the order and purchaser ids) atomically.
    /// The ticket update is guarded on the availability flag: if any
    /// referenced ticket was taken by a concurrent order, the whole
    /// operation fails with `Conflict` and nothing is written.
    async fn create_with_tickets(
        &self,
        new: NewOrder,
        ticket_ids: &[i64],
    ) -> Result<Order, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError>;

    /// Compare-and-swap on the status column. Returns `None` when the
    /// order's current status no longer equals `expected` (a concurrent
    /// transition won) or the order does not exist.
    async fn set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError>;

    /// [`set_status`] plus release of every ticket referencing the
    /// order (availability restored, order/user links cleared), as one
    /// unit. `None` on a lost compare-and-swap, with nothing written.
    ///
    /// [`set_status`]: OrderStore::set_status
    async fn release_and_set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError>;

    /// Releases any still-attached tickets and removes the order row,
    /// atomically, but only while the status is one of `allowed`.
    /// Returns false when the guard failed or the order was gone.
    async fn delete_if_status(
        &self,
        id: i64,
        allowed: &[OrderStatus],
    ) -> Result<bool, AppError>;

    async fn list_all(&self) -> Result<Vec<Order>, AppError>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError>;
    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError>;
    async fn stats(&self) -> Result<OrderStats, AppError>;
}

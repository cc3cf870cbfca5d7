//! The order lifecycle engine. Stateless; all shared state lives in
//! the injected stores, so any number of concurrent instances can
//! share one database.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::models::{NewOrder, Order, OrderStats, OrderStatus, OrderWithTickets};
use crate::store::{OrderStore, TicketStore};
use crate::utils::error::AppError;

const DELETABLE: [OrderStatus; 2] = [OrderStatus::Pendiente, OrderStatus::Cancelado];

#[derive(Clone)]
pub struct OrderService {
    tickets: Arc<dyn TicketStore>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(tickets: Arc<dyn TicketStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { tickets, orders }
    }

    /// Creates a PENDIENTE order over `ticket_ids` for `user_id`.
    ///
    /// The total is the exact decimal sum of the ticket prices at this
    /// moment and is never recomputed. The order insert and the ticket
    /// assignment commit as one unit; of two concurrent calls sharing
    /// a ticket, at most one succeeds.
    pub async fn create_order(
        &self,
        user_id: i64,
        ticket_ids: &[i64],
    ) -> Result<OrderWithTickets, AppError> {
        if user_id <= 0 {
            return Err(AppError::Validation(
                "user id must be a positive integer".to_string(),
            ));
        }
        if ticket_ids.is_empty() {
            return Err(AppError::Validation(
                "an order must include at least one ticket".to_string(),
            ));
        }
        if ticket_ids.iter().any(|id| *id <= 0) {
            return Err(AppError::Validation(
                "ticket ids must be positive integers".to_string(),
            ));
        }
        let unique: BTreeSet<i64> = ticket_ids.iter().copied().collect();
        if unique.len() != ticket_ids.len() {
            return Err(AppError::Validation(
                "duplicate ticket ids in request".to_string(),
            ));
        }

        let fetched = self.tickets.find_by_ids(ticket_ids).await?;
        if fetched.len() != ticket_ids.len() {
            let found: BTreeSet<i64> = fetched.iter().map(|t| t.id).collect();
            let missing: Vec<String> = unique
                .difference(&found)
                .map(|id| id.to_string())
                .collect();
            return Err(AppError::NotFound(format!(
                "tickets not found: {}",
                missing.join(", ")
            )));
        }
        if let Some(taken) = fetched.iter().find(|t| !t.available) {
            return Err(AppError::Conflict(format!(
                "ticket {} is not available",
                taken.id
            )));
        }

        let total: Decimal = fetched.iter().map(|t| t.price).sum();
        let new = NewOrder {
            user_id,
            total,
            purchased_at: Utc::now(),
        };

        // The store re-checks availability under its transaction, so a
        // concurrent creator that slipped in after our read still loses
        // cleanly with Conflict.
        let order = self.orders.create_with_tickets(new, ticket_ids).await?;
        info!(order_id = order.id, user_id, total = %order.total, "Order created");

        self.hydrate(order).await
    }

    pub async fn get_order(&self, id: i64) -> Result<OrderWithTickets, AppError> {
        let order = self.require_order(id).await?;
        self.hydrate(order).await
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, AppError> {
        self.orders.list_all().await
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        if user_id <= 0 {
            return Err(AppError::Validation(
                "user id must be a positive integer".to_string(),
            ));
        }
        self.orders.list_by_user(user_id).await
    }

    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError> {
        self.orders.list_by_status(status).await
    }

    pub async fn stats(&self) -> Result<OrderStats, AppError> {
        self.orders.stats().await
    }

    /// Generic status transition entry point (the PUT /estado route).
    /// Dispatches to the specific operations so their conflict rules
    /// apply uniformly.
    pub async fn update_status(
        &self,
        id: i64,
        target: OrderStatus,
    ) -> Result<Order, AppError> {
        match target {
            OrderStatus::Pagado => self.pay(id).await,
            OrderStatus::Cancelado => self.cancel(id).await,
            OrderStatus::Reembolsado => self.refund(id).await,
            OrderStatus::Pendiente => {
                let order = self.require_order(id).await?;
                Err(AppError::invalid_transition(order.status, OrderStatus::Pendiente))
            }
        }
    }

    /// PENDIENTE -> PAGADO. Records the resulting state only; payment
    /// processing itself happens elsewhere.
    pub async fn pay(&self, id: i64) -> Result<Order, AppError> {
        match self
            .orders
            .set_status(id, OrderStatus::Pendiente, OrderStatus::Pagado)
            .await?
        {
            Some(order) => {
                info!(order_id = order.id, "Order paid");
                Ok(order)
            }
            None => {
                let order = self.require_order(id).await?;
                Err(AppError::invalid_transition(order.status, OrderStatus::Pagado))
            }
        }
    }

    /// PENDIENTE -> CANCELADO, releasing the attached tickets. A paid
    /// order cannot be cancelled; it must be refunded.
    pub async fn cancel(&self, id: i64) -> Result<Order, AppError> {
        let order = self.require_order(id).await?;
        match order.status {
            OrderStatus::Pagado => Err(AppError::Conflict(
                "a paid order cannot be cancelled; refund it instead".to_string(),
            )),
            OrderStatus::Pendiente => {
                match self
                    .orders
                    .release_and_set_status(id, OrderStatus::Pendiente, OrderStatus::Cancelado)
                    .await?
                {
                    Some(order) => {
                        info!(order_id = order.id, "Order cancelled, tickets released");
                        Ok(order)
                    }
                    // Lost the race; report against what actually holds now.
                    None => self.transition_conflict(id, OrderStatus::Cancelado).await,
                }
            }
            status => Err(AppError::invalid_transition(status, OrderStatus::Cancelado)),
        }
    }

    /// PAGADO -> REEMBOLSADO, releasing the attached tickets.
    pub async fn refund(&self, id: i64) -> Result<Order, AppError> {
        let order = self.require_order(id).await?;
        match order.status {
            OrderStatus::Pagado => {
                match self
                    .orders
                    .release_and_set_status(id, OrderStatus::Pagado, OrderStatus::Reembolsado)
                    .await?
                {
                    Some(order) => {
                        info!(order_id = order.id, "Order refunded, tickets released");
                        Ok(order)
                    }
                    None => self.transition_conflict(id, OrderStatus::Reembolsado).await,
                }
            }
            _ => Err(AppError::Conflict(
                "only paid orders can be refunded".to_string(),
            )),
        }
    }

    /// Removes a PENDIENTE or CANCELADO order, releasing any tickets
    /// still attached. Paid and refunded orders are never deleted.
    pub async fn delete_order(&self, id: i64) -> Result<(), AppError> {
        let order = self.require_order(id).await?;
        if !DELETABLE.contains(&order.status) {
            return Err(AppError::Conflict(
                "cannot delete a paid or refunded order".to_string(),
            ));
        }
        if self.orders.delete_if_status(id, &DELETABLE).await? {
            info!(order_id = id, "Order deleted");
            return Ok(());
        }
        // The guard failed: either a concurrent transition made the
        // order undeletable, or it is already gone.
        match self.orders.find_by_id(id).await? {
            Some(_) => Err(AppError::Conflict(
                "cannot delete a paid or refunded order".to_string(),
            )),
            None => Ok(()),
        }
    }

    async fn require_order(&self, id: i64) -> Result<Order, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))
    }

    async fn hydrate(&self, order: Order) -> Result<OrderWithTickets, AppError> {
        let tickets = self.tickets.list_by_order(order.id).await?;
        Ok(OrderWithTickets { order, tickets })
    }

    /// Builds the error for a lost release-and-transition race from the
    /// status the winner left behind.
    async fn transition_conflict(
        &self,
        id: i64,
        target: OrderStatus,
    ) -> Result<Order, AppError> {
        let order = self.require_order(id).await?;
        Err(AppError::invalid_transition(order.status, target))
    }
}

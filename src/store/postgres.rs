//! PostgreSQL-backed stores. Compound order operations run inside a
//! single transaction; the ticket-availability guard in
//! `create_with_tickets` is what makes concurrent double-sells lose.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{
    Event, NewEvent, NewOrder, NewTicket, Order, OrderStats, OrderStatus, Ticket,
};
use crate::store::{EventStore, OrderStore, TicketStore};
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, new: NewEvent) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (name, venue, description, starts_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.venue)
        .bind(&new.description)
        .bind(new.starts_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY starts_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }
}

#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn create(&self, new: NewTicket) -> Result<Ticket, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (event_id, category, price)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(new.event_id)
        .bind(new.category)
        .bind(new.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(ticket)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Ticket>, AppError> {
        let tickets =
            sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ANY($1) ORDER BY id")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;
        Ok(tickets)
    }

    async fn list_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, AppError> {
        let tickets =
            sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE event_id = $1 ORDER BY id")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(tickets)
    }

    async fn list_by_order(&self, order_id: i64) -> Result<Vec<Ticket>, AppError> {
        let tickets =
            sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE order_id = $1 ORDER BY id")
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(tickets)
    }

    async fn delete_available(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1 AND available")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_with_tickets(
        &self,
        new: NewOrder,
        ticket_ids: &[i64],
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_id, total, status, purchased_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.total)
        .bind(OrderStatus::Pendiente)
        .bind(new.purchased_at)
        .fetch_one(&mut *tx)
        .await?;

        // The availability guard: a ticket taken by a concurrent order
        // fails the WHERE clause and the row count comes up short.
        let flipped = sqlx::query(
            "UPDATE tickets
             SET available = FALSE, order_id = $1, user_id = $2, updated_at = NOW()
             WHERE id = ANY($3) AND available",
        )
        .bind(order.id)
        .bind(new.user_id)
        .bind(ticket_ids.to_vec())
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() != ticket_ids.len() as u64 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "one or more tickets are no longer available".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $1, updated_at = NOW()
             WHERE id = $2 AND status = $3
             RETURNING *",
        )
        .bind(next)
        .bind(id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn release_and_set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut tx = self.pool.begin().await?;

        // CAS first so concurrent transitions serialize on the order row.
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $1, updated_at = NOW()
             WHERE id = $2 AND status = $3
             RETURNING *",
        )
        .bind(next)
        .bind(id)
        .bind(expected)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE tickets
             SET available = TRUE, order_id = NULL, user_id = NULL, updated_at = NOW()
             WHERE order_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    async fn delete_if_status(
        &self,
        id: i64,
        allowed: &[OrderStatus],
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // Release before delete so the ticket->order reference never
        // dangles. Normally a no-op for CANCELADO orders; defensive for
        // PENDIENTE. Rolled back whole if the status guard fails below.
        sqlx::query(
            "UPDATE tickets
             SET available = TRUE, order_id = NULL, user_id = NULL, updated_at = NOW()
             WHERE order_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM orders WHERE id = $1 AND status = ANY($2)")
            .bind(id)
            .bind(allowed.to_vec())
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<Order>, AppError> {
        let orders =
            sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY purchased_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(orders)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY purchased_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE status = $1 ORDER BY purchased_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn stats(&self) -> Result<OrderStats, AppError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            "SELECT
                COUNT(*) FILTER (WHERE status = 'PENDIENTE')   AS pendientes,
                COUNT(*) FILTER (WHERE status = 'PAGADO')      AS pagadas,
                COUNT(*) FILTER (WHERE status = 'CANCELADO')   AS canceladas,
                COUNT(*) FILTER (WHERE status = 'REEMBOLSADO') AS reembolsadas,
                COALESCE(SUM(total) FILTER (WHERE status = 'PAGADO'), 0) AS total_recaudado
             FROM orders",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

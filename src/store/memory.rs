//! In-memory stores for unit tests. One mutex guards all three maps,
//! which gives the compound operations the same all-or-nothing
//! behavior as the Postgres transactions.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::models::{
    Event, NewEvent, NewOrder, NewTicket, Order, OrderStats, OrderStatus, Ticket,
};
use crate::store::{EventStore, OrderStore, TicketStore};
use crate::utils::error::AppError;

#[derive(Default)]
struct Inner {
    events: BTreeMap<i64, Event>,
    tickets: BTreeMap<i64, Ticket>,
    orders: BTreeMap<i64, Order>,
    next_event_id: i64,
    next_ticket_id: i64,
    next_order_id: i64,
}

impl Inner {
    fn release_tickets_of(&mut self, order_id: i64) {
        for ticket in self.tickets.values_mut() {
            if ticket.order_id == Some(order_id) {
                ticket.available = true;
                ticket.order_id = None;
                ticket.user_id = None;
                ticket.updated_at = Utc::now();
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, new: NewEvent) -> Result<Event, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_event_id += 1;
        let event = Event {
            id: inner.next_event_id,
            name: new.name,
            venue: new.venue,
            description: new.description,
            starts_at: new.starts_at,
            created_at: Utc::now(),
        };
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        Ok(self.inner.lock().unwrap().events.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.inner.lock().unwrap().events.values().cloned().collect())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn create(&self, new: NewTicket) -> Result<Ticket, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_ticket_id += 1;
        let now = Utc::now();
        let ticket = Ticket {
            id: inner.next_ticket_id,
            event_id: new.event_id,
            category: new.category,
            price: new.price,
            available: true,
            order_id: None,
            user_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, AppError> {
        Ok(self.inner.lock().unwrap().tickets.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Ticket>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.tickets.get(id).cloned())
            .collect())
    }

    async fn list_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_by_order(&self, order_id: i64) -> Result<Vec<Ticket>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.order_id == Some(order_id))
            .cloned()
            .collect())
    }

    async fn delete_available(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.tickets.get(&id) {
            Some(t) if t.available => {
                inner.tickets.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_with_tickets(
        &self,
        new: NewOrder,
        ticket_ids: &[i64],
    ) -> Result<Order, AppError> {
        let mut inner = self.inner.lock().unwrap();

        // Availability guard under the lock, before writing anything.
        let all_available = ticket_ids
            .iter()
            .all(|id| inner.tickets.get(id).is_some_and(|t| t.available));
        if !all_available {
            return Err(AppError::Conflict(
                "one or more tickets are no longer available".to_string(),
            ));
        }

        inner.next_order_id += 1;
        let order = Order {
            id: inner.next_order_id,
            user_id: new.user_id,
            total: new.total,
            status: OrderStatus::Pendiente,
            purchased_at: new.purchased_at,
            updated_at: new.purchased_at,
        };
        inner.orders.insert(order.id, order.clone());

        for id in ticket_ids {
            if let Some(ticket) = inner.tickets.get_mut(id) {
                ticket.available = false;
                ticket.order_id = Some(order.id);
                ticket.user_id = Some(new.user_id);
                ticket.updated_at = Utc::now();
            }
        }

        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        Ok(self.inner.lock().unwrap().orders.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = next;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn release_and_set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let updated = match inner.orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = next;
                order.updated_at = Utc::now();
                order.clone()
            }
            _ => return Ok(None),
        };
        inner.release_tickets_of(id);
        Ok(Some(updated))
    }

    async fn delete_if_status(
        &self,
        id: i64,
        allowed: &[OrderStatus],
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.get(&id) {
            Some(order) if allowed.contains(&order.status) => {
                inner.release_tickets_of(id);
                inner.orders.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_all(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.inner.lock().unwrap().orders.values().cloned().collect())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .orders
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    async fn stats(&self) -> Result<OrderStats, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut stats = OrderStats {
            pendientes: 0,
            pagadas: 0,
            canceladas: 0,
            reembolsadas: 0,
            total_recaudado: Decimal::ZERO,
        };
        for order in inner.orders.values() {
            match order.status {
                OrderStatus::Pendiente => stats.pendientes += 1,
                OrderStatus::Pagado => {
                    stats.pagadas += 1;
                    stats.total_recaudado += order.total;
                }
                OrderStatus::Cancelado => stats.canceladas += 1,
                OrderStatus::Reembolsado => stats.reembolsadas += 1,
            }
        }
        Ok(stats)
    }
}

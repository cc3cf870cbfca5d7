use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::models::ticket::Ticket;

/// Lifecycle status of an order. Stored in Postgres as the
/// `order_status` enum type.
///
/// The transition table is closed:
///
/// | From       | Allowed To         |
/// |------------|--------------------|
/// | PENDIENTE  | PAGADO, CANCELADO  |
/// | PAGADO     | REEMBOLSADO        |
/// | CANCELADO  | (terminal)         |
/// | REEMBOLSADO| (terminal)         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "order_status", rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pendiente,
    Pagado,
    Cancelado,
    Reembolsado,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "PENDIENTE",
            OrderStatus::Pagado => "PAGADO",
            OrderStatus::Cancelado => "CANCELADO",
            OrderStatus::Reembolsado => "REEMBOLSADO",
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pendiente, Pagado) | (Pendiente, Cancelado) | (Pagado, Reembolsado)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelado | OrderStatus::Reembolsado)
    }

    /// Transitions into these states hand the attached tickets back to
    /// the available pool.
    pub fn releases_tickets(self) -> bool {
        self.is_terminal()
    }
}

impl sqlx::postgres::PgHasArrayType for OrderStatus {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_order_status")
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDIENTE" => Ok(OrderStatus::Pendiente),
            "PAGADO" => Ok(OrderStatus::Pagado),
            "CANCELADO" => Ok(OrderStatus::Cancelado),
            "REEMBOLSADO" => Ok(OrderStatus::Reembolsado),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// A purchase transaction for one or more tickets by one user.
///
/// `total` is fixed at creation time as the exact sum of the attached
/// ticket prices and is never recomputed, even if prices later change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total: Decimal,
    pub status: OrderStatus,
    pub purchased_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order plus the tickets currently referencing it, as returned to
/// API clients.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithTickets {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "boletos")]
    pub tickets: Vec<Ticket>,
}

/// Row data for a not-yet-inserted order. The id is assigned by the
/// store; the status always starts as PENDIENTE.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub total: Decimal,
    pub purchased_at: DateTime<Utc>,
}

/// Aggregate counts per status plus revenue over paid orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderStats {
    pub pendientes: i64,
    pub pagadas: i64,
    pub canceladas: i64,
    pub reembolsadas: i64,
    pub total_recaudado: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "usuarioId")]
    pub usuario_id: i64,
    #[serde(rename = "boletoIds")]
    pub boleto_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub estado: String,
}

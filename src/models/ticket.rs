use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Seating category of a ticket. Stored in Postgres as the
/// `ticket_category` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "ticket_category", rename_all = "UPPERCASE")]
pub enum TicketCategory {
    Vip,
    General,
    Platino,
    Oro,
}

impl TicketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Vip => "VIP",
            TicketCategory::General => "GENERAL",
            TicketCategory::Platino => "PLATINO",
            TicketCategory::Oro => "ORO",
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VIP" => Ok(TicketCategory::Vip),
            "GENERAL" => Ok(TicketCategory::General),
            "PLATINO" => Ok(TicketCategory::Platino),
            "ORO" => Ok(TicketCategory::Oro),
            other => Err(format!("unknown ticket category '{}'", other)),
        }
    }
}

/// One purchasable admission unit for an event.
///
/// Invariant: `available` is true exactly when `order_id` and `user_id`
/// are both unset. The two assignments always change together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub event_id: i64,
    pub category: TicketCategory,
    pub price: Decimal,
    pub available: bool,
    pub order_id: Option<i64>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    #[serde(rename = "eventoId")]
    pub event_id: i64,
    #[serde(rename = "categoria")]
    pub category: TicketCategory,
    #[serde(rename = "precio")]
    pub price: Decimal,
}

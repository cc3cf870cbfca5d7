pub mod orders;
pub mod tickets;

pub use orders::OrderService;
pub use tickets::TicketService;

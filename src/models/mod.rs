pub mod event;
pub mod order;
pub mod ticket;

pub use event::{Event, NewEvent};
pub use order::{
    CreateOrderRequest, NewOrder, Order, OrderStats, OrderStatus, OrderWithTickets,
    UpdateStatusRequest,
};
pub use ticket::{NewTicket, Ticket, TicketCategory};

use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

use crate::config::{create_cors_layer, create_hardening_layer};
use crate::handlers::{events, health_check, orders, tickets};
use crate::service::{OrderService, TicketService};
use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub tickets: TicketService,
    pub orders: OrderService,
}

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/eventos", post(events::create_event).get(events::list_events))
        .route("/eventos/:id", get(events::get_event))
        .route("/eventos/:id/boletos", get(tickets::list_event_tickets))
        .route("/boletos", post(tickets::create_ticket))
        .route(
            "/boletos/:id",
            get(tickets::get_ticket).delete(tickets::delete_ticket),
        )
        .route("/ordenes", post(orders::create_order).get(orders::list_orders))
        .route("/ordenes/estadisticas", get(orders::order_stats))
        .route("/ordenes/usuario/:user_id", get(orders::list_orders_by_user))
        .route("/ordenes/estado/:estado", get(orders::list_orders_by_status))
        .route(
            "/ordenes/:id",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/ordenes/:id/estado", put(orders::update_order_status))
        .route("/ordenes/:id/pagar", post(orders::pay_order))
        .route("/ordenes/:id/cancelar", post(orders::cancel_order))
        .route("/ordenes/:id/reembolsar", post(orders::refund_order));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(create_hardening_layer())
        .layer(create_cors_layer())
        .with_state(state)
}

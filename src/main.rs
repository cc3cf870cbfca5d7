use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use boleteria_server::config::Config;
use boleteria_server::routes::{create_routes, AppState};
use boleteria_server::service::{OrderService, TicketService};
use boleteria_server::store::{EventStore, OrderStore, TicketStore};
use boleteria_server::store::{PgEventStore, PgOrderStore, PgTicketStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let events: Arc<dyn EventStore> = Arc::new(PgEventStore::new(pool.clone()));
    let tickets: Arc<dyn TicketStore> = Arc::new(PgTicketStore::new(pool.clone()));
    let orders: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(pool));

    let state = AppState {
        events: events.clone(),
        tickets: TicketService::new(events, tickets.clone()),
        orders: OrderService::new(tickets, orders),
    };

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🎟️ Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}

use std::env;

pub mod cors;
pub mod hardening;

pub use cors::create_cors_layer;
pub use hardening::create_hardening_layer;

pub struct Config {
    pub database_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3001);
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/boleteria".to_string()),
            port,
        }
    }
}

// src/main.rs
mod config;
mod handlers;
mod listing;
mod models;
mod probe;
mod storage;
mod token;
mod utils;

use actix_web::{ web, App, HttpServer };
use env_logger::Env;
use governor::RateLimiter;
use std::sync::Arc;
use storage::memory::ServerStorage;
use storage::ServerRepository;
use crate::config::Config;
use crate::utils::{AdvertiseLimiter, HeartbeatLimiter, ListLimiter};
use log::info;
use dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Get bind address and port from environment or use defaults
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind = format!("{}:{}", bind_address, port);

    let repository: Arc<dyn ServerRepository> = Arc::new(ServerStorage::new());
    let repository = web::Data::from(repository);

    // Set up rate limiters using config
    let advertise_rate_limiter = web::Data::new(AdvertiseLimiter(
        RateLimiter::keyed(config.advertise_quota()),
    ));

    let heartbeat_rate_limiter = web::Data::new(HeartbeatLimiter(
        RateLimiter::keyed(config.heartbeat_quota()),
    ));

    let server_list_rate_limiter = web::Data::new(ListLimiter(
        RateLimiter::keyed(config.server_list_quota()),
    ));

    let config = web::Data::new(config);

    info!("Starting master server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(repository.clone())
            .app_data(config.clone())
            .app_data(advertise_rate_limiter.clone())
            .app_data(heartbeat_rate_limiter.clone())
            .app_data(server_list_rate_limiter.clone())
            .route("/servers", web::get().to(handlers::servers::get_servers))
            .route("/servers", web::post().to(handlers::advertise::advertise_server))
            .route("/servers", web::put().to(handlers::heartbeat::handle_heartbeat))
    })
        .bind(&bind)?
        .run().await
}

// src/handlers/servers.rs
use actix_web::{web, HttpResponse, HttpRequest};
use log::{debug, error};
use serde::Serialize;

use crate::config::Config;
use crate::listing::live_servers;
use crate::models::server::ServerEntry;
use crate::storage::ServerRepository;
use crate::utils::{resolve_client_addr, ListLimiter, RequestError};

#[derive(Serialize)]
pub struct ServerListResponse {
    pub servers: Vec<ServerEntry>,
}

pub async fn get_servers(
    req: HttpRequest,
    repository: web::Data<dyn ServerRepository>,
    config: web::Data<Config>,
    rate_limiter: web::Data<ListLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = resolve_client_addr(&req)?;

    // Rate Limiting
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for server list for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let servers = match live_servers(repository.get_ref(), config.heartbeat_timeout_secs).await {
        Ok(servers) => servers,
        Err(e) => {
            error!("Failed to build server list: {}", e);
            return Err(e.into());
        }
    };

    debug!("Returning {} live servers", servers.len());
    Ok(HttpResponse::Ok().json(ServerListResponse { servers }))
}

// src/handlers/advertise.rs
use actix_web::{web, HttpResponse, HttpRequest};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::config::Config;
use crate::models::server::{ServerAddresses, ServerEntry};
use crate::probe::fetch_server_info;
use crate::storage::ServerRepository;
use crate::token::issue_token;
use crate::utils::{now_unix, resolve_client_addr, AdvertiseLimiter, RequestError};

#[derive(Debug, Deserialize)]
pub struct AdvertiseRequest {
    pub key: String,
    pub port: u16,
}

#[derive(Serialize)]
pub struct AdvertiseResponse {
    pub token: String,
}

pub async fn advertise_server(
    req: HttpRequest,
    body: web::Json<AdvertiseRequest>,
    repository: web::Data<dyn ServerRepository>,
    config: web::Data<Config>,
    rate_limiter: web::Data<AdvertiseLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = resolve_client_addr(&req)?;

    // Rate Limiting
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for advertise for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    // The advertise carries no metadata beyond the key and port. Everything
    // shown in listings comes from probing the address the request was
    // observed to come from, so a host can only ever register itself.
    let target = SocketAddr::new(peer_ip, body.port);
    let info = match fetch_server_info(target, &body.key, config.probe_timeout()).await {
        Ok(info) => info,
        Err(e) => {
            error!("Probe of advertised server {} failed: {}", target, e);
            return Err(e.into());
        }
    };

    let entry = ServerEntry {
        addresses: ServerAddresses::from_ip(peer_ip),
        port: body.port,
        name: info.name,
        description: info.description,
        provider: info.provider,
        version: info.version,
        requires_password: info.requires_password,
        players: info.players,
        max_players: info.max_players,
        game_info: serde_json::Value::Null,
        last_heartbeat: now_unix(),
    };
    let name = entry.name.clone();

    let token = issue_token();
    if let Err(e) = repository.upsert(&token, entry).await {
        error!("Failed to store server registration: {}", e);
        return Err(e.into());
    }

    info!("Registered \"{}\" at {}", name, target);
    Ok(HttpResponse::Ok().json(AdvertiseResponse { token }))
}

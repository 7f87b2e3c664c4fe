// src/handlers/heartbeat.rs
use actix_web::{web, HttpResponse, HttpRequest};
use log::{debug, error};
use serde::Deserialize;
use serde_json::Value;

use crate::models::server::HeartbeatUpdate;
use crate::storage::ServerRepository;
use crate::utils::{now_unix, resolve_client_addr, HeartbeatLimiter, RequestError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    #[serde(default)]
    pub token: String,
    pub players: Option<u32>,
    pub game_info: Option<Value>,
}

pub async fn handle_heartbeat(
    req: HttpRequest,
    body: web::Json<HeartbeatRequest>,
    repository: web::Data<dyn ServerRepository>,
    rate_limiter: web::Data<HeartbeatLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = resolve_client_addr(&req)?;

    // Rate Limiting
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for heartbeat for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let body = body.into_inner();
    let token = body.token.trim();
    if token.is_empty() {
        error!("Heartbeat without a token from {}", peer_ip);
        return Err(RequestError::MissingToken);
    }

    let update = HeartbeatUpdate {
        players: body.players,
        game_info: body.game_info,
    };

    let refreshed = match repository.refresh(token, update, now_unix()).await {
        Ok(refreshed) => refreshed,
        Err(e) => {
            error!("Failed to apply heartbeat: {}", e);
            return Err(e.into());
        }
    };

    // The token is the only credential a host ever holds, so a miss is an
    // authorization failure rather than a not-found.
    if !refreshed {
        error!("Heartbeat with unknown token from {}", peer_ip);
        return Err(RequestError::UnknownToken);
    }

    if let Ok(Some(entry)) = repository.get_by_token(token).await {
        debug!("Heartbeat for \"{}\" from {}", entry.name, peer_ip);
    }

    Ok(HttpResponse::Ok().finish())
}

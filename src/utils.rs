// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use std::fmt;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::probe::ProbeError;
use crate::storage::RepositoryError;

pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

// One wrapper per endpoint so each limiter occupies its own app_data slot
// instead of all three colliding on the same type.
pub struct AdvertiseLimiter(pub IpRateLimiter);
pub struct HeartbeatLimiter(pub IpRateLimiter);
pub struct ListLimiter(pub IpRateLimiter);

#[derive(Debug)]
pub enum RequestError {
    MissingClientAddress,
    ProbeNetwork(String),
    ProbeTimeout,
    ProbeProtocol(String),
    MissingToken,
    UnknownToken,
    RateLimitExceeded,
    Repository(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClientAddress => write!(f, "Failed to determine client IP"),
            Self::ProbeNetwork(e) => write!(f, "Failed to reach the advertised server: {}", e),
            Self::ProbeTimeout => write!(f, "Advertised server did not answer the info probe in time"),
            Self::ProbeProtocol(e) => write!(f, "Advertised server sent an invalid info response: {}", e),
            Self::MissingToken => write!(f, "Missing or empty token"),
            Self::UnknownToken => write!(f, "Unknown or expired token"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::Repository(e) => write!(f, "Storage failure: {}", e),
        }
    }
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::UnknownToken => {
                HttpResponse::Unauthorized().body(self.to_string())
            }
            Self::RateLimitExceeded => {
                HttpResponse::TooManyRequests().body(self.to_string())
            }
            Self::Repository(_) => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
            _ => HttpResponse::BadRequest().body(self.to_string())
        }
    }
}

impl From<ProbeError> for RequestError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Network(e) => Self::ProbeNetwork(e.to_string()),
            ProbeError::Timeout => Self::ProbeTimeout,
            ProbeError::Protocol(msg) => Self::ProbeProtocol(msg),
        }
    }
}

impl From<RepositoryError> for RequestError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err.to_string())
    }
}

// Resolves the address a request was network-observed to come from. Behind a
// reverse proxy the TCP peer is the proxy itself, so X-Forwarded-For wins
// when its first entry parses. A spoofed header cannot register someone
// else's host because the probe-back has to succeed against this address.
pub fn resolve_client_addr(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(value) = forwarded_for.to_str() {
            if let Some(first) = value.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return Ok(ip);
                }
            }
        }
    }

    match req.peer_addr() {
        Some(addr) => Ok(addr.ip()),
        None => Err(RequestError::MissingClientAddress),
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// src/models/server.rs
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerAddresses {
    #[serde(default)]
    pub v4: Vec<Ipv4Addr>,
    #[serde(default)]
    pub v6: Vec<Ipv6Addr>,
}

impl ServerAddresses {
    pub fn from_ip(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(addr) => Self { v4: vec![addr], v6: Vec::new() },
            IpAddr::V6(addr) => Self { v4: Vec::new(), v6: vec![addr] },
        }
    }
}

// One live registration. The bearer token is the registry key, not a field,
// so serialized listings can never leak it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEntry {
    pub addresses: ServerAddresses,
    pub port: u16,
    pub name: String,
    pub description: String,
    pub provider: String,
    pub version: String,
    pub requires_password: bool,
    pub players: u32,
    pub max_players: u32,
    pub game_info: serde_json::Value,
    pub last_heartbeat: u64,
}

// Fields a heartbeat may replace; anything left as None keeps its stored value.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatUpdate {
    pub players: Option<u32>,
    pub game_info: Option<serde_json::Value>,
}

// src/storage/memory.rs
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::models::server::{HeartbeatUpdate, ServerEntry};
use crate::storage::{RepositoryError, ServerRepository};

pub struct ServerStorage {
    servers: DashMap<String, ServerEntry>,
    // Heartbeat records in arrival order. A sweep drains only the records
    // that have aged past the cutoff instead of walking the whole map.
    expiry: Mutex<VecDeque<(u64, String)>>,
}

impl ServerStorage {
    pub fn new() -> Self {
        Self {
            servers: DashMap::new(),
            expiry: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for ServerStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServerRepository for ServerStorage {
    async fn upsert(&self, token: &str, entry: ServerEntry) -> Result<(), RepositoryError> {
        let stamp = entry.last_heartbeat;
        self.servers.insert(token.to_string(), entry);
        self.expiry.lock().push_back((stamp, token.to_string()));
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<ServerEntry>, RepositoryError> {
        Ok(self.servers.get(token).map(|r| r.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<ServerEntry>, RepositoryError> {
        Ok(self.servers.iter().map(|r| r.value().clone()).collect())
    }

    async fn refresh(
        &self,
        token: &str,
        update: HeartbeatUpdate,
        now: u64,
    ) -> Result<bool, RepositoryError> {
        let stamp = match self.servers.get_mut(token) {
            Some(mut entry) => {
                if let Some(players) = update.players {
                    entry.players = players;
                }
                if let Some(game_info) = update.game_info {
                    entry.game_info = game_info;
                }
                // The heartbeat stamp never moves backwards, even if the
                // wall clock does.
                if now > entry.last_heartbeat {
                    entry.last_heartbeat = now;
                }
                entry.last_heartbeat
            }
            None => return Ok(false),
        };
        self.expiry.lock().push_back((stamp, token.to_string()));
        Ok(true)
    }

    async fn remove_older_than(&self, cutoff: u64) -> Result<(), RepositoryError> {
        let mut due = Vec::new();
        {
            let mut expiry = self.expiry.lock();
            while expiry.front().map_or(false, |(stamp, _)| *stamp < cutoff) {
                if let Some((_, token)) = expiry.pop_front() {
                    due.push(token);
                }
            }
        }

        let mut removed = 0;
        for token in due {
            // A due record is stale evidence if the entry has been refreshed
            // since it was queued; only drop entries that are still old.
            if self
                .servers
                .remove_if(&token, |_, entry| entry.last_heartbeat < cutoff)
                .is_some()
            {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("Swept {} stale server(s)", removed);
        }
        Ok(())
    }
}

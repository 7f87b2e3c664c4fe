// src/storage/mod.rs
pub mod memory;

use async_trait::async_trait;
use std::fmt;

use crate::models::server::{HeartbeatUpdate, ServerEntry};

#[derive(Debug)]
pub struct RepositoryError(pub String);

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RepositoryError {}

// Registry contract. Entries are keyed by bearer token and written as whole
// records, so a concurrent reader sees either the old record or the new one,
// never a mix. `refresh` is the only read-modify-write and must be atomic
// per token.
#[async_trait]
pub trait ServerRepository: Send + Sync {
    async fn upsert(&self, token: &str, entry: ServerEntry) -> Result<(), RepositoryError>;

    async fn get_by_token(&self, token: &str) -> Result<Option<ServerEntry>, RepositoryError>;

    async fn get_all(&self) -> Result<Vec<ServerEntry>, RepositoryError>;

    /// Applies a heartbeat to an existing entry, returning false when no
    /// entry exists for the token.
    async fn refresh(
        &self,
        token: &str,
        update: HeartbeatUpdate,
        now: u64,
    ) -> Result<bool, RepositoryError>;

    /// Deletes every entry whose last heartbeat is strictly older than
    /// `cutoff` (unix seconds).
    async fn remove_older_than(&self, cutoff: u64) -> Result<(), RepositoryError>;
}

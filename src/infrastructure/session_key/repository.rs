//! In-memory session key repository
//!
//! Backs tests and local development. The write lock serializes every
//! mutation, so `add_spent` is linearizable per key within the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::session_key::{SessionKey, SessionKeyId, SessionKeyRepository, UserId};
use crate::domain::DomainError;

/// In-memory implementation of SessionKeyRepository
#[derive(Debug, Default)]
pub struct InMemorySessionKeyRepository {
    keys: Arc<RwLock<HashMap<Uuid, SessionKey>>>,
}

impl InMemorySessionKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionKeyRepository for InMemorySessionKeyRepository {
    async fn get(&self, id: &SessionKeyId) -> Result<Option<SessionKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(&id.as_uuid()).cloned())
    }

    async fn get_by_public_key(
        &self,
        public_key: &str,
    ) -> Result<Option<SessionKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.values().find(|k| k.public_key() == public_key).cloned())
    }

    async fn create(&self, key: SessionKey) -> Result<SessionKey, DomainError> {
        let mut keys = self.keys.write().await;

        if keys.contains_key(&key.id().as_uuid()) {
            return Err(DomainError::conflict(format!(
                "Session key '{}' already exists",
                key.id()
            )));
        }

        if keys.values().any(|k| k.public_key() == key.public_key()) {
            return Err(DomainError::conflict(
                "A session key with this public key already exists",
            ));
        }

        keys.insert(key.id().as_uuid(), key.clone());
        Ok(key)
    }

    async fn mark_revoked(
        &self,
        id: &SessionKeyId,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        // Touches only the revocation fields so a spend recorded since the
        // caller's read is never clobbered by a stale snapshot
        let mut keys = self.keys.write().await;

        match keys.get_mut(&id.as_uuid()) {
            Some(key) if !key.is_revoked() => {
                key.revoke(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<SessionKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut result: Vec<SessionKey> = keys
            .values()
            .filter(|k| k.owner_id() == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(result)
    }

    async fn add_spent(
        &self,
        id: &SessionKeyId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Option<Decimal>, DomainError> {
        // Read-modify-write entirely under the exclusive lock
        let mut keys = self.keys.write().await;

        Ok(keys
            .get_mut(&id.as_uuid())
            .map(|key| key.add_spent(amount, now)))
    }

    async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut keys = self.keys.write().await;

        let mut converged = 0;
        for key in keys.values_mut() {
            if !key.is_revoked() && key.is_expired(now) {
                key.revoke(now);
                converged += 1;
            }
        }

        Ok(converged)
    }
}

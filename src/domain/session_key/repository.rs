//! Session key repository trait

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::entity::{SessionKey, SessionKeyId, UserId};
use crate::domain::DomainError;

/// Repository trait for session key storage.
///
/// Keys are retained for audit: there is deliberately no delete operation.
#[async_trait]
pub trait SessionKeyRepository: Send + Sync + Debug {
    /// Get a session key by its ID
    async fn get(&self, id: &SessionKeyId) -> Result<Option<SessionKey>, DomainError>;

    /// Get a session key by its public key (the request-time lookup)
    async fn get_by_public_key(
        &self,
        public_key: &str,
    ) -> Result<Option<SessionKey>, DomainError>;

    /// Persist a new session key.
    ///
    /// Fails with a conflict if the public key is already registered;
    /// duplicate registration is never a silent overwrite.
    async fn create(&self, key: SessionKey) -> Result<SessionKey, DomainError>;

    /// Revoke a single key, touching only the revocation fields.
    ///
    /// Deliberately not a whole-row write: a spend landing concurrently on
    /// the same key must never be overwritten by a stale snapshot. Returns
    /// false if the key is missing or already revoked.
    async fn mark_revoked(
        &self,
        id: &SessionKeyId,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// List all keys owned by `owner`, newest first, regardless of state
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<SessionKey>, DomainError>;

    /// Atomically add `amount` to a key's running spent total.
    ///
    /// The increment must be linearizable per key: two concurrent calls
    /// against the same key must never lose an update. Returns the new
    /// total, or None if the key does not exist.
    async fn add_spent(
        &self,
        id: &SessionKeyId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Option<Decimal>, DomainError>;

    /// Bulk-revoke every non-revoked key whose expiry is at or before `now`.
    /// Returns the number of keys converged.
    async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}

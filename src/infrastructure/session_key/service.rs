//! Session key lifecycle service
//!
//! Creates, lists, and revokes session keys; enforces the structural
//! invariants at creation time (expiry bounds, limit ordering, public key
//! uniqueness).

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::domain::session_key::{
    validate_new_session_key, NewSessionKey, SessionKey, SessionKeyId, SessionKeyRepository,
    SessionKeyValidationError, UserId,
};
use crate::domain::{Clock, DomainError, SystemClock};

/// Errors from registering a new session key
#[derive(Debug, Error)]
pub enum CreateKeyError {
    #[error(transparent)]
    Invalid(#[from] SessionKeyValidationError),

    #[error("a session key with this public key already exists")]
    DuplicateKey,

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Errors from revoking a session key
#[derive(Debug, Error)]
pub enum RevokeKeyError {
    #[error("session key '{0}' not found")]
    NotFound(SessionKeyId),

    #[error("you may only revoke your own session keys")]
    Forbidden,

    #[error("session key is already revoked")]
    AlreadyRevoked,

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Lifecycle manager for session keys
#[derive(Debug)]
pub struct SessionKeyService {
    repository: Arc<dyn SessionKeyRepository>,
    clock: Arc<dyn Clock>,
}

impl SessionKeyService {
    pub fn new(repository: Arc<dyn SessionKeyRepository>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source (used by tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a new session key for `owner_id`.
    ///
    /// Validation order: expiry in the future, expiry within the 90-day
    /// horizon, limits positive, per-tx ≤ cumulative, public key unique.
    /// Duplicate registration fails with a conflict, never an overwrite.
    pub async fn create(
        &self,
        owner_id: UserId,
        params: NewSessionKey,
    ) -> Result<SessionKey, CreateKeyError> {
        let now = self.clock.now();
        validate_new_session_key(&params, now)?;

        if self
            .repository
            .get_by_public_key(&params.public_key)
            .await?
            .is_some()
        {
            return Err(CreateKeyError::DuplicateKey);
        }

        let mut key = SessionKey::new(
            owner_id,
            params.public_key,
            params.scope,
            params.expires_at,
            now,
        )
        .with_limits(params.spending_limit_per_tx, params.total_spending_limit);

        if let Some(label) = params.label {
            key = key.with_label(label);
        }

        let created = self.repository.create(key).await.map_err(|e| match e {
            DomainError::Conflict { .. } => CreateKeyError::DuplicateKey,
            other => CreateKeyError::Storage(other),
        })?;

        info!(
            key_id = %created.id(),
            owner_id = %owner_id,
            scope = ?created.scope(),
            expires_at = %created.expires_at(),
            "Session key created"
        );

        Ok(created)
    }

    /// Revoke a session key. Only the owner may revoke, and a repeated
    /// revoke is rejected so callers can detect double-revocation bugs.
    pub async fn revoke(
        &self,
        id: &SessionKeyId,
        requester: &UserId,
    ) -> Result<(), RevokeKeyError> {
        let key = self
            .repository
            .get(id)
            .await?
            .ok_or(RevokeKeyError::NotFound(*id))?;

        if key.owner_id() != requester {
            return Err(RevokeKeyError::Forbidden);
        }

        if key.is_revoked() {
            return Err(RevokeKeyError::AlreadyRevoked);
        }

        // Targeted write; the read above was only for the ownership and
        // state checks. If the reaper converged the key in between, the
        // store reports no transition.
        if !self.repository.mark_revoked(id, self.clock.now()).await? {
            return Err(RevokeKeyError::AlreadyRevoked);
        }

        info!(key_id = %id, owner_id = %requester, "Session key revoked");
        Ok(())
    }

    /// List keys owned by `owner`.
    ///
    /// By default only active keys are returned; "active" is computed
    /// against the clock, so a logically expired key is excluded even
    /// before the reaper has converged its `is_revoked` flag.
    pub async fn list(
        &self,
        owner: &UserId,
        include_revoked: bool,
    ) -> Result<Vec<SessionKey>, DomainError> {
        let keys = self.repository.list_by_owner(owner).await?;

        if include_revoked {
            return Ok(keys);
        }

        let now = self.clock.now();
        Ok(keys.into_iter().filter(|k| k.is_active(now)).collect())
    }

    /// Get a key by ID (owner-agnostic; callers enforce ownership)
    pub async fn get(&self, id: &SessionKeyId) -> Result<Option<SessionKey>, DomainError> {
        self.repository.get(id).await
    }
}

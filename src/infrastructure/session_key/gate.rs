//! Request-time validation gate
//!
//! Decides allow/deny for an action submitted under a delegated key, in
//! strict order: existence, revocation, expiry, scope, per-tx limit,
//! cumulative limit. Consumed synchronously on the request path before any
//! privileged action executes; read-only and never blocking.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::domain::session_key::{DenialReason, Scope, SessionKey, SessionKeyRepository};
use crate::domain::{Clock, DomainError, SystemClock};

/// Outcome of a failed validation
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Denied(#[from] DenialReason),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Validation gate over the session key store
#[derive(Debug)]
pub struct ValidationGate {
    repository: Arc<dyn SessionKeyRepository>,
    clock: Arc<dyn Clock>,
}

impl ValidationGate {
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

    /// Look up the key for `public_key` and validate it for the requested
    /// scope and amount. Call this before executing any delegated action.
    ///
    /// Fails closed: the first failing check denies the whole action. On
    /// success returns the key so the caller can later report spend
    /// against it. Does not reserve the amount; see the ledger.
    pub async fn validate(
        &self,
        public_key: &str,
        requested: Scope,
        amount: Option<Decimal>,
    ) -> Result<SessionKey, ValidateError> {
        let key = self
            .repository
            .get_by_public_key(public_key)
            .await?
            .ok_or(DenialReason::KeyNotFound)?;

        key.authorize(requested, amount, self.clock.now())?;

        debug!(
            key_id = %key.id(),
            scope = %requested,
            amount = ?amount,
            "Session key validated"
        );

        Ok(key)
    }
}

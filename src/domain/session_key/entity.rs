//! Session key entity and related types

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Session key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKeyId(Uuid);

impl SessionKeyId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionKeyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionKeyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user that owns a session key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operations a session key may authorise.
///
/// Scopes are intentionally coarse-grained; new values are added as the
/// surrounding platform grows features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Tip,
    Transfer,
    Message,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Transfer => "transfer",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for unknown scope tags coming from storage or requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scope: '{0}'")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tip" => Ok(Self::Tip),
            "transfer" => Ok(Self::Transfer),
            "message" => Ok(Self::Message),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// Why a validation request was denied.
///
/// Checks are applied in this order and the first failure wins; any
/// ambiguity denies (fail closed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    #[error("session key not found")]
    KeyNotFound,

    #[error("session key has been revoked")]
    Revoked,

    #[error("session key has expired")]
    Expired,

    #[error("session key is not authorised for scope '{0}'")]
    ScopeDenied(Scope),

    #[error("transaction amount {amount} exceeds per-tx limit {limit}")]
    PerTxLimitExceeded { amount: Decimal, limit: Decimal },

    #[error("cumulative spending limit reached: spent {spent}, limit {limit}")]
    CumulativeLimitExceeded { spent: Decimal, limit: Decimal },
}

/// Parameters for registering a new session key
#[derive(Debug, Clone)]
pub struct NewSessionKey {
    pub public_key: String,
    pub expires_at: DateTime<Utc>,
    pub scope: HashSet<Scope>,
    pub spending_limit_per_tx: Option<Decimal>,
    pub total_spending_limit: Option<Decimal>,
    pub label: Option<String>,
}

/// A registered public key authorised to act on a user's behalf within a
/// bounded scope, lifetime, and spend.
///
/// Keys are never physically deleted; a revoked or expired key is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionKey {
    id: SessionKeyId,
    owner_id: UserId,
    /// Public key of the delegated signer, stored verbatim; never the
    /// private key. Globally unique across all users.
    public_key: String,
    /// Operations this key may authorise. Fixed at creation.
    scope: HashSet<Scope>,
    expires_at: DateTime<Utc>,
    is_revoked: bool,
    revoked_at: Option<DateTime<Utc>>,
    /// Maximum amount per single transaction. None = no per-tx limit.
    spending_limit_per_tx: Option<Decimal>,
    /// Cumulative spend cap over the key's lifetime. None = no total limit.
    total_spending_limit: Option<Decimal>,
    /// Running total of amount spent via this key.
    total_spent_amount: Decimal,
    /// Human-readable name set by the owner (e.g. "Mobile dApp")
    label: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionKey {
    /// Create a new session key owned by `owner_id`.
    ///
    /// Structural validation (expiry bounds, limit ordering) happens in the
    /// lifecycle service before this constructor runs.
    pub fn new(
        owner_id: UserId,
        public_key: impl Into<String>,
        scope: HashSet<Scope>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionKeyId::new(),
            owner_id,
            public_key: public_key.into(),
            scope,
            expires_at,
            is_revoked: false,
            revoked_at: None,
            spending_limit_per_tx: None,
            total_spending_limit: None,
            total_spent_amount: Decimal::ZERO,
            label: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the spending limits
    pub fn with_limits(
        mut self,
        per_tx: Option<Decimal>,
        total: Option<Decimal>,
    ) -> Self {
        self.spending_limit_per_tx = per_tx;
        self.total_spending_limit = total;
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Rebuild a key from stored state. Used by storage backends only.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: SessionKeyId,
        owner_id: UserId,
        public_key: String,
        scope: HashSet<Scope>,
        expires_at: DateTime<Utc>,
        is_revoked: bool,
        revoked_at: Option<DateTime<Utc>>,
        spending_limit_per_tx: Option<Decimal>,
        total_spending_limit: Option<Decimal>,
        total_spent_amount: Decimal,
        label: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            public_key,
            scope,
            expires_at,
            is_revoked,
            revoked_at,
            spending_limit_per_tx,
            total_spending_limit,
            total_spent_amount,
            label,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &SessionKeyId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn scope(&self) -> &HashSet<Scope> {
        &self.scope
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.is_revoked
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    pub fn spending_limit_per_tx(&self) -> Option<Decimal> {
        self.spending_limit_per_tx
    }

    pub fn total_spending_limit(&self) -> Option<Decimal> {
        self.total_spending_limit
    }

    pub fn total_spent_amount(&self) -> Decimal {
        self.total_spent_amount
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Status checks

    /// Check if the key is past its expiry at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Check if the key is usable at `now`: not revoked and not expired.
    ///
    /// Expiry is computed live; `is_revoked` may lag for expired keys until
    /// the reaper converges it.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired(now)
    }

    /// Decide whether this key may authorise `requested` moving `amount`.
    ///
    /// First failing check wins: revocation, expiry, scope, per-tx limit,
    /// cumulative limit. Amount checks only apply to a positive amount.
    /// Read-only: the running total is not reserved here.
    pub fn authorize(
        &self,
        requested: Scope,
        amount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(), DenialReason> {
        if self.is_revoked {
            return Err(DenialReason::Revoked);
        }

        if self.is_expired(now) {
            return Err(DenialReason::Expired);
        }

        if !self.scope.contains(&requested) {
            return Err(DenialReason::ScopeDenied(requested));
        }

        if let Some(amount) = amount.filter(|a| *a > Decimal::ZERO) {
            if let Some(limit) = self.spending_limit_per_tx {
                if amount > limit {
                    return Err(DenialReason::PerTxLimitExceeded { amount, limit });
                }
            }

            if let Some(limit) = self.total_spending_limit {
                if self.total_spent_amount + amount > limit {
                    return Err(DenialReason::CumulativeLimitExceeded {
                        spent: self.total_spent_amount,
                        limit,
                    });
                }
            }
        }

        Ok(())
    }

    // Mutators

    /// Revoke the key. Terminal: a revoked key never reactivates.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if !self.is_revoked {
            self.is_revoked = true;
            self.revoked_at = Some(now);
            self.touch(now);
        }
    }

    /// Add a completed spend to the running total and return the new total.
    ///
    /// Pure accounting: the limit check already happened at validation time.
    pub fn add_spent(&mut self, amount: Decimal, now: DateTime<Utc>) -> Decimal {
        self.total_spent_amount += amount;
        self.touch(now);
        self.total_spent_amount
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

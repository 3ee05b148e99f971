//! Request/response types for the session key endpoints

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::session_key::{NewSessionKey, Scope, SessionKey};

/// POST /v1/session-keys request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionKeyRequest {
    pub public_key: String,
    pub expires_at: DateTime<Utc>,
    pub scope: HashSet<Scope>,
    #[serde(default)]
    pub spending_limit_per_tx: Option<Decimal>,
    #[serde(default)]
    pub total_spending_limit: Option<Decimal>,
    #[serde(default)]
    pub label: Option<String>,
}

impl From<CreateSessionKeyRequest> for NewSessionKey {
    fn from(req: CreateSessionKeyRequest) -> Self {
        Self {
            public_key: req.public_key,
            expires_at: req.expires_at,
            scope: req.scope,
            spending_limit_per_tx: req.spending_limit_per_tx,
            total_spending_limit: req.total_spending_limit,
            label: req.label,
        }
    }
}

/// Session key representation on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKeyResponse {
    pub id: String,
    pub owner_id: String,
    pub public_key: String,
    pub scope: Vec<Scope>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spending_limit_per_tx: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_spending_limit: Option<Decimal>,
    pub total_spent_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionKeyResponse {
    pub fn from_domain(key: &SessionKey) -> Self {
        let mut scope: Vec<Scope> = key.scope().iter().copied().collect();
        scope.sort_by_key(|s| s.as_str());

        Self {
            id: key.id().to_string(),
            owner_id: key.owner_id().to_string(),
            public_key: key.public_key().to_string(),
            scope,
            expires_at: key.expires_at(),
            is_revoked: key.is_revoked(),
            revoked_at: key.revoked_at(),
            spending_limit_per_tx: key.spending_limit_per_tx(),
            total_spending_limit: key.total_spending_limit(),
            total_spent_amount: key.total_spent_amount(),
            label: key.label().map(str::to_string),
            created_at: key.created_at(),
            updated_at: key.updated_at(),
        }
    }
}

/// GET /v1/session-keys response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionKeyListResponse {
    pub data: Vec<SessionKeyResponse>,
    pub total: usize,
}

impl SessionKeyListResponse {
    pub fn new(data: Vec<SessionKeyResponse>) -> Self {
        let total = data.len();
        Self { data, total }
    }
}

/// Query parameters for GET /v1/session-keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSessionKeysQuery {
    #[serde(default)]
    pub include_revoked: bool,
}

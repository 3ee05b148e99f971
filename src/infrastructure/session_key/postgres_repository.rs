//! PostgreSQL session key repository implementation

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::session_key::{
    Scope, SessionKey, SessionKeyId, SessionKeyRepository, UserId,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of SessionKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresSessionKeyRepository {
    pool: PgPool,
}

impl PostgresSessionKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, owner_id, public_key, scope, expires_at, is_revoked, \
     revoked_at, spending_limit_per_tx, total_spending_limit, total_spent_amount, \
     label, created_at, updated_at";

#[async_trait]
impl SessionKeyRepository for PostgresSessionKeyRepository {
    async fn get(&self, id: &SessionKeyId) -> Result<Option<SessionKey>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM session_keys WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get session key: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_session_key(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_public_key(
        &self,
        public_key: &str,
    ) -> Result<Option<SessionKey>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM session_keys WHERE public_key = $1"
        ))
        .bind(public_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to get session key by public key: {}", e))
        })?;

        match row {
            Some(row) => Ok(Some(row_to_session_key(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, key: SessionKey) -> Result<SessionKey, DomainError> {
        let scope: Vec<String> = key.scope().iter().map(|s| s.to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO session_keys (id, owner_id, public_key, scope, expires_at,
                                      is_revoked, revoked_at, spending_limit_per_tx,
                                      total_spending_limit, total_spent_amount, label,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(key.id().as_uuid())
        .bind(key.owner_id().as_uuid())
        .bind(key.public_key())
        .bind(&scope)
        .bind(key.expires_at())
        .bind(key.is_revoked())
        .bind(key.revoked_at())
        .bind(key.spending_limit_per_tx())
        .bind(key.total_spending_limit())
        .bind(key.total_spent_amount())
        .bind(key.label())
        .bind(key.created_at())
        .bind(key.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict("A session key with this public key already exists")
            } else {
                DomainError::storage(format!("Failed to create session key: {}", e))
            }
        })?;

        Ok(key)
    }

    async fn mark_revoked(
        &self,
        id: &SessionKeyId,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        // Single targeted statement: concurrent spends on the same row are
        // never overwritten, and the flag only ever transitions to true
        let result = sqlx::query(
            r#"
            UPDATE session_keys
            SET is_revoked = TRUE, revoked_at = $2, updated_at = $2
            WHERE id = $1 AND is_revoked = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to revoke session key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<SessionKey>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM session_keys \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list session keys: {}", e)))?;

        rows.iter().map(row_to_session_key).collect()
    }

    async fn add_spent(
        &self,
        id: &SessionKeyId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Option<Decimal>, DomainError> {
        // Single-statement increment: the row lock taken by UPDATE makes
        // concurrent spends against the same key linearizable.
        let row = sqlx::query(
            r#"
            UPDATE session_keys
            SET total_spent_amount = total_spent_amount + $2, updated_at = $3
            WHERE id = $1
            RETURNING total_spent_amount
            "#,
        )
        .bind(id.as_uuid())
        .bind(amount)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to record spend: {}", e)))?;

        Ok(row.map(|r| r.get::<Decimal, _>("total_spent_amount")))
    }

    async fn revoke_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE session_keys
            SET is_revoked = TRUE, revoked_at = $1, updated_at = $1
            WHERE is_revoked = FALSE AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to revoke expired session keys: {}", e))
        })?;

        Ok(result.rows_affected())
    }
}

fn row_to_session_key(row: &sqlx::postgres::PgRow) -> Result<SessionKey, DomainError> {
    let id: Uuid = row.get("id");
    let owner_id: Uuid = row.get("owner_id");
    let public_key: String = row.get("public_key");
    let scope_tags: Vec<String> = row.get("scope");
    let expires_at: DateTime<Utc> = row.get("expires_at");
    let is_revoked: bool = row.get("is_revoked");
    let revoked_at: Option<DateTime<Utc>> = row.get("revoked_at");
    let spending_limit_per_tx: Option<Decimal> = row.get("spending_limit_per_tx");
    let total_spending_limit: Option<Decimal> = row.get("total_spending_limit");
    let total_spent_amount: Decimal = row.get("total_spent_amount");
    let label: Option<String> = row.get("label");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let scope: HashSet<Scope> = scope_tags
        .iter()
        .map(|tag| {
            tag.parse().map_err(|e| {
                DomainError::storage(format!("Invalid scope in database: {}", e))
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(SessionKey::from_parts(
        SessionKeyId::from(id),
        UserId::from(owner_id),
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
    ))
}

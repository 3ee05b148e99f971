//! Creation-time validation for session keys

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use super::entity::NewSessionKey;

/// Maximum allowed expiry from now
pub const MAX_EXPIRY_DAYS: i64 = 90;

/// Maximum length of a delegated signer public key
pub const MAX_PUBLIC_KEY_LENGTH: usize = 128;

/// Maximum length of a key label
pub const MAX_LABEL_LENGTH: usize = 100;

/// Errors that can occur when validating a session key registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionKeyValidationError {
    #[error("expires_at must be a future timestamp")]
    ExpiryNotInFuture,

    #[error("expires_at cannot exceed {MAX_EXPIRY_DAYS} days from now")]
    ExpiryBeyondHorizon,

    #[error("{field} must be a positive decimal")]
    NonPositiveLimit { field: &'static str },

    #[error("spending_limit_per_tx cannot exceed total_spending_limit")]
    LimitOrderingViolation,

    #[error("public_key must be non-empty and at most {MAX_PUBLIC_KEY_LENGTH} characters")]
    InvalidPublicKey,

    #[error("scope must contain at least one operation")]
    EmptyScope,

    #[error("label exceeds maximum length of {MAX_LABEL_LENGTH} characters")]
    LabelTooLong,
}

impl SessionKeyValidationError {
    /// Whether this is one of the expiry-bound violations
    pub fn is_expiry(&self) -> bool {
        matches!(self, Self::ExpiryNotInFuture | Self::ExpiryBeyondHorizon)
    }
}

/// Validate a registration request against `now`.
///
/// Checks run in the order the lifecycle contract specifies: expiry in the
/// future, expiry within the horizon, limits positive, per-tx not above
/// cumulative, then structural shape of key material, scope, and label.
/// Public key uniqueness is a storage concern checked by the service.
pub fn validate_new_session_key(
    params: &NewSessionKey,
    now: DateTime<Utc>,
) -> Result<(), SessionKeyValidationError> {
    if params.expires_at <= now {
        return Err(SessionKeyValidationError::ExpiryNotInFuture);
    }

    if params.expires_at > now + Duration::days(MAX_EXPIRY_DAYS) {
        return Err(SessionKeyValidationError::ExpiryBeyondHorizon);
    }

    if let Some(limit) = params.spending_limit_per_tx {
        assert_positive(limit, "spending_limit_per_tx")?;
    }

    if let Some(limit) = params.total_spending_limit {
        assert_positive(limit, "total_spending_limit")?;
    }

    if let (Some(per_tx), Some(total)) =
        (params.spending_limit_per_tx, params.total_spending_limit)
    {
        if per_tx > total {
            return Err(SessionKeyValidationError::LimitOrderingViolation);
        }
    }

    if params.public_key.is_empty() || params.public_key.len() > MAX_PUBLIC_KEY_LENGTH {
        return Err(SessionKeyValidationError::InvalidPublicKey);
    }

    if params.scope.is_empty() {
        return Err(SessionKeyValidationError::EmptyScope);
    }

    if let Some(label) = &params.label {
        if label.len() > MAX_LABEL_LENGTH {
            return Err(SessionKeyValidationError::LabelTooLong);
        }
    }

    Ok(())
}

fn assert_positive(
    value: Decimal,
    field: &'static str,
) -> Result<(), SessionKeyValidationError> {
    if value <= Decimal::ZERO {
        return Err(SessionKeyValidationError::NonPositiveLimit { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session_key::Scope;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn valid_params(now: DateTime<Utc>) -> NewSessionKey {
        NewSessionKey {
            public_key: "GBVVBBTESTKEY".to_string(),
            expires_at: now + Duration::days(30),
            scope: [Scope::Tip].into_iter().collect(),
            spending_limit_per_tx: None,
            total_spending_limit: None,
            label: None,
        }
    }

    #[test]
    fn test_valid_params_pass() {
        let now = Utc::now();
        assert!(validate_new_session_key(&valid_params(now), now).is_ok());
    }

    #[test]
    fn test_expiry_in_past_rejected() {
        let now = Utc::now();
        let mut params = valid_params(now);
        params.expires_at = now - Duration::seconds(1);

        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::ExpiryNotInFuture)
        );
    }

    #[test]
    fn test_expiry_exactly_now_rejected() {
        let now = Utc::now();
        let mut params = valid_params(now);
        params.expires_at = now;

        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::ExpiryNotInFuture)
        );
    }

    #[test]
    fn test_expiry_at_89_days_accepted() {
        let now = Utc::now();
        let mut params = valid_params(now);
        params.expires_at = now + Duration::days(89);

        assert!(validate_new_session_key(&params, now).is_ok());
    }

    #[test]
    fn test_expiry_beyond_90_days_rejected() {
        let now = Utc::now();
        let mut params = valid_params(now);
        params.expires_at = now + Duration::days(90) + Duration::seconds(1);

        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::ExpiryBeyondHorizon)
        );
    }

    #[test]
    fn test_non_positive_limits_rejected() {
        let now = Utc::now();

        let mut params = valid_params(now);
        params.spending_limit_per_tx = Some(Decimal::ZERO);
        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::NonPositiveLimit {
                field: "spending_limit_per_tx"
            })
        );

        let mut params = valid_params(now);
        params.total_spending_limit = Some(dec("-1"));
        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::NonPositiveLimit {
                field: "total_spending_limit"
            })
        );
    }

    #[test]
    fn test_limit_ordering() {
        let now = Utc::now();

        let mut params = valid_params(now);
        params.spending_limit_per_tx = Some(dec("100"));
        params.total_spending_limit = Some(dec("50"));
        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::LimitOrderingViolation)
        );

        params.spending_limit_per_tx = Some(dec("50"));
        params.total_spending_limit = Some(dec("100"));
        assert!(validate_new_session_key(&params, now).is_ok());

        // Equal limits are allowed
        params.spending_limit_per_tx = Some(dec("100"));
        assert!(validate_new_session_key(&params, now).is_ok());
    }

    #[test]
    fn test_public_key_shape() {
        let now = Utc::now();

        let mut params = valid_params(now);
        params.public_key = String::new();
        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::InvalidPublicKey)
        );

        params.public_key = "a".repeat(MAX_PUBLIC_KEY_LENGTH + 1);
        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::InvalidPublicKey)
        );

        params.public_key = "a".repeat(MAX_PUBLIC_KEY_LENGTH);
        assert!(validate_new_session_key(&params, now).is_ok());
    }

    #[test]
    fn test_empty_scope_rejected() {
        let now = Utc::now();
        let mut params = valid_params(now);
        params.scope.clear();

        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::EmptyScope)
        );
    }

    #[test]
    fn test_label_length() {
        let now = Utc::now();
        let mut params = valid_params(now);

        params.label = Some("x".repeat(MAX_LABEL_LENGTH));
        assert!(validate_new_session_key(&params, now).is_ok());

        params.label = Some("x".repeat(MAX_LABEL_LENGTH + 1));
        assert_eq!(
            validate_new_session_key(&params, now),
            Err(SessionKeyValidationError::LabelTooLong)
        );
    }
}

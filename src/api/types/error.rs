//! HTTP error envelope

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::session_key::DenialReason;
use crate::domain::DomainError;
use crate::infrastructure::session_key::{CreateKeyError, RevokeKeyError, ValidateError};

/// Machine-readable error codes exposed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    InvalidRequest,
    AuthenticationError,
    PermissionDenied,
    NotFound,
    Conflict,
    ServerError,
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: ApiErrorCode,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    code,
                    message: message.into(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorCode::AuthenticationError,
            message,
        )
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorCode::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::ServerError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::Storage { message } => Self::internal(message),
        }
    }
}

impl From<CreateKeyError> for ApiError {
    fn from(err: CreateKeyError) -> Self {
        match err {
            CreateKeyError::Invalid(e) => Self::bad_request(e.to_string()),
            CreateKeyError::DuplicateKey => Self::conflict(err.to_string()),
            CreateKeyError::Storage(e) => Self::from(e),
        }
    }
}

impl From<RevokeKeyError> for ApiError {
    fn from(err: RevokeKeyError) -> Self {
        match err {
            RevokeKeyError::NotFound(_) => Self::not_found(err.to_string()),
            RevokeKeyError::Forbidden => Self::forbidden(err.to_string()),
            RevokeKeyError::AlreadyRevoked => Self::bad_request(err.to_string()),
            RevokeKeyError::Storage(e) => Self::from(e),
        }
    }
}

impl From<ValidateError> for ApiError {
    fn from(err: ValidateError) -> Self {
        match err {
            // An unknown key is indistinguishable from bad credentials
            ValidateError::Denied(DenialReason::KeyNotFound) => {
                Self::unauthorized(err.to_string())
            }
            ValidateError::Denied(_) => Self::forbidden(err.to_string()),
            ValidateError::Storage(e) => Self::from(e),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.code, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::session_key::Scope;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid expiry");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.code, ApiErrorCode::InvalidRequest);
        assert_eq!(err.response.error.message, "Invalid expiry");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unauthorized("session key not found");
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("authentication_error"));
        assert!(json.contains("session key not found"));
    }

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        let api_err: ApiError = CreateKeyError::DuplicateKey.into();
        assert_eq!(api_err.status, StatusCode::CONFLICT);
        assert_eq!(api_err.response.error.code, ApiErrorCode::Conflict);
    }

    #[test]
    fn test_unknown_key_denial_is_unauthorized() {
        let api_err: ApiError = ValidateError::Denied(DenialReason::KeyNotFound).into();
        assert_eq!(api_err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_other_denials_are_forbidden() {
        for denial in [
            DenialReason::Revoked,
            DenialReason::Expired,
            DenialReason::ScopeDenied(Scope::Transfer),
            DenialReason::PerTxLimitExceeded {
                amount: Decimal::new(200, 0),
                limit: Decimal::new(100, 0),
            },
            DenialReason::CumulativeLimitExceeded {
                spent: Decimal::new(300, 0),
                limit: Decimal::new(300, 0),
            },
        ] {
            let api_err: ApiError = ValidateError::Denied(denial).into();
            assert_eq!(api_err.status, StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn test_revoke_error_mapping() {
        assert_eq!(
            ApiError::from(RevokeKeyError::Forbidden).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(RevokeKeyError::AlreadyRevoked).status,
            StatusCode::BAD_REQUEST
        );
    }
}

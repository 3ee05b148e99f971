//! Caller identity from the `x-user-id` header
//!
//! Authentication happens at the platform edge; by the time a request reaches
//! this service the gateway has already verified the caller and stamped their
//! id onto the request.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::session_key::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_user_id(&parts.headers).map(AuthUser)
    }
}

/// Parse the caller id out of the headers
pub fn extract_user_id(headers: &axum::http::HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::unauthorized("Authentication required: missing x-user-id"))?;

    let raw = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid x-user-id header encoding"))?
        .trim();

    let uuid = Uuid::parse_str(raw)
        .map_err(|_| ApiError::unauthorized("Invalid x-user-id header value"))?;

    Ok(UserId::from(uuid))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};

    use super::*;

    #[test]
    fn test_valid_user_id_is_extracted() {
        let uuid = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, uuid.to_string().parse().unwrap());

        let user_id = extract_user_id(&headers).unwrap();
        assert_eq!(user_id.as_uuid(), uuid);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let headers = HeaderMap::new();

        let err = extract_user_id(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_malformed_uuid_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "not-a-uuid".parse().unwrap());

        let err = extract_user_id(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}

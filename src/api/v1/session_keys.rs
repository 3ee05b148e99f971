//! Session key lifecycle endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::debug;
use uuid::Uuid;

use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, CreateSessionKeyRequest, ListSessionKeysQuery, SessionKeyListResponse,
    SessionKeyResponse,
};
use crate::domain::session_key::SessionKeyId;

/// POST /v1/session-keys
pub async fn create_session_key(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Json(request): Json<CreateSessionKeyRequest>,
) -> Result<(StatusCode, Json<SessionKeyResponse>), ApiError> {
    debug!(owner_id = %owner_id, "Registering session key");

    let key = state
        .session_key_service
        .create(owner_id, request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(SessionKeyResponse::from_domain(&key))))
}

/// GET /v1/session-keys
pub async fn list_session_keys(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Query(query): Query<ListSessionKeysQuery>,
) -> Result<Json<SessionKeyListResponse>, ApiError> {
    debug!(owner_id = %owner_id, include_revoked = query.include_revoked, "Listing session keys");

    let keys = state
        .session_key_service
        .list(&owner_id, query.include_revoked)
        .await?;

    let data = keys.iter().map(SessionKeyResponse::from_domain).collect();
    Ok(Json(SessionKeyListResponse::new(data)))
}

/// GET /v1/session-keys/{id}
pub async fn get_session_key(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionKeyResponse>, ApiError> {
    let key_id = SessionKeyId::from(id);

    let key = state
        .session_key_service
        .get(&key_id)
        .await?
        // Another owner's key is not distinguishable from a missing one
        .filter(|key| key.owner_id() == &requester)
        .ok_or_else(|| ApiError::not_found(format!("Session key '{}' not found", key_id)))?;

    Ok(Json(SessionKeyResponse::from_domain(&key)))
}

/// DELETE /v1/session-keys/{id}
pub async fn revoke_session_key(
    State(state): State<AppState>,
    AuthUser(requester): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let key_id = SessionKeyId::from(id);
    debug!(key_id = %key_id, requester = %requester, "Revoking session key");

    state.session_key_service.revoke(&key_id, &requester).await?;

    Ok(StatusCode::NO_CONTENT)
}

//! v1 API endpoints

pub mod session_keys;
pub mod transfers;

use axum::{
    Router,
    routing::{get, post},
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/session-keys",
            post(session_keys::create_session_key).get(session_keys::list_session_keys),
        )
        .route(
            "/session-keys/{id}",
            get(session_keys::get_session_key).delete(session_keys::revoke_session_key),
        )
        .route("/transfers", post(transfers::create_transfer))
}

//! Session Gate
//!
//! Authorization and spend accounting for delegated session keys:
//! - Key registration with expiry, scopes, and spending limits
//! - A validation gate enforcing revocation, expiry, scope, and limit checks
//! - A spend ledger accumulating per-key totals after privileged operations
//! - A background reaper converging expired keys to revoked

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use api::state::AppState;
use domain::session_key::SessionKeyRepository;
use infrastructure::session_key::{
    InMemorySessionKeyRepository, PostgresSessionKeyRepository, SessionKeyService, SpendLedger,
    ValidationGate,
};

/// Create the application state with all services initialized.
///
/// Also returns the repository handle so the caller can wire up background
/// work (the expiry reaper) against the same store.
pub async fn create_app_state(
    config: &AppConfig,
) -> anyhow::Result<(AppState, Arc<dyn SessionKeyRepository>)> {
    let repository: Arc<dyn SessionKeyRepository> = match &config.database.url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");
            Arc::new(PostgresSessionKeyRepository::new(pool))
        }
        None => {
            info!("No database configured, using in-memory session key store");
            Arc::new(InMemorySessionKeyRepository::new())
        }
    };

    let state = AppState::new(
        Arc::new(SessionKeyService::new(Arc::clone(&repository))),
        Arc::new(ValidationGate::new(Arc::clone(&repository))),
        Arc::new(SpendLedger::new(Arc::clone(&repository))),
    );

    Ok((state, repository))
}

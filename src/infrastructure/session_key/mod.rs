pub mod gate;
pub mod ledger;
pub mod postgres_repository;
pub mod reaper;
pub mod repository;
pub mod service;

pub use gate::{ValidateError, ValidationGate};
pub use ledger::SpendLedger;
pub use postgres_repository::PostgresSessionKeyRepository;
pub use reaper::{DEFAULT_SWEEP_INTERVAL, ExpiryReaper};
pub use repository::InMemorySessionKeyRepository;
pub use service::{CreateKeyError, RevokeKeyError, SessionKeyService};

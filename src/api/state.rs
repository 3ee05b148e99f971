//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::session_key::{SessionKeyService, SpendLedger, ValidationGate};

/// Shared handles cloned into every request handler
#[derive(Clone)]
pub struct AppState {
    pub session_key_service: Arc<SessionKeyService>,
    pub validation_gate: Arc<ValidationGate>,
    pub spend_ledger: Arc<SpendLedger>,
}

impl AppState {
    pub fn new(
        session_key_service: Arc<SessionKeyService>,
        validation_gate: Arc<ValidationGate>,
        spend_ledger: Arc<SpendLedger>,
    ) -> Self {
        Self {
            session_key_service,
            validation_gate,
            spend_ledger,
        }
    }
}

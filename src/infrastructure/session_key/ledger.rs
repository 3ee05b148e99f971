//! Spend ledger
//!
//! Records the monetary effect of a completed action against a key's
//! running total. Pure debt recognition: the limit check already happened
//! in the validation gate, and this step is called only after the external
//! action has durably succeeded.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::session_key::{SessionKeyId, SessionKeyRepository};
use crate::domain::{Clock, DomainError, SystemClock};

/// Ledger over the session key store
#[derive(Debug)]
pub struct SpendLedger {
    repository: Arc<dyn SessionKeyRepository>,
    clock: Arc<dyn Clock>,
}

impl SpendLedger {
    pub fn new(repository: Arc<dyn SessionKeyRepository>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source (used by tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record that `amount` was moved via this key. No-op for amounts that
    /// are zero or negative.
    ///
    /// The increment is linearizable per key at the storage layer, so
    /// concurrent spends never lose an update. The cumulative limit is not
    /// re-checked here.
    pub async fn record_spend(
        &self,
        id: &SessionKeyId,
        amount: Decimal,
    ) -> Result<(), DomainError> {
        if amount <= Decimal::ZERO {
            return Ok(());
        }

        match self.repository.add_spent(id, amount, self.clock.now()).await? {
            Some(new_total) => {
                debug!(key_id = %id, %amount, %new_total, "Spend recorded");
            }
            None => {
                warn!(key_id = %id, %amount, "Spend reported against unknown session key");
            }
        }

        Ok(())
    }
}

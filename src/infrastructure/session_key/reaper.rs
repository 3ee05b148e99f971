//! Expiry reaper
//!
//! Periodic sweep that converges `is_revoked` to true for keys past their
//! expiry, keeping active-key queries cheap. Belt-and-suspenders: the gate
//! and the active-list view both check expiry against the clock themselves,
//! so the reaper is never the only place expiry is enforced.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::session_key::SessionKeyRepository;
use crate::domain::{Clock, DomainError, SystemClock};

/// Default sweep interval: hourly
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Background sweeper for expired session keys
#[derive(Debug)]
pub struct ExpiryReaper {
    repository: Arc<dyn SessionKeyRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpiryReaper {
    pub fn new(repository: Arc<dyn SessionKeyRepository>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Replace the time source (used by tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the sweep interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one sweep now. Returns the number of keys converged.
    pub async fn sweep_once(&self) -> Result<u64, DomainError> {
        self.repository.revoke_expired(self.clock.now()).await
    }

    /// Spawn the periodic sweep loop. The first sweep runs immediately.
    ///
    /// The reaper only ever transitions `is_revoked` false to true, so it
    /// cannot race destructively with an owner-initiated revoke.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                match self.sweep_once().await {
                    Ok(0) => {}
                    Ok(count) => info!(count, "Auto-revoked expired session keys"),
                    Err(e) => warn!(error = %e, "Expiry sweep failed"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::domain::clock::mock::ManualClock;
    use crate::domain::session_key::{Scope, SessionKey, UserId};
    use crate::infrastructure::session_key::InMemorySessionKeyRepository;

    fn key_expiring_in(
        clock: &ManualClock,
        public_key: &str,
        expires_in: ChronoDuration,
    ) -> SessionKey {
        let now = clock.now();
        let scope: HashSet<Scope> = [Scope::Tip].into_iter().collect();
        SessionKey::new(UserId::new(), public_key, scope, now + expires_in, now)
    }

    #[tokio::test]
    async fn test_sweep_converges_expired_keys() {
        let clock = ManualClock::starting_now();
        let repo = Arc::new(InMemorySessionKeyRepository::new());

        let stale = key_expiring_in(&clock, "pk-stale", ChronoDuration::hours(1));
        let live = key_expiring_in(&clock, "pk-live", ChronoDuration::days(30));
        repo.create(stale.clone()).await.unwrap();
        repo.create(live.clone()).await.unwrap();

        let reaper = ExpiryReaper::new(Arc::clone(&repo) as Arc<dyn SessionKeyRepository>)
            .with_clock(Arc::new(clock.clone()));

        // Nothing stale yet
        assert_eq!(reaper.sweep_once().await.unwrap(), 0);

        clock.advance(ChronoDuration::hours(2));
        assert_eq!(reaper.sweep_once().await.unwrap(), 1);

        let swept = repo.get(stale.id()).await.unwrap().unwrap();
        assert!(swept.is_revoked());
        assert!(swept.revoked_at().is_some());
        assert!(!repo.get(live.id()).await.unwrap().unwrap().is_revoked());
    }

    #[tokio::test]
    async fn test_sweep_skips_already_revoked_keys() {
        let clock = ManualClock::starting_now();
        let repo = Arc::new(InMemorySessionKeyRepository::new());

        let mut key = key_expiring_in(&clock, "pk-1", ChronoDuration::hours(1));
        key.revoke(clock.now());
        let revoked_at = key.revoked_at();
        repo.create(key.clone()).await.unwrap();

        let reaper = ExpiryReaper::new(Arc::clone(&repo) as Arc<dyn SessionKeyRepository>)
            .with_clock(Arc::new(clock.clone()));

        clock.advance(ChronoDuration::days(1));
        assert_eq!(reaper.sweep_once().await.unwrap(), 0);

        // Owner-set revocation timestamp is untouched
        let stored = repo.get(key.id()).await.unwrap().unwrap();
        assert_eq!(stored.revoked_at(), revoked_at);
    }

    #[tokio::test]
    async fn test_spawned_reaper_sweeps_on_interval() {
        let clock = ManualClock::starting_now();
        let repo = Arc::new(InMemorySessionKeyRepository::new());

        let stale = key_expiring_in(&clock, "pk-stale", ChronoDuration::hours(1));
        repo.create(stale.clone()).await.unwrap();
        clock.advance(ChronoDuration::hours(2));

        let handle = ExpiryReaper::new(Arc::clone(&repo) as Arc<dyn SessionKeyRepository>)
            .with_clock(Arc::new(clock.clone()))
            .with_interval(Duration::from_millis(10))
            .spawn();

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(repo.get(stale.id()).await.unwrap().unwrap().is_revoked());
    }
}

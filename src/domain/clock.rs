//! Injected time source
//!
//! Every expiry and limit decision depends on "now", so the current time is
//! a capability handed to each component rather than an ambient call. Tests
//! drive a manual clock to simulate arbitrary instants deterministically.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

//! Domain layer - core business logic and entities

pub mod clock;
pub mod error;
pub mod session_key;

pub use clock::{Clock, SystemClock};
pub use error::DomainError;
pub use session_key::{
    validate_new_session_key, DenialReason, NewSessionKey, Scope, SessionKey, SessionKeyId,
    SessionKeyRepository, SessionKeyValidationError, UserId,
};

//! Session key domain
//!
//! Domain types and traits for delegated session keys: the entity, its
//! authorization decision, creation-time validation, and the storage trait.

mod entity;
mod repository;
mod validation;

pub use entity::{
    DenialReason, NewSessionKey, Scope, SessionKey, SessionKeyId, UnknownScope, UserId,
};
pub use repository::SessionKeyRepository;
pub use validation::{
    validate_new_session_key, SessionKeyValidationError, MAX_EXPIRY_DAYS, MAX_LABEL_LENGTH,
    MAX_PUBLIC_KEY_LENGTH,
};

#[cfg(test)]
pub use repository::mock::MockSessionKeyRepository;

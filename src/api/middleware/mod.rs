pub mod session_key;
pub mod user;

pub use session_key::DelegatedKey;
pub use user::AuthUser;

pub mod error;
pub mod session_key;
pub mod transfer;

pub use error::{ApiError, ApiErrorCode, ApiErrorResponse};
pub use session_key::{
    CreateSessionKeyRequest, ListSessionKeysQuery, SessionKeyListResponse, SessionKeyResponse,
};
pub use transfer::{TransferRequest, TransferResponse};

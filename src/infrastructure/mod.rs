//! Infrastructure layer - repository implementations and services

pub mod logging;
pub mod session_key;

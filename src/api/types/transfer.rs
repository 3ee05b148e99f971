//! Request/response types for the transfer endpoint

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// POST /v1/transfers request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to: String,
    pub amount: Decimal,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Transfer result on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub transaction_id: String,
    pub status: String,
}

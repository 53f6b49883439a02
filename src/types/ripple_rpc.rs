use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct RippleRequest<T> {
    pub method: &'static str,
    pub params: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct RippleAccountTxParams {
    pub account: String,
    pub ledger_index_min: i64,
    pub ledger_index_max: i64,
    pub forward: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RippleResponse<T> {
    pub result: T,
}

#[derive(Debug, Deserialize)]
pub struct RippleAccountTxResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub marker: Option<Value>,
    #[serde(default)]
    pub transactions: Vec<RippleTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RippleTransaction {
    #[serde(default)]
    pub meta: Option<RippleTransactionMeta>,
    #[serde(default)]
    pub tx: Option<RippleTransactionBody>,
    #[serde(default)]
    pub validated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RippleTransactionMeta {
    #[serde(default)]
    pub TransactionResult: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RippleTransactionBody {
    pub hash: String,
    #[serde(default)]
    pub TransactionType: Option<String>,
    #[serde(default)]
    pub Destination: Option<String>,
    #[serde(default)]
    pub DestinationTag: Option<u32>,
}

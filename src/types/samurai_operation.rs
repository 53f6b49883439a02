use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SamuraiOperationsHistory {
    #[serde(default)]
    pub history: Vec<SamuraiOperation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamuraiOperation {
    pub transaction_hash: String,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamuraiErc20TransfersRequest<'a> {
    pub asset_holder: &'a str,
}

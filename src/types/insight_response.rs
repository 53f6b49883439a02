use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InsightTransactionsResponse {
    #[serde(rename = "pagesTotal")]
    pub pages_total: u32,
    #[serde(default)]
    pub txs: Vec<InsightTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct InsightTransaction {
    pub txid: String,
    #[serde(default)]
    pub vin: Vec<InsightTransactionInput>,
}

#[derive(Debug, Deserialize)]
pub struct InsightTransactionInput {
    #[serde(default)]
    pub addr: Option<String>,
}

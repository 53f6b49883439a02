use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(default, alias = "BlockchainIntegrationLayerId")]
    pub blockchain_integration_layer_id: Option<String>,
    #[serde(default, alias = "Blockchain")]
    pub blockchain: Option<String>,
}

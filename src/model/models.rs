use serde::{Deserialize, Serialize};
use sqlx::{types::BigDecimal, FromRow};
use uuid::Uuid;

#[derive(Debug, FromRow, Deserialize, Serialize)]
pub struct Blockchain_Wallet {
    pub Id: i64,
    pub UserId: Uuid,
    pub Address: Option<String>,
    pub IntegrationLayerId: Option<String>,
}

#[derive(Debug, FromRow, Deserialize, Serialize)]
pub struct Bcn_Credentials {
    pub Id: i64,
    pub ClientId: Option<String>,
    pub Address: Option<String>,
    pub AssetAddress: Option<String>,
    pub AssetId: Option<String>,
}

#[derive(Debug, FromRow, Deserialize, Serialize)]
pub struct Wallet_Credentials {
    pub Id: i64,
    pub ClientId: Option<String>,
    pub MultiSig: Option<String>,
    pub ColoredMultiSig: Option<String>,
}

#[derive(Debug, FromRow, Deserialize, Serialize)]
pub struct Cash_Operation {
    pub Id: i64,
    pub ClientId: Option<String>,
    pub AssetId: Option<String>,
    pub Amount: BigDecimal,
    pub AddressFrom: Option<String>,
    pub AddressTo: Option<String>,
    pub BlockChainHash: Option<String>,
}

#[derive(Debug, FromRow, Deserialize, Serialize)]
pub struct Cashout {
    pub Id: i64,
    pub State: Option<String>,
    pub Result: Option<String>,
    pub ClientId: Uuid,
    pub BlockchainType: Option<String>,
    pub ToAddress: Option<String>,
    pub TransactionHash: Option<String>,
}

#[derive(Debug, FromRow, Deserialize, Serialize)]
pub struct Cashouts_Batch {
    pub Id: i64,
    pub BatchId: Uuid,
    pub BlockchainType: Option<String>,
    pub Cashouts: Option<String>,
    pub State: Option<String>,
}

/// Element of the JSON array stored in `Cashouts_Batch::Cashouts`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Batched_Cashout {
    pub OperationId: Uuid,
    pub ClientId: Uuid,
    pub DestinationAddress: String,
}

#[derive(Debug, Clone, FromRow, Deserialize, Serialize)]
pub struct Operation_Execution {
    pub OperationId: Uuid,
    pub State: Option<String>,
    pub Result: Option<String>,
    pub TransactionHash: Option<String>,
}

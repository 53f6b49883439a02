use async_trait::async_trait;
use sqlx::types::BigDecimal;
use tracing::warn;
use uuid::Uuid;

use crate::{
    blockchains::BlockchainsProvider,
    configuration::{AppState, State},
    error::Error,
    model::{
        Cash_Operation, KeysetContinuation, PaginatedList, Transaction,
        TransactionType,
    },
    withdrawals::WithdrawalsHistoryProvider,
};

/// Cash-out operations of the client ledger.
pub struct CashOperationsWithdrawalsHistoryProvider {
    state: AppState<State>,
}

impl CashOperationsWithdrawalsHistoryProvider {
    pub fn new(state: AppState<State>) -> CashOperationsWithdrawalsHistoryProvider {
        CashOperationsWithdrawalsHistoryProvider { state }
    }

    fn is_withdrawal(row: &Cash_Operation) -> bool {
        let filled = |value: &Option<String>| {
            value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
        };

        row.Amount < BigDecimal::from(0)
            && filled(&row.AddressTo)
            && filled(&row.BlockChainHash)
            && row.AddressTo != row.AddressFrom
            && filled(&row.AssetId)
            && filled(&row.ClientId)
    }

    async fn map(
        blockchains: &BlockchainsProvider,
        row: Cash_Operation,
    ) -> Option<Transaction> {
        if !Self::is_withdrawal(&row) {
            return None;
        }

        let blockchain = blockchains
            .get_by_asset_id(row.AssetId.as_deref()?)
            .await?;
        let client_id = row.ClientId.as_deref()?;
        let user_id = match Uuid::parse_str(client_id) {
            Ok(user_id) => user_id,
            Err(_) => {
                warn!(
                    "Cash operation {} has invalid client id '{}', skipping",
                    row.Id, client_id
                );
                return None;
            },
        };

        Some(Transaction::new(
            blockchain.crypto_currency.to_owned(),
            row.BlockChainHash?,
            user_id,
            row.AddressTo?,
            TransactionType::Withdrawal,
        ))
    }
}

#[async_trait]
impl WithdrawalsHistoryProvider for CashOperationsWithdrawalsHistoryProvider {
    fn name(&self) -> &'static str {
        "cash-operations"
    }

    async fn get_history(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<Transaction>, Error> {
        let after_id = KeysetContinuation::after_id(continuation)?;
        let limit = self.state.config.page_size;
        let rows = self
            .state
            .database()?
            .cash_operations
            .get_page(after_id, limit)
            .await?;
        let continuation = KeysetContinuation::next(
            rows.last().map(|row| row.Id),
            rows.len(),
            limit,
        )?;

        let mut transactions = Vec::new();

        for row in rows {
            if let Some(tx) = Self::map(&self.state.blockchains, row).await {
                transactions.push(tx);
            }
        }

        Ok(PaginatedList::new(continuation, transactions))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;

    use super::*;
    use crate::{
        blockchains::tests::registry, provider::AssetsClient, provider::HTTP,
        types::Asset,
    };

    fn blockchains() -> BlockchainsProvider {
        let assets = AssetsClient::with_assets(
            HTTP {
                http: Client::new(),
            },
            "http://assets.local",
            vec![Asset {
                id: String::from("BTC"),
                blockchain_integration_layer_id: Some(String::from("Bitcoin")),
                blockchain: None,
            }],
        )
        .unwrap();

        BlockchainsProvider::new(registry(), Some(assets))
    }

    fn row() -> Cash_Operation {
        Cash_Operation {
            Id: 1,
            ClientId: Some(String::from("8c4b3b1e-3f0c-4a51-9b8e-0d1c2e3f4a5b")),
            AssetId: Some(String::from("BTC")),
            Amount: BigDecimal::from(-2),
            AddressFrom: Some(String::from("hot-wallet")),
            AddressTo: Some(String::from("3N7cHrmKeEsjuFTx39WyGoZwAikAVSFoWX")),
            BlockChainHash: Some(String::from("h1")),
        }
    }

    #[tokio::test]
    async fn negative_amount_to_external_address() {
        let tx = CashOperationsWithdrawalsHistoryProvider::map(&blockchains(), row())
            .await
            .unwrap();

        assert_eq!(tx.crypto_currency, "BTC");
        assert_eq!(tx.hash, "h1");
        assert_eq!(tx.output_address, "3N7cHrmKeEsjuFTx39WyGoZwAikAVSFoWX");
        assert_eq!(tx.r#type, TransactionType::Withdrawal);
    }

    #[tokio::test]
    async fn rejected_operations() {
        let blockchains = blockchains();

        let mut deposit = row();
        deposit.Amount = BigDecimal::from(5);

        let mut internal = row();
        internal.AddressFrom = internal.AddressTo.clone();

        let mut unhashed = row();
        unhashed.BlockChainHash = Some(String::from(" "));

        let mut unknown_asset = row();
        unknown_asset.AssetId = Some(String::from("DOGE"));

        let mut anonymous = row();
        anonymous.ClientId = Some(String::from("nobody"));

        for row in [deposit, internal, unhashed, unknown_asset, anonymous] {
            assert!(CashOperationsWithdrawalsHistoryProvider::map(&blockchains, row)
                .await
                .is_none());
        }
    }
}

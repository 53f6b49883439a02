use async_trait::async_trait;

use crate::{
    blockchains::BlockchainsProvider,
    configuration::{AppState, State},
    error::Error,
    model::{Cashout, KeysetContinuation, PaginatedList, Transaction, TransactionType},
    withdrawals::WithdrawalsHistoryProvider,
};

const SUCCESS: &str = "Success";

/// Single cashouts made through the blockchain integration layer.
pub struct BilCashoutsWithdrawalsHistoryProvider {
    state: AppState<State>,
}

impl BilCashoutsWithdrawalsHistoryProvider {
    pub fn new(state: AppState<State>) -> BilCashoutsWithdrawalsHistoryProvider {
        BilCashoutsWithdrawalsHistoryProvider { state }
    }

    fn map(blockchains: &BlockchainsProvider, row: Cashout) -> Option<Transaction> {
        if row.Result.as_deref() != Some(SUCCESS) {
            return None;
        }

        let hash = row.TransactionHash.filter(|hash| !hash.trim().is_empty())?;
        let blockchain =
            blockchains.get_by_integration_layer_id(row.BlockchainType.as_deref()?)?;

        Some(Transaction::new(
            blockchain.crypto_currency.to_owned(),
            hash,
            row.ClientId,
            row.ToAddress.unwrap_or_default(),
            TransactionType::Withdrawal,
        ))
    }
}

#[async_trait]
impl WithdrawalsHistoryProvider for BilCashoutsWithdrawalsHistoryProvider {
    fn name(&self) -> &'static str {
        "bil-cashouts"
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
            .cashouts
            .get_page(after_id, limit)
            .await?;
        let continuation = KeysetContinuation::next(
            rows.last().map(|row| row.Id),
            rows.len(),
            limit,
        )?;
        let transactions = rows
            .into_iter()
            .filter_map(|row| Self::map(&self.state.blockchains, row))
            .collect();

        Ok(PaginatedList::new(continuation, transactions))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::blockchains::tests::registry;

    fn row(result: &str, hash: Option<&str>, blockchain_type: &str) -> Cashout {
        Cashout {
            Id: 3,
            State: Some(String::from("Finished")),
            Result: Some(String::from(result)),
            ClientId: Uuid::new_v4(),
            BlockchainType: Some(String::from(blockchain_type)),
            ToAddress: Some(String::from("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")),
            TransactionHash: hash.map(String::from),
        }
    }

    #[test]
    fn successful_cashouts_only() {
        let blockchains = BlockchainsProvider::new(registry(), None);

        let tx = BilCashoutsWithdrawalsHistoryProvider::map(
            &blockchains,
            row("Success", Some("0xabc"), "Ethereum"),
        )
        .unwrap();
        assert_eq!(tx.crypto_currency, "ETH");
        assert_eq!(tx.hash, "0xabc");

        for row in [
            row("Failure", Some("0xabc"), "Ethereum"),
            row("Success", Some(""), "Ethereum"),
            row("Success", None, "Ethereum"),
            row("Success", Some("0xabc"), "Dogecoin"),
        ] {
            assert!(BilCashoutsWithdrawalsHistoryProvider::map(&blockchains, row).is_none());
        }
    }
}

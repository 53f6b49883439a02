use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    deposits::DepositsHistoryProvider,
    error::Error,
    model::{
        decode_continuation, encode_continuation, DepositWallet, PaginatedList,
        Transaction, TransactionType,
    },
    normalization::AddressNormalizer,
    provider::InsightApi,
    types::InsightTransaction,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct InsightContinuation {
    page: u32,
}

/// Deposits of a Bitcoin-like chain read from an Insight explorer. A
/// transaction is a deposit when the wallet is not among its inputs.
pub struct InsightDepositsHistoryProvider {
    name: &'static str,
    crypto_currency: String,
    api: InsightApi,
    normalizer: Arc<AddressNormalizer>,
}

impl InsightDepositsHistoryProvider {
    pub fn new(
        name: &'static str,
        crypto_currency: String,
        api: InsightApi,
        normalizer: Arc<AddressNormalizer>,
    ) -> InsightDepositsHistoryProvider {
        InsightDepositsHistoryProvider {
            name,
            crypto_currency,
            api,
            normalizer,
        }
    }

    fn is_deposit(&self, tx: &InsightTransaction, address: &str) -> bool {
        tx.vin.iter().all(|input| {
            let normalized = input.addr.as_deref().and_then(|addr| {
                self.normalizer
                    .normalize_or_default(addr, &self.crypto_currency)
            });

            match normalized {
                Some(input) => input != address,
                None => true,
            }
        })
    }

    fn next_continuation(page: u32, pages_total: u32) -> Result<Option<String>, Error> {
        let next = page + 1;

        if next < pages_total {
            return Ok(Some(encode_continuation(&InsightContinuation {
                page: next,
            })?));
        }

        Ok(None)
    }

    fn map(
        &self,
        wallet: &DepositWallet,
        transactions: Vec<InsightTransaction>,
    ) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter(|tx| self.is_deposit(tx, &wallet.address))
            .map(|tx| {
                Transaction::new(
                    wallet.crypto_currency.to_owned(),
                    tx.txid,
                    wallet.user_id,
                    wallet.address.to_owned(),
                    TransactionType::Deposit,
                )
            })
            .collect()
    }
}

#[async_trait]
impl DepositsHistoryProvider for InsightDepositsHistoryProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_provide_history_for(&self, wallet: &DepositWallet) -> bool {
        wallet.crypto_currency == self.crypto_currency
    }

    async fn get_history(
        &self,
        wallet: &DepositWallet,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<Transaction>, Error> {
        if !self.can_provide_history_for(wallet) {
            return Ok(PaginatedList::empty());
        }

        let page = decode_continuation::<InsightContinuation>(continuation)?
            .unwrap_or_default()
            .page;

        let response = match self
            .api
            .get_address_transactions(&wallet.address, page)
            .await?
        {
            Some(response) => response,
            None => {
                warn!(
                    "Insight API treated address as invalid, skipping: {}",
                    wallet
                );
                return Ok(PaginatedList::empty());
            },
        };

        let continuation = Self::next_continuation(page, response.pages_total)?;
        let transactions = self.map(wallet, response.txs);

        Ok(PaginatedList::new(continuation, transactions))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use uuid::Uuid;

    use super::*;
    use crate::{provider::HTTP, types::InsightTransactionInput};

    const WALLET: &str = "bitcoincash:qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy";

    fn provider() -> InsightDepositsHistoryProvider {
        let api = InsightApi::new(
            HTTP {
                http: Client::new(),
            },
            "http://insight.local/api",
        )
        .unwrap();

        InsightDepositsHistoryProvider::new(
            "bch-insight",
            String::from("BCH"),
            api,
            Arc::new(AddressNormalizer::default()),
        )
    }

    fn tx(txid: &str, inputs: &[Option<&str>]) -> InsightTransaction {
        InsightTransaction {
            txid: String::from(txid),
            vin: inputs
                .iter()
                .map(|addr| InsightTransactionInput {
                    addr: addr.map(String::from),
                })
                .collect(),
        }
    }

    #[test]
    fn spending_from_wallet_is_not_a_deposit() {
        let provider = provider();
        let wallet = DepositWallet::new(Uuid::new_v4(), WALLET, "BCH");

        let transactions = provider.map(
            &wallet,
            vec![
                tx("a", &[Some("3N7cHrmKeEsjuFTx39WyGoZwAikAVSFoWX")]),
                tx("b", &[Some("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")]),
                tx("c", &[Some("qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy")]),
                tx("d", &[None]),
            ],
        );
        let hashes: Vec<&str> =
            transactions.iter().map(|tx| tx.hash.as_str()).collect();

        assert_eq!(hashes, vec!["a", "d"]);
        assert!(transactions.iter().all(|tx| tx.output_address == WALLET));
        assert!(transactions
            .iter()
            .all(|tx| tx.r#type == TransactionType::Deposit));
    }

    #[test]
    fn inputs_are_compared_in_canonical_form() {
        let provider = provider();
        let wallet = DepositWallet::new(Uuid::new_v4(), WALLET, "BCH");
        let uppercase = WALLET.to_uppercase();

        let transactions = provider.map(
            &wallet,
            vec![
                tx("a", &[Some(uppercase.as_str())]),
                tx("b", &[Some("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a")]),
            ],
        );
        let hashes: Vec<&str> =
            transactions.iter().map(|tx| tx.hash.as_str()).collect();

        assert_eq!(hashes, vec!["b"]);
    }

    #[test]
    fn page_continuation() {
        let next =
            InsightDepositsHistoryProvider::next_continuation(0, 3).unwrap();
        assert_eq!(next.as_deref(), Some(r#"{"page":1}"#));

        assert!(InsightDepositsHistoryProvider::next_continuation(2, 3)
            .unwrap()
            .is_none());
        assert!(InsightDepositsHistoryProvider::next_continuation(0, 0)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn other_currency_is_empty_page() {
        let provider = provider();
        let wallet = DepositWallet::new(Uuid::new_v4(), "0xabc", "ETH");

        assert!(!provider.can_provide_history_for(&wallet));
        let page = provider.get_history(&wallet, None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_last());
    }
}

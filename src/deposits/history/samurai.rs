use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;

use crate::{
    deposits::DepositsHistoryProvider,
    error::Error,
    model::{DepositWallet, PaginatedList, Transaction, TransactionType},
    normalization::AddressNormalizer,
    provider::SamuraiClient,
    types::SamuraiOperation,
};

/// Ethereum deposits: plain operations and ERC-20 transfers to the wallet.
/// The whole history is read in one call.
pub struct SamuraiDepositsHistoryProvider {
    crypto_currency: String,
    client: SamuraiClient,
    normalizer: Arc<AddressNormalizer>,
}

impl SamuraiDepositsHistoryProvider {
    pub fn new(
        crypto_currency: String,
        client: SamuraiClient,
        normalizer: Arc<AddressNormalizer>,
    ) -> SamuraiDepositsHistoryProvider {
        SamuraiDepositsHistoryProvider {
            crypto_currency,
            client,
            normalizer,
        }
    }

    fn is_deposit(&self, address: &str, operation: &SamuraiOperation) -> bool {
        operation
            .to
            .as_deref()
            .and_then(|to| self.normalizer.normalize_or_default(to, &self.crypto_currency))
            .map(|to| to.eq_ignore_ascii_case(address))
            .unwrap_or(false)
    }

    fn map(
        &self,
        wallet: &DepositWallet,
        operations: Vec<SamuraiOperation>,
        erc20_operations: Vec<SamuraiOperation>,
    ) -> Vec<Transaction> {
        let erc20_hashes: HashSet<&str> = erc20_operations
            .iter()
            .map(|operation| operation.transaction_hash.as_str())
            .collect();

        let plain = operations.iter().filter(|operation| {
            !erc20_hashes.contains(operation.transaction_hash.as_str())
        });

        plain
            .chain(erc20_operations.iter())
            .filter(|operation| self.is_deposit(&wallet.address, operation))
            .map(|operation| {
                Transaction::new(
                    self.crypto_currency.to_owned(),
                    operation.transaction_hash.to_lowercase(),
                    wallet.user_id,
                    wallet.address.to_owned(),
                    TransactionType::Deposit,
                )
            })
            .collect()
    }

    async fn read_operations(
        &self,
        address: &str,
    ) -> Result<Vec<SamuraiOperation>, Error> {
        let mut operations = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .get_operations_history(address, continuation.as_deref())
                .await?;
            operations.extend(page.items);

            match page.continuation {
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        Ok(operations)
    }

    async fn read_erc20_operations(
        &self,
        address: &str,
    ) -> Result<Vec<SamuraiOperation>, Error> {
        let mut operations = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .get_erc20_operations_history(address, continuation.as_deref())
                .await?;
            operations.extend(page.items);

            match page.continuation {
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        Ok(operations)
    }
}

#[async_trait]
impl DepositsHistoryProvider for SamuraiDepositsHistoryProvider {
    fn name(&self) -> &'static str {
        "eth-samurai"
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

        if continuation.is_some() {
            return Err(Error::ContinuationNotSupported(String::from(
                self.name(),
            )));
        }

        let operations = self.read_operations(&wallet.address).await?;
        let erc20_operations = self.read_erc20_operations(&wallet.address).await?;

        Ok(PaginatedList::terminal(self.map(
            wallet,
            operations,
            erc20_operations,
        )))
    }
}

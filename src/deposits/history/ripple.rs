use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;

use crate::{
    deposits::DepositsHistoryProvider,
    error::Error,
    model::{DepositWallet, PaginatedList, Transaction, TransactionType},
    normalization::split_tag,
    provider::RippleRpc,
    types::RippleTransaction,
};

/// XRP deposits. Many wallets share one account and differ only by the
/// destination tag, so account histories are cached for a while.
pub struct RippleDepositsHistoryProvider {
    crypto_currency: String,
    rpc: RippleRpc,
    cache: Cache<String, Arc<Vec<RippleTransaction>>>,
}

impl RippleDepositsHistoryProvider {
    pub fn new(
        crypto_currency: String,
        rpc: RippleRpc,
        cache_expiration: Duration,
    ) -> RippleDepositsHistoryProvider {
        let cache = Cache::builder().time_to_live(cache_expiration).build();

        RippleDepositsHistoryProvider {
            crypto_currency,
            rpc,
            cache,
        }
    }

    /// Only one request per account is in flight, concurrent callers wait
    /// for its result.
    async fn get_account_transactions(
        &self,
        account: &str,
    ) -> Result<Arc<Vec<RippleTransaction>>, Error> {
        self.cache
            .try_get_with_by_ref(account, async {
                self.rpc.get_transactions(account).await.map(Arc::new)
            })
            .await
            .map_err(|e| Error::UpstreamError(e.to_string()))
    }

    fn get_deposits(
        transactions: &[RippleTransaction],
        wallet: &DepositWallet,
        account: &str,
        tag: Option<&str>,
    ) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| tx.validated)
            .filter(|tx| {
                tx.meta
                    .as_ref()
                    .and_then(|meta| meta.TransactionResult.as_deref())
                    == Some("tesSUCCESS")
            })
            .filter_map(|tx| tx.tx.as_ref())
            .filter(|body| body.TransactionType.as_deref() == Some("Payment"))
            .filter(|body| body.Destination.as_deref() == Some(account))
            .filter(|body| match tag {
                Some(tag) => body
                    .DestinationTag
                    .map(|destination_tag| destination_tag.to_string() == tag)
                    .unwrap_or(false),
                None => true,
            })
            .map(|body| {
                Transaction::new(
                    wallet.crypto_currency.to_owned(),
                    body.hash.to_owned(),
                    wallet.user_id,
                    wallet.address.to_owned(),
                    TransactionType::Deposit,
                )
            })
            .collect()
    }
}

#[async_trait]
impl DepositsHistoryProvider for RippleDepositsHistoryProvider {
    fn name(&self) -> &'static str {
        "xrp-rpc"
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

        let (account, tag) = split_tag(&wallet.address);
        let transactions = self.get_account_transactions(account).await?;

        Ok(PaginatedList::terminal(Self::get_deposits(
            &transactions,
            wallet,
            account,
            tag,
        )))
    }
}

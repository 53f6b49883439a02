use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::{
    blockchains::BlockchainsProvider,
    configuration::{AppState, State},
    deposits::DepositWalletsProvider,
    error::Error,
    model::{Bcn_Credentials, DepositWallet, KeysetContinuation, PaginatedList},
};

/// Client credentials of the legacy blockchain integrations. A record may
/// hold both a main address and an asset address.
pub struct BcnCredentialsWalletsProvider {
    state: AppState<State>,
}

impl BcnCredentialsWalletsProvider {
    pub fn new(state: AppState<State>) -> BcnCredentialsWalletsProvider {
        BcnCredentialsWalletsProvider { state }
    }

    async fn map(
        blockchains: &BlockchainsProvider,
        row: Bcn_Credentials,
    ) -> Vec<DepositWallet> {
        let asset_reference = match row
            .AssetId
            .as_deref()
            .and_then(|asset_id| asset_id.split_whitespace().next())
        {
            Some(reference) => reference,
            None => return Vec::new(),
        };

        let blockchain = match blockchains.guess_blockchain(asset_reference).await {
            Some(blockchain) => blockchain,
            None => return Vec::new(),
        };

        let client_id = row.ClientId.as_deref().unwrap_or_default();
        let user_id = match Uuid::parse_str(client_id) {
            Ok(user_id) => user_id,
            Err(_) => {
                warn!(
                    "Bcn credentials record {} has invalid client id '{}', skipping",
                    row.Id, client_id
                );
                return Vec::new();
            },
        };

        [row.Address, row.AssetAddress]
            .into_iter()
            .flatten()
            .filter(|address| !address.trim().is_empty())
            .map(|address| {
                DepositWallet::new(
                    user_id,
                    address,
                    blockchain.crypto_currency.to_owned(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl DepositWalletsProvider for BcnCredentialsWalletsProvider {
    fn name(&self) -> &'static str {
        "bcn-credentials"
    }

    async fn get_wallets(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<DepositWallet>, Error> {
        let after_id = KeysetContinuation::after_id(continuation)?;
        let limit = self.state.config.page_size;
        let rows = self
            .state
            .database()?
            .bcn_credentials
            .get_page(after_id, limit)
            .await?;
        let continuation = KeysetContinuation::next(
            rows.last().map(|row| row.Id),
            rows.len(),
            limit,
        )?;

        let mut wallets = Vec::new();

        for row in rows {
            wallets.extend(Self::map(&self.state.blockchains, row).await);
        }

        Ok(PaginatedList::new(continuation, wallets))
    }
}

use async_trait::async_trait;

use crate::{
    blockchains::BlockchainsProvider,
    configuration::{AppState, State},
    deposits::DepositWalletsProvider,
    error::Error,
    model::{Blockchain_Wallet, DepositWallet, PaginatedList, SkipContinuation},
};

/// Wallets created through the blockchain integration layer.
pub struct BlockchainWalletsProvider {
    state: AppState<State>,
}

impl BlockchainWalletsProvider {
    pub fn new(state: AppState<State>) -> BlockchainWalletsProvider {
        BlockchainWalletsProvider { state }
    }

    fn map(
        blockchains: &BlockchainsProvider,
        row: Blockchain_Wallet,
    ) -> Option<DepositWallet> {
        let blockchain = blockchains
            .get_by_integration_layer_id(row.IntegrationLayerId.as_deref()?)?;

        Some(DepositWallet::new(
            row.UserId,
            row.Address?,
            blockchain.crypto_currency.to_owned(),
        ))
    }
}

#[async_trait]
impl DepositWalletsProvider for BlockchainWalletsProvider {
    fn name(&self) -> &'static str {
        "blockchain-wallets"
    }

    async fn get_wallets(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<DepositWallet>, Error> {
        let skip = SkipContinuation::skip(continuation)?;
        let limit = self.state.config.page_size;
        let rows = self
            .state
            .database()?
            .blockchain_wallets
            .get_page(skip, limit)
            .await?;
        let continuation = SkipContinuation::next(skip, rows.len(), limit)?;
        let wallets = rows
            .into_iter()
            .filter_map(|row| Self::map(&self.state.blockchains, row))
            .collect();

        Ok(PaginatedList::new(continuation, wallets))
    }
}

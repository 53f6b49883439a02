//! Deposit wallet discovery and per-wallet deposit history.

use async_trait::async_trait;

use crate::{
    error::Error,
    model::{DepositWallet, PaginatedList, Transaction},
};

pub use self::{
    exporter::{DepositsExporter, DepositsExporterSettings},
    history::{
        InsightDepositsHistoryProvider, RippleDepositsHistoryProvider,
        SamuraiDepositsHistoryProvider,
    },
    wallets::{
        BcnCredentialsWalletsProvider, BlockchainWalletsProvider,
        CsvFileWalletsProvider, WalletCredentialsWalletsProvider,
    },
};

mod exporter;
mod history;
mod wallets;

/// Storage backend listing deposit wallets, one page per call.
#[async_trait]
pub trait DepositWalletsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_wallets(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<DepositWallet>, Error>;
}

/// Upstream source of the deposits made to a wallet.
///
/// A provider asked for a wallet it cannot handle returns an empty last
/// page instead of an error.
#[async_trait]
pub trait DepositsHistoryProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_provide_history_for(&self, wallet: &DepositWallet) -> bool;

    async fn get_history(
        &self,
        wallet: &DepositWallet,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<Transaction>, Error>;
}

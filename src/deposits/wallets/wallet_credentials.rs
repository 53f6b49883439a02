use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::{
    configuration::{AppState, State},
    deposits::DepositWalletsProvider,
    error::Error,
    model::{DepositWallet, KeysetContinuation, PaginatedList, Wallet_Credentials},
};

/// Bitcoin multisig and colored multisig wallets of the clients.
pub struct WalletCredentialsWalletsProvider {
    state: AppState<State>,
    crypto_currency: String,
}

impl WalletCredentialsWalletsProvider {
    pub fn new(
        state: AppState<State>,
    ) -> Result<WalletCredentialsWalletsProvider, Error> {
        let crypto_currency = state.blockchains.currency("BTC")?;

        Ok(WalletCredentialsWalletsProvider {
            state,
            crypto_currency,
        })
    }

    fn map(crypto_currency: &str, row: Wallet_Credentials) -> Vec<DepositWallet> {
        let client_id = row.ClientId.as_deref().unwrap_or_default();
        let user_id = match Uuid::parse_str(client_id) {
            Ok(user_id) => user_id,
            Err(_) => {
                warn!(
                    "Wallet credentials record {} has invalid client id '{}', skipping",
                    row.Id, client_id
                );
                return Vec::new();
            },
        };

        [row.MultiSig, row.ColoredMultiSig]
            .into_iter()
            .flatten()
            .filter(|address| !address.is_empty())
            .map(|address| DepositWallet::new(user_id, address, crypto_currency))
            .collect()
    }
}

#[async_trait]
impl DepositWalletsProvider for WalletCredentialsWalletsProvider {
    fn name(&self) -> &'static str {
        "wallet-credentials"
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
            .wallet_credentials
            .get_page(after_id, limit)
            .await?;
        let continuation = KeysetContinuation::next(
            rows.last().map(|row| row.Id),
            rows.len(),
            limit,
        )?;
        let wallets = rows
            .into_iter()
            .flat_map(|row| Self::map(&self.crypto_currency, row))
            .collect();

        Ok(PaginatedList::new(continuation, wallets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_multisigs_are_bitcoin_wallets() {
        let wallets = WalletCredentialsWalletsProvider::map(
            "BTC",
            Wallet_Credentials {
                Id: 1,
                ClientId: Some(String::from("8c4b3b1e-3f0c-4a51-9b8e-0d1c2e3f4a5b")),
                MultiSig: Some(String::from("3N7cHrmKeEsjuFTx39WyGoZwAikAVSFoWX")),
                ColoredMultiSig: Some(String::from(
                    "anY5VY2af7imRmVdK5md9vfUWWKvLS82KqV",
                )),
            },
        );

        assert_eq!(wallets.len(), 2);
        assert!(wallets.iter().all(|wallet| wallet.crypto_currency == "BTC"));
    }

    #[test]
    fn empty_fields_are_skipped() {
        let wallets = WalletCredentialsWalletsProvider::map(
            "BTC",
            Wallet_Credentials {
                Id: 2,
                ClientId: Some(String::from("8c4b3b1e-3f0c-4a51-9b8e-0d1c2e3f4a5b")),
                MultiSig: Some(String::new()),
                ColoredMultiSig: None,
            },
        );

        assert!(wallets.is_empty());
    }
}

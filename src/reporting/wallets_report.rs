use std::{collections::HashSet, path::PathBuf};

use csv::{QuoteStyle, WriterBuilder};
use tokio::fs;
use tracing::info;

use crate::{error::Error, model::DepositWallet};

/// Audit file listing every discovered deposit wallet, one
/// `user-id,cryptocurrency,address` line per wallet without a header.
pub struct DepositWalletsReport {
    path: PathBuf,
}

impl DepositWalletsReport {
    pub fn new(path: PathBuf) -> DepositWalletsReport {
        DepositWalletsReport { path }
    }

    pub fn to_bytes(wallets: &HashSet<DepositWallet>) -> Result<Vec<u8>, Error> {
        let mut csv = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(Vec::new());

        for wallet in wallets {
            let user_id = wallet.user_id.to_string();
            csv.write_record([
                user_id.as_str(),
                wallet.crypto_currency.as_str(),
                wallet.address.as_str(),
            ])?;
        }

        csv.into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    pub async fn save(&self, wallets: &HashSet<DepositWallet>) -> Result<(), Error> {
        info!("Saving deposit wallets report to {}...", self.path.display());

        let data = Self::to_bytes(wallets)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.path, data).await?;

        info!(
            "Deposit wallets saving done. {} deposit wallets saved",
            wallets.len()
        );

        Ok(())
    }
}

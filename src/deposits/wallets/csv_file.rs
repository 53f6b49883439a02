use std::path::PathBuf;

use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, Trim};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::{
    deposits::DepositWalletsProvider,
    error::Error,
    model::{DepositWallet, PaginatedList, SkipContinuation},
};

/// Wallets listed in a local `user-id,cryptocurrency,address` file, the
/// same layout the deposit wallets report is written in. A header line is
/// allowed.
pub struct CsvFileWalletsProvider {
    path: PathBuf,
    page_size: i64,
}

impl CsvFileWalletsProvider {
    pub fn new(path: PathBuf, page_size: i64) -> CsvFileWalletsProvider {
        CsvFileWalletsProvider { path, page_size }
    }

    fn parse(line: usize, record: &StringRecord) -> Option<DepositWallet> {
        let (user_id, crypto_currency, address) =
            match (record.get(0), record.get(1), record.get(2), record.len()) {
                (Some(user_id), Some(currency), Some(address), 3) => {
                    (user_id, currency, address)
                },
                _ => {
                    warn!("Deposit wallets file line {} is malformed, skipping", line);
                    return None;
                },
            };

        if user_id == "user-id" {
            return None;
        }

        match Uuid::parse_str(user_id) {
            Ok(user_id) => Some(DepositWallet::new(user_id, address, crypto_currency)),
            Err(_) => {
                warn!(
                    "Deposit wallets file line {} has invalid user id '{}', skipping",
                    line, user_id
                );
                None
            },
        }
    }
}

#[async_trait]
impl DepositWalletsProvider for CsvFileWalletsProvider {
    fn name(&self) -> &'static str {
        "csv-file"
    }

    async fn get_wallets(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<DepositWallet>, Error> {
        let skip = SkipContinuation::skip(continuation)?;
        let data = fs::read(&self.path).await?;
        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(data.as_slice());

        let records = csv
            .records()
            .skip(skip as usize)
            .take(self.page_size as usize)
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;
        let continuation = SkipContinuation::next(skip, records.len(), self.page_size)?;
        let wallets = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                Self::parse(skip as usize + index + 1, record)
            })
            .collect();

        Ok(PaginatedList::new(continuation, wallets))
    }
}

use std::{collections::HashSet, path::PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::info;

use crate::{
    error::Error,
    model::Transaction,
    reporting::{TransactionsReportReader, TransactionsReportWriter},
};

/// Blob-style storage holding the full report.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn exists(&self) -> Result<bool, Error>;
    async fn download(&self) -> Result<Vec<u8>, Error>;
    async fn upload(&self, data: Vec<u8>) -> Result<(), Error>;
    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, Error>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: PathBuf) -> FileSnapshotStore {
        FileSnapshotStore { path }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn exists(&self) -> Result<bool, Error> {
        Ok(fs::try_exists(&self.path).await?)
    }

    async fn download(&self) -> Result<Vec<u8>, Error> {
        Ok(fs::read(&self.path).await?)
    }

    /// Writes next to the target and renames, so readers never observe a
    /// partially written report.
    async fn upload(&self, data: Vec<u8>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temporary = self.path.with_extension("tmp");
        fs::write(&temporary, data).await?;
        fs::rename(&temporary, &self.path).await?;

        Ok(())
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, Error> {
        if !self.exists().await? {
            return Ok(None);
        }

        let modified = fs::metadata(&self.path).await?.modified()?;

        Ok(Some(DateTime::<Utc>::from(modified)))
    }
}

pub struct TransactionsSnapshotRepository {
    store: Box<dyn SnapshotStore>,
    reader: TransactionsReportReader,
}

impl TransactionsSnapshotRepository {
    pub fn new(
        store: Box<dyn SnapshotStore>,
        reader: TransactionsReportReader,
    ) -> TransactionsSnapshotRepository {
        TransactionsSnapshotRepository { store, reader }
    }

    pub async fn load(
        &self,
    ) -> Result<(HashSet<Transaction>, Option<DateTime<Utc>>), Error> {
        info!("Loading transactions snapshot...");

        if !self.store.exists().await? {
            info!("Transactions snapshot not found, starting from scratch");
            return Ok((HashSet::new(), None));
        }

        let data = self.store.download().await?;
        let snapshot = self.reader.read(data.as_slice())?;
        let last_modified = self.store.last_modified().await?;

        info!(
            "Transactions snapshot with {} transactions loaded",
            snapshot.len()
        );

        Ok((snapshot, last_modified))
    }

    pub async fn save(&self, snapshot: &HashSet<Transaction>) -> Result<(), Error> {
        info!("Saving transactions snapshot...");

        let data = TransactionsReportWriter::to_bytes(snapshot)?;
        self.store.upload(data).await?;

        info!(
            "Transactions snapshot with {} transactions saved",
            snapshot.len()
        );

        Ok(())
    }

    /// Replaces the stored report with raw, already formatted content.
    pub async fn replace(&self, data: Vec<u8>) -> Result<usize, Error> {
        let snapshot = self.reader.read(data.as_slice())?;
        self.store.upload(data).await?;

        Ok(snapshot.len())
    }
}

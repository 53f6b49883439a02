use std::{collections::HashSet, path::PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::info;

use crate::{
    error::Error, helpers::sortable_timestamp, model::Transaction,
    reporting::TransactionsReportWriter,
};

use super::TransactionsIncrementPublisher;

pub struct FileIncrementPublisher {
    directory: PathBuf,
}

impl FileIncrementPublisher {
    pub fn new(directory: PathBuf) -> FileIncrementPublisher {
        FileIncrementPublisher { directory }
    }

    pub fn file_name(from: &DateTime<Utc>) -> String {
        format!("increment-from-{}.csv", sortable_timestamp(from))
    }
}

#[async_trait]
impl TransactionsIncrementPublisher for FileIncrementPublisher {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn publish(
        &self,
        increment: &HashSet<Transaction>,
        from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<(), Error> {
        let path = self.directory.join(Self::file_name(&from));

        info!("Saving transactions increment to {}...", path.display());

        let data = TransactionsReportWriter::to_bytes(increment)?;
        fs::create_dir_all(&self.directory).await?;
        fs::write(&path, data).await?;

        info!(
            "Transactions increment with {} transactions saved",
            increment.len()
        );

        Ok(())
    }
}

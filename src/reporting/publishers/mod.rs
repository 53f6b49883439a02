use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{error::Error, model::Transaction};

pub use self::{
    email::EmailIncrementPublisher, file::FileIncrementPublisher,
    slack::SlackIncrementPublisher,
};

mod email;
mod file;
mod slack;

/// Destination of the transactions found during one run.
#[async_trait]
pub trait TransactionsIncrementPublisher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(
        &self,
        increment: &HashSet<Transaction>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(), Error>;
}

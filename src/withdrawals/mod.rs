//! Platform-wide withdrawal history.

use async_trait::async_trait;

use crate::{
    error::Error,
    model::{PaginatedList, Transaction},
};

pub use self::{
    bil_cashouts::BilCashoutsWithdrawalsHistoryProvider,
    cash_operations::CashOperationsWithdrawalsHistoryProvider,
    cashouts_batch::CashoutsBatchWithdrawalsHistoryProvider,
    exporter::WithdrawalsExporter,
};

mod bil_cashouts;
mod cash_operations;
mod cashouts_batch;
mod exporter;

#[async_trait]
pub trait WithdrawalsHistoryProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_history(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<Transaction>, Error>;
}

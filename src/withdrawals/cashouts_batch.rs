use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    blockchains::BlockchainsProvider,
    configuration::{AppState, State},
    error::Error,
    model::{
        Batched_Cashout, Cashouts_Batch, KeysetContinuation, Operation_Execution,
        PaginatedList, Transaction, TransactionType,
    },
    withdrawals::WithdrawalsHistoryProvider,
};

const FINISHED: &str = "Finished";
const EXECUTION_RESULTS: [&str; 2] = ["Completed", "Success"];

/// Batched cashouts. A batch is sent in one on-chain transaction whose
/// hash lives in the operation execution keyed by the batch id.
pub struct CashoutsBatchWithdrawalsHistoryProvider {
    state: AppState<State>,
    executions: OnceCell<HashMap<Uuid, Operation_Execution>>,
}

impl CashoutsBatchWithdrawalsHistoryProvider {
    pub fn new(state: AppState<State>) -> CashoutsBatchWithdrawalsHistoryProvider {
        CashoutsBatchWithdrawalsHistoryProvider {
            state,
            executions: OnceCell::new(),
        }
    }

    async fn get_executions(&self) -> Result<&HashMap<Uuid, Operation_Execution>, Error> {
        self.executions
            .get_or_try_init(|| async {
                info!("Loading operation executions...");

                let executions: HashMap<Uuid, Operation_Execution> = self
                    .state
                    .database()?
                    .operation_executions
                    .get_all()
                    .await?
                    .into_iter()
                    .map(|execution| (execution.OperationId, execution))
                    .collect();

                info!(
                    "Operation executions loading done. {} operation executions loaded",
                    executions.len()
                );

                Ok::<_, Error>(executions)
            })
            .await
    }

    fn map(
        blockchains: &BlockchainsProvider,
        executions: &HashMap<Uuid, Operation_Execution>,
        row: Cashouts_Batch,
    ) -> Vec<Transaction> {
        if row.State.as_deref() != Some(FINISHED) {
            return Vec::new();
        }

        let blockchain = match row
            .BlockchainType
            .as_deref()
            .and_then(|id| blockchains.get_by_integration_layer_id(id))
        {
            Some(blockchain) => blockchain,
            None => return Vec::new(),
        };

        let execution = match executions.get(&row.BatchId) {
            Some(execution) => execution,
            None => {
                warn!(
                    "Operation execution for cashouts batch {} not found, skipping",
                    row.BatchId
                );
                return Vec::new();
            },
        };

        match execution.Result.as_deref() {
            Some(result) if EXECUTION_RESULTS.contains(&result) => {},
            _ => return Vec::new(),
        }

        let hash = match execution
            .TransactionHash
            .as_deref()
            .filter(|hash| !hash.trim().is_empty())
        {
            Some(hash) => hash,
            None => {
                warn!(
                    "Transaction hash for cashouts batch {} is empty, skipping",
                    row.BatchId
                );
                return Vec::new();
            },
        };

        let cashouts: Vec<Batched_Cashout> =
            match serde_json::from_str(row.Cashouts.as_deref().unwrap_or("[]")) {
                Ok(cashouts) => cashouts,
                Err(e) => {
                    warn!(
                        "Cashouts of batch {} can not be parsed, skipping: {}",
                        row.BatchId, e
                    );
                    return Vec::new();
                },
            };

        cashouts
            .into_iter()
            .map(|cashout| {
                Transaction::new(
                    blockchain.crypto_currency.to_owned(),
                    hash,
                    cashout.ClientId,
                    cashout.DestinationAddress,
                    TransactionType::Withdrawal,
                )
            })
            .collect()
    }
}

#[async_trait]
impl WithdrawalsHistoryProvider for CashoutsBatchWithdrawalsHistoryProvider {
    fn name(&self) -> &'static str {
        "cashouts-batch"
    }

    async fn get_history(
        &self,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<Transaction>, Error> {
        let executions = self.get_executions().await?;
        let after_id = KeysetContinuation::after_id(continuation)?;
        let limit = self.state.config.page_size;
        let rows = self
            .state
            .database()?
            .cashouts_batches
            .get_page(after_id, limit)
            .await?;
        let continuation = KeysetContinuation::next(
            rows.last().map(|row| row.Id),
            rows.len(),
            limit,
        )?;
        let transactions = rows
            .into_iter()
            .flat_map(|row| Self::map(&self.state.blockchains, executions, row))
            .collect();

        Ok(PaginatedList::new(continuation, transactions))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::blockchains::tests::registry;

    fn execution(batch: Uuid, result: &str, hash: &str) -> (Uuid, Operation_Execution) {
        (
            batch,
            Operation_Execution {
                OperationId: batch,
                State: Some(String::from("Completed")),
                Result: Some(String::from(result)),
                TransactionHash: Some(String::from(hash)),
            },
        )
    }

    fn batch(batch: Uuid, state: &str) -> Cashouts_Batch {
        let cashouts = json!([
            {
                "OperationId": Uuid::new_v4(),
                "ClientId": Uuid::new_v4(),
                "DestinationAddress": "LW9Tcj39N1f51DHDoue8xWE2cGEE1FKUVF",
                "Amount": 0.5,
                "IndexInBatch": 0
            },
            {
                "OperationId": Uuid::new_v4(),
                "ClientId": Uuid::new_v4(),
                "DestinationAddress": "LW9Tcj39N1f51DHDoue8xWE2cGEE1FKUVF",
                "Amount": 1.5,
                "IndexInBatch": 1
            }
        ]);

        Cashouts_Batch {
            Id: 11,
            BatchId: batch,
            BlockchainType: Some(String::from("LiteCoin")),
            Cashouts: Some(cashouts.to_string()),
            State: Some(String::from(state)),
        }
    }

    #[test]
    fn one_withdrawal_per_batched_cashout() {
        let blockchains = BlockchainsProvider::new(registry(), None);
        let id = Uuid::new_v4();
        let executions: HashMap<Uuid, Operation_Execution> =
            [execution(id, "Success", "ltc-hash")].into_iter().collect();

        let transactions = CashoutsBatchWithdrawalsHistoryProvider::map(
            &blockchains,
            &executions,
            batch(id, "Finished"),
        );

        assert_eq!(transactions.len(), 2);
        assert!(transactions
            .iter()
            .all(|tx| tx.hash == "ltc-hash" && tx.crypto_currency == "LTC"));
        assert_ne!(transactions[0].user_id, transactions[1].user_id);
    }

    #[test]
    fn skipped_batches() {
        let blockchains = BlockchainsProvider::new(registry(), None);
        let failed = Uuid::new_v4();
        let unhashed = Uuid::new_v4();
        let executions: HashMap<Uuid, Operation_Execution> = [
            execution(failed, "Failed", "hash"),
            execution(unhashed, "Completed", " "),
        ]
        .into_iter()
        .collect();

        for row in [
            batch(Uuid::new_v4(), "Finished"),
            batch(failed, "Finished"),
            batch(unhashed, "Finished"),
            batch(failed, "Executing"),
        ] {
            assert!(CashoutsBatchWithdrawalsHistoryProvider::map(
                &blockchains,
                &executions,
                row
            )
            .is_empty());
        }
    }
}

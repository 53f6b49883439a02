use crate::{
    dao::PoolOption,
    error::Error,
    model::{
        Bcn_Credentials, Blockchain_Wallet, Cash_Operation, Cashout,
        Cashouts_Batch, Operation_Execution, Table, Wallet_Credentials,
    },
};

/// Read-only access to the storage tables owned by the wallet and cashout
/// services.
#[derive(Debug)]
pub struct DatabasePool {
    pub blockchain_wallets: Table<Blockchain_Wallet>,
    pub bcn_credentials: Table<Bcn_Credentials>,
    pub wallet_credentials: Table<Wallet_Credentials>,
    pub cash_operations: Table<Cash_Operation>,
    pub cashouts: Table<Cashout>,
    pub cashouts_batches: Table<Cashouts_Batch>,
    pub operation_executions: Table<Operation_Execution>,
}

impl DatabasePool {
    pub async fn new(database_url: &str) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        Ok(DatabasePool {
            blockchain_wallets: Table::new(pool.clone()),
            bcn_credentials: Table::new(pool.clone()),
            wallet_credentials: Table::new(pool.clone()),
            cash_operations: Table::new(pool.clone()),
            cashouts: Table::new(pool.clone()),
            cashouts_batches: Table::new(pool.clone()),
            operation_executions: Table::new(pool),
        })
    }
}

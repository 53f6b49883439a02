pub use self::types::{PoolOption, PoolType};

mod bcn_credentials;
mod blockchain_wallets;
mod cash_operations;
mod cashouts;
mod cashouts_batches;
mod operation_executions;
mod types;
mod wallet_credentials;

//! Domain values and database row models
//!
//! Row structs read from the upstream storage tables live in models.rs,
//! the exported domain values each have their own file.

mod blockchain;
mod deposit_wallet;
mod models;
mod paginated_list;
mod table;
mod transaction;

pub use blockchain::Blockchain;
pub use deposit_wallet::DepositWallet;
pub use models::*;
pub use paginated_list::{
    decode_continuation, encode_continuation, KeysetContinuation,
    PaginatedList, SkipContinuation,
};
pub use table::Table;
pub use transaction::{Transaction, TransactionType};

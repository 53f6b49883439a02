pub use self::{
    bcn_credentials::BcnCredentialsWalletsProvider,
    blockchain_wallets::BlockchainWalletsProvider,
    csv_file::CsvFileWalletsProvider,
    wallet_credentials::WalletCredentialsWalletsProvider,
};

mod bcn_credentials;
mod blockchain_wallets;
mod csv_file;
mod wallet_credentials;

//! Address normalization
//!
//! Every currency runs through an ordered chain of normalizers. Each stage
//! whose `can_normalize` accepts the currency receives the output of the
//! previous stage, and the first stage to reject the address rejects it for
//! the whole chain.

use std::str::FromStr;

use tracing::warn;

use crate::{
    configuration::Config,
    error::Error,
    model::{DepositWallet, Transaction},
};

pub use bitcoin::{BitcoinNormalizer, NetworkParams};
pub use bitcoin_cash::BitcoinCashNormalizer;
pub use ethereum::EthereumNormalizer;
pub use general::GeneralNormalizer;
pub use ripple::{split_tag, RippleNormalizer};

mod bitcoin;
mod bitcoin_cash;
mod cashaddr;
mod ethereum;
mod general;
mod ripple;

/// Call site of a normalization. Only the Ripple stage differs: wallet
/// addresses keep a validated `+tag` suffix, transaction addresses never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationContext {
    Wallet,
    Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Mainnet),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(Error::ConfigurationError(format!(
                "unknown network: {}",
                other
            ))),
        }
    }
}

pub trait Normalizer: Send + Sync {
    fn can_normalize(&self, crypto_currency: &str) -> bool;

    fn normalize_or_default(
        &self,
        address: &str,
        context: NormalizationContext,
    ) -> Option<String>;
}

pub struct AddressNormalizer {
    normalizers: Vec<Box<dyn Normalizer>>,
}

impl AddressNormalizer {
    pub fn new(normalizers: Vec<Box<dyn Normalizer>>) -> AddressNormalizer {
        AddressNormalizer { normalizers }
    }

    pub fn with_networks(
        btc: Network,
        ltc: Network,
        bch: Network,
    ) -> AddressNormalizer {
        AddressNormalizer::new(vec![
            Box::new(GeneralNormalizer),
            Box::new(BitcoinNormalizer::bitcoin(btc)),
            Box::new(BitcoinNormalizer::litecoin(ltc)),
            Box::new(BitcoinCashNormalizer::new(bch)),
            Box::new(EthereumNormalizer::new()),
            Box::new(RippleNormalizer::new()),
        ])
    }

    pub fn from_config(config: &Config) -> AddressNormalizer {
        Self::with_networks(
            config.btc_network,
            config.ltc_network,
            config.bch_network,
        )
    }

    /// Canonical form of an on-chain or output address.
    pub fn normalize_or_default(
        &self,
        address: &str,
        crypto_currency: &str,
    ) -> Option<String> {
        self.normalize(address, crypto_currency, NormalizationContext::Transaction)
    }

    /// Canonical form of a deposit wallet address.
    pub fn normalize_wallet_address_or_default(
        &self,
        address: &str,
        crypto_currency: &str,
    ) -> Option<String> {
        self.normalize(address, crypto_currency, NormalizationContext::Wallet)
    }

    fn normalize(
        &self,
        address: &str,
        crypto_currency: &str,
        context: NormalizationContext,
    ) -> Option<String> {
        let mut current = address.to_owned();

        for normalizer in self
            .normalizers
            .iter()
            .filter(|normalizer| normalizer.can_normalize(crypto_currency))
        {
            current = normalizer.normalize_or_default(&current, context)?;
        }

        Some(current)
    }

    /// Drops transactions with missing required fields or an invalid
    /// output address.
    pub fn normalize_transaction(&self, tx: &Transaction) -> Option<Transaction> {
        if !tx.is_valid() {
            warn!(
                "Transaction has empty required fields, skipping: {}:{}:{}",
                tx.crypto_currency, tx.hash, tx.user_id
            );
            return None;
        }

        match self.normalize_or_default(&tx.output_address, &tx.crypto_currency)
        {
            Some(address) => Some(tx.with_output_address(address)),
            None => {
                warn!(
                    "It is not a valid address, skipping: {} {}",
                    tx.crypto_currency, tx.output_address
                );
                None
            },
        }
    }

    pub fn normalize_wallet(
        &self,
        wallet: &DepositWallet,
    ) -> Option<DepositWallet> {
        if !wallet.is_valid() {
            warn!("Deposit wallet has empty required fields, skipping: {}", wallet);
            return None;
        }

        match self.normalize_wallet_address_or_default(
            &wallet.address,
            &wallet.crypto_currency,
        ) {
            Some(address) => Some(wallet.with_address(address)),
            None => {
                warn!("It is not a valid deposit wallet address, skipping: {}", wallet);
                None
            },
        }
    }
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::with_networks(Network::Mainnet, Network::Mainnet, Network::Mainnet)
    }
}

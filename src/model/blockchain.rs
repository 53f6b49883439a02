use std::str::FromStr;

use crate::error::Error;

/// Registry entry, read from `(currency,integrationLayerId,assetBlockchain,alias|alias)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blockchain {
    pub crypto_currency: String,
    pub integration_layer_id: Option<String>,
    pub asset_blockchain: Option<String>,
    pub asset_reference_aliases: Vec<String>,
}

impl FromStr for Blockchain {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let items: Vec<&str> = value.split(',').map(|item| item.trim()).collect();

        if items.len() != 4 || items[0].is_empty() {
            return Err(Error::ConfigurationError(format!(
                "invalid blockchain descriptor: ({})",
                value
            )));
        }

        let optional = |item: &str| {
            if item.is_empty() {
                None
            } else {
                Some(item.to_owned())
            }
        };

        Ok(Blockchain {
            crypto_currency: items[0].to_owned(),
            integration_layer_id: optional(items[1]),
            asset_blockchain: optional(items[2]),
            asset_reference_aliases: items[3]
                .split('|')
                .filter(|alias| !alias.is_empty())
                .map(|alias| alias.to_owned())
                .collect(),
        })
    }
}

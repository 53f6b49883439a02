use std::collections::HashMap;

use crate::{error::Error, model::Blockchain, provider::AssetsClient};

/// Lookup table of the configured blockchains.
pub struct BlockchainsProvider {
    blockchains: Vec<Blockchain>,
    by_integration_layer_id: HashMap<String, usize>,
    by_asset_blockchain: HashMap<String, usize>,
    by_asset_reference: HashMap<String, usize>,
    assets: Option<AssetsClient>,
}

impl BlockchainsProvider {
    pub fn new(
        blockchains: Vec<Blockchain>,
        assets: Option<AssetsClient>,
    ) -> BlockchainsProvider {
        let mut by_integration_layer_id = HashMap::new();
        let mut by_asset_blockchain = HashMap::new();
        let mut by_asset_reference = HashMap::new();

        for (index, blockchain) in blockchains.iter().enumerate() {
            if let Some(id) = &blockchain.integration_layer_id {
                by_integration_layer_id.insert(id.to_owned(), index);
            }

            if let Some(name) = &blockchain.asset_blockchain {
                by_asset_blockchain.insert(name.to_owned(), index);
            }

            for alias in &blockchain.asset_reference_aliases {
                by_asset_reference.insert(alias.to_owned(), index);
            }
        }

        BlockchainsProvider {
            blockchains,
            by_integration_layer_id,
            by_asset_blockchain,
            by_asset_reference,
            assets,
        }
    }

    pub fn get_by_currency(&self, crypto_currency: &str) -> Option<&Blockchain> {
        self.blockchains
            .iter()
            .find(|blockchain| blockchain.crypto_currency == crypto_currency)
    }

    /// Registered currency code, or an error naming the missing one.
    pub fn currency(&self, crypto_currency: &str) -> Result<String, Error> {
        self.get_by_currency(crypto_currency)
            .map(|blockchain| blockchain.crypto_currency.to_owned())
            .ok_or_else(|| {
                Error::NotSupportedCurrency(crypto_currency.to_owned())
            })
    }

    pub fn get_by_integration_layer_id(&self, id: &str) -> Option<&Blockchain> {
        self.by_integration_layer_id
            .get(id)
            .map(|index| &self.blockchains[*index])
    }

    pub fn get_by_asset_blockchain(&self, name: &str) -> Option<&Blockchain> {
        self.by_asset_blockchain
            .get(name)
            .map(|index| &self.blockchains[*index])
    }

    pub fn get_by_asset_reference(&self, alias: &str) -> Option<&Blockchain> {
        self.by_asset_reference
            .get(alias)
            .map(|index| &self.blockchains[*index])
    }

    /// Refreshes the asset dictionary, if an assets service is configured.
    pub async fn load_assets(&self) -> Result<(), Error> {
        if let Some(assets) = &self.assets {
            assets.load().await?;
        }

        Ok(())
    }

    pub async fn get_by_asset_id(&self, asset_id: &str) -> Option<&Blockchain> {
        let asset = self.assets.as_ref()?.get_by_id(asset_id).await?;

        if let Some(id) = &asset.blockchain_integration_layer_id {
            return self.get_by_integration_layer_id(id);
        }

        if let Some(name) = &asset.blockchain {
            return self.get_by_asset_blockchain(name);
        }

        None
    }

    /// Resolves an integration layer id, an asset reference alias or an
    /// asset id, in that order.
    pub async fn guess_blockchain(
        &self,
        asset_reference: &str,
    ) -> Option<&Blockchain> {
        if let Some(blockchain) = self.get_by_integration_layer_id(asset_reference) {
            return Some(blockchain);
        }

        if let Some(blockchain) = self.get_by_asset_reference(asset_reference) {
            return Some(blockchain);
        }

        self.get_by_asset_id(asset_reference).await
    }
}

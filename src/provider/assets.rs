use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;
use url::Url;

use crate::{
    error::Error,
    provider::{endpoint, HTTP},
    types::Asset,
};

/// Asset dictionary of the assets service, loaded once per run.
#[derive(Debug)]
pub struct AssetsClient {
    http: HTTP,
    url: Url,
    assets: RwLock<HashMap<String, Asset>>,
}

impl AssetsClient {
    pub fn new(http: HTTP, url: &str) -> Result<AssetsClient, Error> {
        Ok(AssetsClient {
            http,
            url: Url::parse(url)?,
            assets: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_assets(
        http: HTTP,
        url: &str,
        assets: Vec<Asset>,
    ) -> Result<AssetsClient, Error> {
        let map = assets
            .into_iter()
            .map(|asset| (asset.id.clone(), asset))
            .collect();

        Ok(AssetsClient {
            http,
            url: Url::parse(url)?,
            assets: RwLock::new(map),
        })
    }

    pub async fn load(&self) -> Result<usize, Error> {
        info!("Loading assets...");

        let mut url = endpoint(&self.url, &["api", "v2", "assets"])?;
        url.query_pairs_mut().append_pair("includeNonTradable", "true");

        let assets = self
            .http
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Asset>>()
            .await?;

        let mut map = self.assets.write().await;
        *map = assets
            .into_iter()
            .map(|asset| (asset.id.clone(), asset))
            .collect();

        info!("Assets loading done. {} assets loaded", map.len());

        Ok(map.len())
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Asset> {
        self.assets.read().await.get(id).cloned()
    }
}

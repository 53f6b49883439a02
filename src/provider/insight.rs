use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::{
    error::Error,
    provider::{endpoint, HTTP},
    types::InsightTransactionsResponse,
};

const INVALID_ADDRESS_MESSAGE: &str = "Invalid address. Code:-5";

/// Insight explorer API shared by the Bitcoin-like chains.
#[derive(Debug, Clone)]
pub struct InsightApi {
    http: HTTP,
    url: Url,
}

impl InsightApi {
    pub fn new(http: HTTP, url: &str) -> Result<InsightApi, Error> {
        Ok(InsightApi {
            http,
            url: Url::parse(url)?,
        })
    }

    /// `None` when the explorer rejects the address as invalid.
    pub async fn get_address_transactions(
        &self,
        address: &str,
        page: u32,
    ) -> Result<Option<InsightTransactionsResponse>, Error> {
        let mut url = endpoint(&self.url, &["txs"])?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("pageNum", &page.to_string());

        debug!("{}", &url);
        let response = self.http.http.get(url).send().await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let message = response.text().await?;

            if message.trim() == INVALID_ADDRESS_MESSAGE {
                return Ok(None);
            }

            return Err(Error::UpstreamError(format!(
                "Insight API rejected address {}: {}",
                address, message
            )));
        }

        let json = response
            .error_for_status()?
            .json::<InsightTransactionsResponse>()
            .await?;

        Ok(Some(json))
    }
}

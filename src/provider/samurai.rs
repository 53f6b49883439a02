use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::Error,
    model::{decode_continuation, encode_continuation, PaginatedList},
    provider::{endpoint, HTTP},
    types::{
        SamuraiErc20TransfersRequest, SamuraiOperation, SamuraiOperationsHistory,
    },
};

pub const SAMURAI_PAGE_SIZE: usize = 1000;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SamuraiContinuation {
    start: usize,
}

/// Ethereum indexer client. Pages are addressed by item offset.
#[derive(Debug, Clone)]
pub struct SamuraiClient {
    http: HTTP,
    url: Url,
}

impl SamuraiClient {
    pub fn new(http: HTTP, url: &str) -> Result<SamuraiClient, Error> {
        Ok(SamuraiClient {
            http,
            url: Url::parse(url)?,
        })
    }

    pub async fn get_operations_history(
        &self,
        address: &str,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<SamuraiOperation>, Error> {
        let start = Self::start(continuation)?;
        let mut url = endpoint(&self.url, &["api", "AddressHistory", address])?;
        url.query_pairs_mut()
            .append_pair("Count", &SAMURAI_PAGE_SIZE.to_string())
            .append_pair("Start", &start.to_string());

        let response = self
            .http
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<SamuraiOperationsHistory>()
            .await?;

        Self::page(start, response.history)
    }

    pub async fn get_erc20_operations_history(
        &self,
        address: &str,
        continuation: Option<&str>,
    ) -> Result<PaginatedList<SamuraiOperation>, Error> {
        let start = Self::start(continuation)?;
        let mut url = endpoint(
            &self.url,
            &["api", "Erc20TransferHistory", "getErc20Transfers", "v2"],
        )?;
        url.query_pairs_mut()
            .append_pair("count", &SAMURAI_PAGE_SIZE.to_string())
            .append_pair("start", &start.to_string());

        let operations = self
            .http
            .http
            .post(url)
            .json(&SamuraiErc20TransfersRequest {
                asset_holder: address,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<SamuraiOperation>>()
            .await?;

        Self::page(start, operations)
    }

    fn start(continuation: Option<&str>) -> Result<usize, Error> {
        Ok(decode_continuation::<SamuraiContinuation>(continuation)?
            .unwrap_or_default()
            .start)
    }

    fn page(
        start: usize,
        items: Vec<SamuraiOperation>,
    ) -> Result<PaginatedList<SamuraiOperation>, Error> {
        let continuation = if items.len() < SAMURAI_PAGE_SIZE {
            None
        } else {
            Some(encode_continuation(&SamuraiContinuation {
                start: start + items.len(),
            })?)
        };

        Ok(PaginatedList::new(continuation, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operations(count: usize) -> Vec<SamuraiOperation> {
        (0..count)
            .map(|i| SamuraiOperation {
                transaction_hash: format!("0x{:x}", i),
                to: None,
            })
            .collect()
    }

    #[test]
    fn short_page_ends_stream() {
        let page = SamuraiClient::page(2000, operations(10)).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn full_page_continues_at_offset() {
        let page = SamuraiClient::page(1000, operations(SAMURAI_PAGE_SIZE)).unwrap();
        assert_eq!(page.continuation.as_deref(), Some(r#"{"start":2000}"#));
        assert_eq!(SamuraiClient::start(page.continuation.as_deref()).unwrap(), 2000);
        assert_eq!(SamuraiClient::start(None).unwrap(), 0);
    }
}

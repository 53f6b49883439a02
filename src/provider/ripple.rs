use serde_json::Value;
use url::Url;

use crate::{
    error::Error,
    provider::HTTP,
    types::{
        RippleAccountTxParams, RippleAccountTxResult, RippleRequest,
        RippleResponse, RippleTransaction,
    },
};

/// rippled JSON-RPC client.
#[derive(Debug, Clone)]
pub struct RippleRpc {
    http: HTTP,
    url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl RippleRpc {
    pub fn new(
        http: HTTP,
        url: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<RippleRpc, Error> {
        Ok(RippleRpc {
            http,
            url: Url::parse(url)?,
            username,
            password,
        })
    }

    pub async fn account_tx(
        &self,
        account: &str,
        marker: Option<Value>,
    ) -> Result<RippleAccountTxResult, Error> {
        let request = RippleRequest {
            method: "account_tx",
            params: vec![RippleAccountTxParams {
                account: account.to_owned(),
                ledger_index_min: -1,
                ledger_index_max: -1,
                forward: true,
                marker,
            }],
        };

        let mut builder = self.http.http.post(self.url.clone()).json(&request);

        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_ref());
        }

        let response = builder
            .send()
            .await?
            .error_for_status()?
            .json::<RippleResponse<RippleAccountTxResult>>()
            .await?;

        let result = response.result;

        if let Some(error) = result.error.as_ref().filter(|e| !e.is_empty()) {
            return Err(Error::UpstreamError(format!(
                "XRP request error: {}",
                result.error_message.as_ref().unwrap_or(error)
            )));
        }

        Ok(result)
    }

    /// Full account history, following ledger markers to the end.
    pub async fn get_transactions(
        &self,
        account: &str,
    ) -> Result<Vec<RippleTransaction>, Error> {
        let mut transactions = Vec::new();
        let mut marker = None;

        loop {
            let result = self.account_tx(account, marker).await?;
            transactions.extend(result.transactions);

            marker = result.marker.filter(|marker| !marker.is_null());

            if marker.is_none() {
                break;
            }
        }

        Ok(transactions)
    }
}

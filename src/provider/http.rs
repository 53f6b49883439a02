use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{configuration::Config, error::Error};

#[derive(Debug, Clone)]
pub struct HTTP {
    pub http: Client,
}

impl HTTP {
    pub fn new(config: &Config) -> Result<HTTP, Error> {
        let http = match Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                return Err(Error::ReqwestError(e));
            },
        };

        Ok(HTTP { http })
    }
}

/// Appends path segments to a service base url.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|_| {
            Error::ConfigurationError(format!("invalid service url: {}", base))
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::endpoint;

    #[test]
    fn appends_segments() {
        let base = Url::parse("https://insight.example.com/api/").unwrap();
        let url = endpoint(&base, &["txs"]).unwrap();
        assert_eq!(url.as_str(), "https://insight.example.com/api/txs");

        let base = Url::parse("http://samurai:5000").unwrap();
        let url = endpoint(&base, &["api", "AddressHistory", "0xab"]).unwrap();
        assert_eq!(url.as_str(), "http://samurai:5000/api/AddressHistory/0xab");
    }
}

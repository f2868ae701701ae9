use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::core::error::{CoreError, CoreResult};

/// Byte transport behind the content store.
///
/// The default implementation is [`HttpFetcher`]; tests and authenticated
/// transports supply their own.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> CoreResult<Vec<u8>>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> CoreResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}

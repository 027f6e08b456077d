use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::NetworkConfig;
use crate::error::{Result, SrtransError};

/// HTTP GET helper with an optional timeout and a fixed retry budget
pub struct HttpFetcher {
    client: Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("srtrans/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(SrtransError::Http)?;

        Ok(Self {
            client,
            retries: config.retries,
        })
    }

    /// Fetch a URL and return the raw body
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!("Request to {} failed ({}), retry {}/{}", url, e, attempt, self.retries);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetch a URL and decode the body as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let bytes = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_once(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SrtransError::Download(format!(
                "GET {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

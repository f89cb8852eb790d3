//! HTTP transport for catalog endpoints
//!
//! Sources talk to the network through the [`Transport`] trait so the fetch
//! logic can be exercised without a live server.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when requesting a catalog endpoint
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be decoded
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned status {status}")]
    Status { status: u16 },
}

/// Fetches a JSON array from a URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one GET request and decodes the body as a JSON array
    async fn get_json(&self, url: &str) -> Result<Vec<Value>, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("orcestra/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Vec<Value>, TransportError> {
        debug!(url, "Requesting catalog");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Vec<Value>>().await?)
    }
}

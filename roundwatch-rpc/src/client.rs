//! HTTP transport to a node.
//!
//! The gateway only needs "GET this path, give me the body", so that is the
//! whole [`Transport`] contract. [`HttpClient`] is the reqwest-backed
//! implementation; tests substitute canned responses.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, RpcError};
use crate::USER_AGENT;

/// Plain GET access to a configured host
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL every relative path is appended to
    fn host(&self) -> &str;

    /// GET `relative_url` and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`RpcError::Status`] carrying the body, since
    /// Tendermint reports JSON-RPC errors with HTTP 500.
    async fn get_plain(&self, relative_url: &str) -> Result<String>;
}

/// reqwest-backed transport with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    host: String,
    invoker: String,
}

impl HttpClient {
    pub fn new(host: &str, invoker: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(RpcError::Client)?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            invoker: invoker.to_string(),
        })
    }

    pub fn full_url(&self, relative_url: &str) -> String {
        format!("{}{}", self.host, relative_url)
    }
}

#[async_trait]
impl Transport for HttpClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn get_plain(&self, relative_url: &str) -> Result<String> {
        let url = self.full_url(relative_url);
        let start = Instant::now();

        log::debug!("[{}] Doing a query to {}", self.invoker, url);

        let res = match self.client.get(&url).send().await {
            Ok(res) => res,
            Err(source) => {
                log::warn!("[{}] Query to {} failed: {}", self.invoker, url, source);
                return Err(RpcError::Http { url, source });
            }
        };

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| RpcError::Http { url: url.clone(), source })?;

        log::debug!(
            "[{}] Query to {} finished with {} in {:?}",
            self.invoker,
            url,
            status,
            start.elapsed()
        );

        if !status.is_success() {
            return Err(RpcError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

//! RPC error types

use thiserror::Error;

/// Errors raised while talking to a node
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Node returned an error: {message} ({data})")]
    Node { message: String, data: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid block height delta: {0}")]
    InvalidBlockDelta(i64),

    #[error("ABCI query {path} failed with code {code}: {log}")]
    Abci { path: String, code: u32, log: String },
}

impl RpcError {
    /// Whether the node-provided part of this error contains `needle`.
    ///
    /// Only the error object and non-2xx bodies are inspected; transport
    /// and decode failures never match.
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            RpcError::Status { body, .. } => body.contains(needle),
            RpcError::Node { message, data } => message.contains(needle) || data.contains(needle),
            RpcError::Abci { log, .. } => log.contains(needle),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;

//! Roundwatch RPC - read-only access to a Tendermint node
//!
//! Wraps the node's HTTP+JSON endpoints (`/consensus_state`, `/validators`,
//! `/dump_consensus_state`, `/status`, `/block`, `/abci_query`,
//! `/genesis_chunked`) behind a small gateway that the aggregator polls on
//! its own schedules.

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::{HttpClient, Transport};
pub use error::{Result, RpcError};
pub use gateway::NodeGateway;
pub use types::*;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("roundwatch/", env!("CARGO_PKG_VERSION"));

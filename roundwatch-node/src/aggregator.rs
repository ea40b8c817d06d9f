//! Per-category fetch groups.
//!
//! Each group is independent and side-effect free apart from the requests it
//! makes. Only the consensus group fans out, joining its two requests before
//! returning.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use roundwatch_rpc::{HttpClient, NodeGateway, RoundState, RpcError, TendermintValidator};
use roundwatch_state::{Category, ChainValidator, NodeStatus, Upgrade};
use thiserror::Error;

use crate::config::WatchSettings;
use crate::constants::INVOKER;
use crate::roster::{self, ValidatorRoster};

/// The one error surfaced by the consensus group
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching consensus state: {0}")]
    Consensus(#[source] RpcError),

    #[error("Error fetching validators: {0}")]
    Validators(#[source] RpcError),
}

impl FetchError {
    /// Error slot this failure belongs in
    pub fn category(&self) -> Category {
        match self {
            FetchError::Consensus(_) => Category::Consensus,
            FetchError::Validators(_) => Category::Validators,
        }
    }
}

pub struct Aggregator {
    gateway: NodeGateway,
    roster: Arc<dyn ValidatorRoster>,
    halt_height: Option<i64>,
}

impl Aggregator {
    pub fn new(gateway: NodeGateway, roster: Arc<dyn ValidatorRoster>, halt_height: Option<i64>) -> Self {
        Self {
            gateway,
            roster,
            halt_height,
        }
    }

    pub fn from_settings(settings: &WatchSettings) -> Result<Self> {
        let client = HttpClient::new(&settings.rpc_host, INVOKER, settings.request_timeout)?;
        let gateway = NodeGateway::new(Arc::new(client)).with_blocks_behind(settings.blocks_behind);
        let roster = roster::from_settings(settings)?;

        Ok(Self::new(gateway, roster, settings.halt_height))
    }

    pub fn gateway(&self) -> &NodeGateway {
        &self.gateway
    }

    /// Round state and the node's validator list, fetched concurrently.
    ///
    /// Both requests always run to completion. When both fail, the consensus
    /// error is the one returned.
    pub async fn fetch_consensus_and_votes(
        &self,
    ) -> std::result::Result<(RoundState, Vec<TendermintValidator>), FetchError> {
        let (consensus, validators) = tokio::join!(self.gateway.get_consensus_state(), self.gateway.get_validators());

        let consensus = consensus.map_err(FetchError::Consensus)?;
        let validators = validators.map_err(FetchError::Validators)?;

        Ok((consensus, validators))
    }

    pub async fn fetch_chain_validators(&self) -> roster::Result<Vec<ChainValidator>> {
        self.roster.get_validators().await
    }

    /// A configured halt height replaces the roster's plan entirely.
    pub async fn fetch_upgrade(&self) -> roster::Result<Option<Upgrade>> {
        if let Some(height) = self.halt_height {
            return Ok(Some(Upgrade::halt(height)));
        }

        self.roster.get_upgrade_plan().await
    }

    pub async fn fetch_status(&self) -> roundwatch_rpc::Result<NodeStatus> {
        self.gateway.get_status().await.map(NodeStatus::from)
    }

    pub async fn fetch_block_time(&self) -> roundwatch_rpc::Result<Duration> {
        self.gateway.get_block_time().await
    }
}

//! Semantic queries against a Tendermint node.
//!
//! Every call is a single attempt: failures go straight back to the caller,
//! which records them and retries on its next tick. The one recovered error
//! is the genesis window, where `/validators` has no set for the current
//! height yet and the validator list is read from the consensus dump.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::de::DeserializeOwned;

use crate::client::Transport;
use crate::error::{Result, RpcError};
use crate::types::{
    AbciQueryResult, BlockHeader, BlockResult, ConsensusStateResult, DumpConsensusStateResult,
    GenesisChunkResult, RoundState, RpcResponse, StatusResult, TendermintValidator, ValidatorsResult,
};

/// Page size for `/validators`; Tendermint caps `per_page` at 100
pub const VALIDATORS_PER_PAGE: usize = 100;

/// Error text a node returns for `/validators` before the first block exists
pub const NO_VALIDATOR_SET_ERROR: &str = "could not find validator set for height";

/// How far back the block time estimate looks by default
pub const DEFAULT_BLOCKS_BEHIND: i64 = 1000;

/// Read-only view of a node's RPC
#[derive(Clone)]
pub struct NodeGateway {
    transport: Arc<dyn Transport>,
    blocks_behind: i64,
}

impl NodeGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            blocks_behind: DEFAULT_BLOCKS_BEHIND,
        }
    }

    pub fn with_blocks_behind(mut self, blocks_behind: i64) -> Self {
        self.blocks_behind = blocks_behind.max(1);
        self
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    async fn get<T: DeserializeOwned>(&self, relative_url: &str) -> Result<T> {
        let body = self.transport.get_plain(relative_url).await?;
        let response: RpcResponse<T> =
            serde_json::from_str(&body).map_err(|source| RpcError::Decode {
                url: format!("{}{}", self.transport.host(), relative_url),
                source,
            })?;

        response.into_result()
    }

    /// Current round state, including per-round vote strings
    pub async fn get_consensus_state(&self) -> Result<RoundState> {
        let result: ConsensusStateResult = self.get("/consensus_state").await?;
        Ok(result.round_state)
    }

    /// Full validator set, paginated, with the genesis fallback
    pub async fn get_validators(&self) -> Result<Vec<TendermintValidator>> {
        match self.get_validators_paginated().await {
            Err(err) if err.mentions(NO_VALIDATOR_SET_ERROR) => {
                log::info!("No validator set for the current height yet, reading it from the consensus dump");
                self.get_validators_via_dump_state().await
            }
            other => other,
        }
    }

    async fn get_validators_paginated(&self) -> Result<Vec<TendermintValidator>> {
        let mut page = 1;
        let mut validators: Vec<TendermintValidator> = Vec::new();

        loop {
            let result = self.get_validators_at_page(page).await?;
            let total = result.total.parse::<usize>().map_err(|e| {
                RpcError::Malformed(format!("validators total {:?} is not a number: {}", result.total, e))
            })?;

            if result.validators.is_empty() && validators.len() < total {
                return Err(RpcError::Malformed(format!(
                    "page {} returned no validators with {} of {} fetched",
                    page,
                    validators.len(),
                    total
                )));
            }

            validators.extend(result.validators);

            if validators.len() >= total {
                break;
            }

            page += 1;
        }

        Ok(validators)
    }

    pub async fn get_validators_at_page(&self, page: usize) -> Result<ValidatorsResult> {
        self.get(&format!("/validators?page={}&per_page={}", page, VALIDATORS_PER_PAGE))
            .await
    }

    /// Validator list embedded in `/dump_consensus_state`
    pub async fn get_validators_via_dump_state(&self) -> Result<Vec<TendermintValidator>> {
        let result: DumpConsensusStateResult = self.get("/dump_consensus_state").await?;
        Ok(result.round_state.validators.validators)
    }

    /// Run an ABCI query with a protobuf-encoded request and return the raw
    /// protobuf response bytes. A non-zero response code is an error.
    pub async fn abci_query(&self, path: &str, data: &[u8]) -> Result<Vec<u8>> {
        let result: AbciQueryResult = self.get(&abci_query_url(path, data)).await?;
        let response = result.response;

        if response.code != 0 {
            return Err(RpcError::Abci {
                path: path.to_string(),
                code: response.code,
                log: response.log,
            });
        }

        match response.value {
            Some(value) => general_purpose::STANDARD
                .decode(value.as_bytes())
                .map_err(|e| RpcError::Malformed(format!("ABCI value of {} is not base64: {}", path, e))),
            None => Ok(Vec::new()),
        }
    }

    /// The genesis document, reassembled from `/genesis_chunked`
    pub async fn get_genesis(&self) -> Result<Vec<u8>> {
        let mut genesis = Vec::new();
        let mut chunk = 0u64;

        loop {
            let result: GenesisChunkResult = self.get(&format!("/genesis_chunked?chunk={}", chunk)).await?;
            let total = result.total.parse::<u64>().map_err(|e| {
                RpcError::Malformed(format!("genesis chunk total {:?} is not a number: {}", result.total, e))
            })?;
            let data = general_purpose::STANDARD
                .decode(result.data.as_bytes())
                .map_err(|e| RpcError::Malformed(format!("genesis chunk {} is not base64: {}", chunk, e)))?;

            log::debug!("Fetched genesis chunk {} of {}", chunk + 1, total);
            genesis.extend_from_slice(&data);

            if chunk + 1 >= total {
                break;
            }

            chunk += 1;
        }

        Ok(genesis)
    }

    pub async fn get_status(&self) -> Result<StatusResult> {
        self.get("/status").await
    }

    /// Block header at `height`, or the latest one
    pub async fn get_block(&self, height: Option<i64>) -> Result<BlockHeader> {
        let url = match height {
            Some(height) => format!("/block?height={}", height),
            None => "/block".to_string(),
        };

        let result: BlockResult = self.get(&url).await?;
        Ok(result.block.header)
    }

    /// Average block time over the last `blocks_behind` blocks.
    ///
    /// The older height is clamped to 1; a non-positive height delta (e.g.
    /// the chain is at height 1) is rejected rather than divided by.
    pub async fn get_block_time(&self) -> Result<Duration> {
        let latest = self.get_block(None).await?;
        let latest_height = latest.parsed_height()?;

        let older_height = (latest_height - self.blocks_behind).max(1);
        let older = self.get_block(Some(older_height)).await?;
        let older_height = older.parsed_height()?;

        average_block_time(&latest, latest_height, &older, older_height)
    }
}

/// `/abci_query` URL with the path quoted and the request hex-encoded
pub fn abci_query_url(path: &str, data: &[u8]) -> String {
    format!(
        "/abci_query?path=%22{}%22&data=0x{}",
        path.replace('/', "%2F"),
        hex::encode(data)
    )
}

fn average_block_time(
    latest: &BlockHeader,
    latest_height: i64,
    older: &BlockHeader,
    older_height: i64,
) -> Result<Duration> {
    let blocks = latest_height - older_height;
    if blocks <= 0 {
        return Err(RpcError::InvalidBlockDelta(blocks));
    }

    let elapsed = latest
        .time
        .signed_duration_since(older.time)
        .to_std()
        .map_err(|_| {
            RpcError::Malformed(format!(
                "block {} is older than block {}",
                latest_height, older_height
            ))
        })?;

    let nanos = elapsed.as_nanos() / blocks as u128;
    Ok(Duration::from_nanos(nanos as u64))
}

//! RPC types - response structures returned by a Tendermint node

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RpcError};

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: RpcId,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl<T> RpcResponse<T> {
    /// Unwrap the envelope: the error object wins over a result.
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            let data = error.data_string();
            return Err(RpcError::Node {
                message: error.message,
                data,
            });
        }

        self.result
            .ok_or_else(|| RpcError::Malformed("response has neither result nor error".to_string()))
    }
}

/// JSON-RPC ID (can be number or string)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    String(String),
    #[default]
    Null,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    /// Tendermint puts the human readable cause in `data` as a plain string.
    pub fn data_string(&self) -> String {
        match &self.data {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

// ============================================================================
// /consensus_state
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusStateResult {
    pub round_state: RoundState,
}

/// Round state as reported by `/consensus_state`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// `"H/R/S"`, e.g. `"1234/0/3"`
    #[serde(rename = "height/round/step")]
    pub height_round_step: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub height_vote_set: Vec<HeightVoteSet>,
    #[serde(default)]
    pub proposer: Proposer,
}

/// Votes of one round, index-aligned with the validator set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightVoteSet {
    pub round: i64,
    #[serde(default)]
    pub prevotes: Vec<String>,
    #[serde(default)]
    pub precommits: Vec<String>,
    #[serde(default)]
    pub prevotes_bit_array: String,
    #[serde(default)]
    pub precommits_bit_array: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Proposer {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub index: i64,
}

// ============================================================================
// /validators and /dump_consensus_state
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorsResult {
    #[serde(default)]
    pub block_height: String,
    #[serde(default)]
    pub count: String,
    pub total: String,
    #[serde(default)]
    pub validators: Vec<TendermintValidator>,
}

/// Validator as listed by the node; voting power is a decimal string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TendermintValidator {
    pub address: String,
    pub voting_power: String,
    #[serde(default)]
    pub pub_key: Option<ValidatorPubKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatorPubKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConsensusStateResult {
    pub round_state: DumpRoundState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpRoundState {
    pub validators: DumpValidatorSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpValidatorSet {
    #[serde(default)]
    pub validators: Vec<TendermintValidator>,
}

// ============================================================================
// /status
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResult {
    pub node_info: NodeInfo,
    #[serde(default)]
    pub validator_info: ValidatorInfo,
    #[serde(default)]
    pub sync_info: SyncInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorInfo {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncInfo {
    #[serde(default)]
    pub latest_block_height: String,
    #[serde(default)]
    pub catching_up: bool,
}

// ============================================================================
// /block
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResult {
    pub block: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Decimal string, as every int64 in the Tendermint JSON encoding
    pub height: String,
    pub time: DateTime<Utc>,
}

impl BlockHeader {
    pub fn parsed_height(&self) -> Result<i64> {
        self.height
            .parse::<i64>()
            .map_err(|e| RpcError::Malformed(format!("block height {:?} is not a number: {}", self.height, e)))
    }
}

// ============================================================================
// /abci_query and /genesis_chunked
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbciQueryResult {
    pub response: AbciResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbciResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    /// Base64 protobuf payload; absent on failure
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisChunkResult {
    pub chunk: String,
    pub total: String,
    /// Base64 slice of the genesis JSON document
    pub data: String,
}

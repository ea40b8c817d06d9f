//! Sources of validator identity and scheduled upgrades.
//!
//! The node's own RPC only knows consensus addresses; a roster maps them to
//! monikers and knows about governance upgrade plans. Which roster is used
//! is decided once, from validated settings.

pub mod address;
pub mod cosmos_lcd;
pub mod cosmos_rpc;
pub mod noop;
pub mod proto;

use std::sync::Arc;

use async_trait::async_trait;
use roundwatch_rpc::{HttpClient, NodeGateway, RpcError};
use roundwatch_state::{ChainValidator, Upgrade};
use thiserror::Error;

use crate::config::{ChainType, WatchSettings};
use crate::constants::INVOKER;

pub use address::AddressError;
pub use cosmos_lcd::CosmosLcdRoster;
pub use cosmos_rpc::{CosmosRpcRoster, Provider};
pub use noop::NoopRoster;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Invalid consensus pubkey of {operator}: {reason}")]
    InvalidConsensusPubkey { operator: String, reason: String },

    #[error("Invalid upgrade height {0:?}")]
    InvalidUpgradeHeight(String),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("Could not decode {path} response: {source}")]
    Proto {
        path: String,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Could not read validators from genesis: {0}")]
    Genesis(String),
}

pub type Result<T> = std::result::Result<T, RosterError>;

#[async_trait]
pub trait ValidatorRoster: Send + Sync {
    async fn get_validators(&self) -> Result<Vec<ChainValidator>>;

    /// `None` when no upgrade is scheduled
    async fn get_upgrade_plan(&self) -> Result<Option<Upgrade>>;
}

/// Roster entry for a validator's ed25519 consensus pubkey
pub(crate) fn chain_validator(operator_address: String, moniker: String, pubkey: &[u8]) -> Result<ChainValidator> {
    let raw = address::consensus_address_bytes(pubkey);
    let raw_address = address::valcons_address(&operator_address, &raw)?;

    Ok(ChainValidator {
        moniker,
        address: hex::encode_upper(&raw),
        raw_address,
        assigned_address: None,
    })
}

/// Build the roster the settings ask for.
pub fn from_settings(settings: &WatchSettings) -> Result<Arc<dyn ValidatorRoster>> {
    match &settings.chain_type {
        ChainType::Tendermint => Ok(Arc::new(NoopRoster)),
        ChainType::CosmosLcd { lcd_host } => {
            let client = HttpClient::new(lcd_host, INVOKER, settings.request_timeout)?;
            Ok(Arc::new(CosmosLcdRoster::new(Arc::new(client))))
        }
        ChainType::CosmosRpc { consumer } => {
            let client = HttpClient::new(&settings.rpc_host, INVOKER, settings.request_timeout)?;
            let provider = match consumer {
                Some(consumer) => {
                    let provider_client =
                        HttpClient::new(&consumer.provider_rpc_host, INVOKER, settings.request_timeout)?;
                    Some(Provider {
                        gateway: NodeGateway::new(Arc::new(provider_client)),
                        consumer_chain_id: consumer.consumer_chain_id.clone(),
                    })
                }
                None => None,
            };

            Ok(Arc::new(CosmosRpcRoster::new(NodeGateway::new(Arc::new(client)), provider)))
        }
    }
}

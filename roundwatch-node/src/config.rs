use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants::*;
use crate::scheduler::RefreshIntervals;

/// On-disk and command-line configuration. Every field is optional; unset
/// fields fall back to the defaults in [`crate::constants`].
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    pub rpc_host: Option<String>,
    pub chain_type: Option<String>,
    pub lcd_host: Option<String>,
    pub provider_rpc_host: Option<String>,
    pub consumer_chain_id: Option<String>,
    pub refresh_rate_ms: Option<u64>,
    pub validators_refresh_rate_ms: Option<u64>,
    pub chain_info_refresh_rate_ms: Option<u64>,
    pub upgrade_refresh_rate_ms: Option<u64>,
    pub block_time_refresh_rate_ms: Option<u64>,
    pub blocks_behind: Option<i64>,
    pub halt_height: Option<i64>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub logs_path: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown chain type {0:?}, expected \"tendermint\", \"cosmos-rpc\" or \"cosmos-lcd\"")]
    UnknownChainType(String),

    #[error("Chain type cosmos-lcd requires lcd_host")]
    MissingLcdHost,

    #[error("A consumer chain requires consumer_chain_id along with provider_rpc_host")]
    MissingConsumerChainId,

    #[error("consumer_chain_id requires provider_rpc_host")]
    MissingProviderRpcHost,

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("blocks_behind must be at least 1, got {0}")]
    InvalidBlocksBehind(i64),

    #[error("halt_height must be positive, got {0}")]
    InvalidHaltHeight(i64),
}

/// Where validator monikers and upgrade plans come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainType {
    Tendermint,
    /// ABCI queries on the watched node, or on the provider for a consumer chain
    CosmosRpc { consumer: Option<ConsumerChain> },
    CosmosLcd { lcd_host: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerChain {
    pub provider_rpc_host: String,
    pub consumer_chain_id: String,
}

/// Validated configuration, ready to build the watcher from
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    pub rpc_host: String,
    pub chain_type: ChainType,
    pub intervals: RefreshIntervals,
    pub blocks_behind: i64,
    pub halt_height: Option<i64>,
    pub request_timeout: Duration,
    pub log_level: Option<String>,
    pub logs_path: Option<PathBuf>,
}

impl Config {
    pub fn from_filepath(path: &Path) -> Result<Config> {
        let file = fs::File::open(path).context("Failed to open config file")?;
        let mut config: Config = serde_json::from_reader(file).context("Failed to parse config file")?;

        if let Some(logs_path) = config.logs_path.take() {
            let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
            config.logs_path = Some(to_absolute_path(config_dir, logs_path.as_path())?);
        }

        Ok(config)
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            rpc_host: overrides.rpc_host.or(self.rpc_host),
            chain_type: overrides.chain_type.or(self.chain_type),
            lcd_host: overrides.lcd_host.or(self.lcd_host),
            provider_rpc_host: overrides.provider_rpc_host.or(self.provider_rpc_host),
            consumer_chain_id: overrides.consumer_chain_id.or(self.consumer_chain_id),
            refresh_rate_ms: overrides.refresh_rate_ms.or(self.refresh_rate_ms),
            validators_refresh_rate_ms: overrides.validators_refresh_rate_ms.or(self.validators_refresh_rate_ms),
            chain_info_refresh_rate_ms: overrides.chain_info_refresh_rate_ms.or(self.chain_info_refresh_rate_ms),
            upgrade_refresh_rate_ms: overrides.upgrade_refresh_rate_ms.or(self.upgrade_refresh_rate_ms),
            block_time_refresh_rate_ms: overrides.block_time_refresh_rate_ms.or(self.block_time_refresh_rate_ms),
            blocks_behind: overrides.blocks_behind.or(self.blocks_behind),
            halt_height: overrides.halt_height.or(self.halt_height),
            request_timeout_secs: overrides.request_timeout_secs.or(self.request_timeout_secs),
            log_level: overrides.log_level.or(self.log_level),
            logs_path: overrides.logs_path.or(self.logs_path),
        }
    }

    pub fn validate(&self) -> std::result::Result<WatchSettings, ConfigError> {
        let chain_type = match self.chain_type.as_deref().unwrap_or(DEFAULT_CHAIN_TYPE) {
            "tendermint" => ChainType::Tendermint,
            "cosmos-rpc" => ChainType::CosmosRpc {
                consumer: self.consumer_chain()?,
            },
            "cosmos-lcd" => match self.lcd_host.as_deref() {
                Some(host) if !host.trim().is_empty() => ChainType::CosmosLcd {
                    lcd_host: host.trim_end_matches('/').to_string(),
                },
                _ => return Err(ConfigError::MissingLcdHost),
            },
            other => return Err(ConfigError::UnknownChainType(other.to_string())),
        };

        let intervals = RefreshIntervals {
            consensus: interval("refresh_rate_ms", self.refresh_rate_ms, DEFAULT_REFRESH_RATE_MS)?,
            chain_validators: interval(
                "validators_refresh_rate_ms",
                self.validators_refresh_rate_ms,
                DEFAULT_VALIDATORS_REFRESH_RATE_MS,
            )?,
            status: interval(
                "chain_info_refresh_rate_ms",
                self.chain_info_refresh_rate_ms,
                DEFAULT_CHAIN_INFO_REFRESH_RATE_MS,
            )?,
            upgrade: interval(
                "upgrade_refresh_rate_ms",
                self.upgrade_refresh_rate_ms,
                DEFAULT_UPGRADE_REFRESH_RATE_MS,
            )?,
            block_time: interval(
                "block_time_refresh_rate_ms",
                self.block_time_refresh_rate_ms,
                DEFAULT_BLOCK_TIME_REFRESH_RATE_MS,
            )?,
        };

        let blocks_behind = self.blocks_behind.unwrap_or(DEFAULT_BLOCKS_BEHIND);
        if blocks_behind < 1 {
            return Err(ConfigError::InvalidBlocksBehind(blocks_behind));
        }

        if let Some(height) = self.halt_height {
            if height < 1 {
                return Err(ConfigError::InvalidHaltHeight(height));
            }
        }

        let timeout_secs = self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("request_timeout_secs"));
        }

        Ok(WatchSettings {
            rpc_host: self
                .rpc_host
                .clone()
                .unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            chain_type,
            intervals,
            blocks_behind,
            halt_height: self.halt_height,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level: self.log_level.clone(),
            logs_path: self.logs_path.clone(),
        })
    }
}

impl Config {
    fn consumer_chain(&self) -> std::result::Result<Option<ConsumerChain>, ConfigError> {
        let provider = non_empty(&self.provider_rpc_host);
        let chain_id = non_empty(&self.consumer_chain_id);

        match (provider, chain_id) {
            (Some(provider), Some(chain_id)) => Ok(Some(ConsumerChain {
                provider_rpc_host: provider.trim_end_matches('/').to_string(),
                consumer_chain_id: chain_id.to_string(),
            })),
            (Some(_), None) => Err(ConfigError::MissingConsumerChainId),
            (None, Some(_)) => Err(ConfigError::MissingProviderRpcHost),
            (None, None) => Ok(None),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn interval(name: &'static str, value: Option<u64>, default: u64) -> std::result::Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::ZeroInterval(name)),
        ms => Ok(Duration::from_millis(ms)),
    }
}

pub fn to_absolute_path(base_dir: &Path, relative_path: &Path) -> Result<PathBuf> {
    if relative_path.is_absolute() {
        return Ok(relative_path.to_path_buf());
    }

    let base_dir = base_dir.canonicalize()?;
    Ok(base_dir.join(relative_path))
}

//! Defaults used when neither the config file nor the command line set a value.

pub const DEFAULT_RPC_HOST: &str = "http://localhost:26657";

pub const DEFAULT_CHAIN_TYPE: &str = "tendermint";

/// Consensus state and votes
pub const DEFAULT_REFRESH_RATE_MS: u64 = 1_000;

/// Validator roster (monikers)
pub const DEFAULT_VALIDATORS_REFRESH_RATE_MS: u64 = 180_000;

/// Node status
pub const DEFAULT_CHAIN_INFO_REFRESH_RATE_MS: u64 = 300_000;

pub const DEFAULT_UPGRADE_REFRESH_RATE_MS: u64 = 1_800_000;

pub const DEFAULT_BLOCK_TIME_REFRESH_RATE_MS: u64 = 1_800_000;

pub const DEFAULT_BLOCKS_BEHIND: i64 = roundwatch_rpc::gateway::DEFAULT_BLOCKS_BEHIND;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// How often the terminal is redrawn from the state snapshot
pub const DEFAULT_DRAW_INTERVAL_MS: u64 = 500;

/// Identifies the dashboard in the User-Agent of outgoing requests
pub const INVOKER: &str = "roundwatch";

/// Name of the log file inside `logs_path`
pub const LOG_FILE_NAME: &str = "roundwatch.log";

//! Roundwatch Node
//!
//! Everything between the node's RPC and the reconciliation state: config,
//! validator roster sources, per-category fetches and the refresh loops
//! that drive them.

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod logging;
pub mod roster;
pub mod scheduler;

pub use aggregator::{Aggregator, FetchError};
pub use config::{ChainType, Config, ConfigError, ConsumerChain, WatchSettings};
pub use roster::ValidatorRoster;
pub use scheduler::{PauseSwitch, RefreshIntervals, Scheduler};

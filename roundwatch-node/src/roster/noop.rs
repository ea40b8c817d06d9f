use async_trait::async_trait;
use roundwatch_state::{ChainValidator, Upgrade};

use super::{Result, ValidatorRoster};

/// Roster for plain Tendermint chains: no monikers, no upgrade plans
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRoster;

#[async_trait]
impl ValidatorRoster for NoopRoster {
    async fn get_validators(&self) -> Result<Vec<ChainValidator>> {
        Ok(Vec::new())
    }

    async fn get_upgrade_plan(&self) -> Result<Option<Upgrade>> {
        Ok(None)
    }
}

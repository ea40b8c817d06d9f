//! Roster read through ABCI queries on Tendermint RPC.
//!
//! On a consumer chain the validator set lives on the provider, so it is
//! read there, and each validator's consumer key is looked up on the
//! provider as well. Before the first block the staking module cannot be
//! queried; the validators are then read from the genesis file.

use async_trait::async_trait;
use futures::future::join_all;
use prost::Message;
use roundwatch_rpc::NodeGateway;
use roundwatch_state::{ChainValidator, Upgrade};
use serde::Deserialize;

use super::address::hex_address;
use super::cosmos_lcd::StakingValidator;
use super::proto::{
    Ed25519PubKey, PageRequest, QueryCurrentPlanRequest, QueryCurrentPlanResponse, QueryValidatorConsumerAddrRequest,
    QueryValidatorConsumerAddrResponse, QueryValidatorsRequest, QueryValidatorsResponse, Validator,
    CONSUMER_ADDR_PATH, CURRENT_PLAN_PATH, ED25519_PUBKEY_TYPE, VALIDATORS_PATH,
};
use super::{chain_validator, Result, RosterError, ValidatorRoster};

const VALIDATORS_PAGE_LIMIT: u64 = 1000;

/// Error text of a staking query made before the chain's first block
pub const NO_FIRST_BLOCK_ERROR: &str = "please wait for first block";

/// Provider side of a consumer chain
pub struct Provider {
    pub gateway: NodeGateway,
    pub consumer_chain_id: String,
}

pub struct CosmosRpcRoster {
    gateway: NodeGateway,
    provider: Option<Provider>,
}

#[derive(Debug, Deserialize)]
struct Genesis {
    app_state: AppState,
}

#[derive(Debug, Deserialize)]
struct AppState {
    staking: StakingGenesis,
}

#[derive(Debug, Deserialize)]
struct StakingGenesis {
    #[serde(default)]
    validators: Vec<StakingValidator>,
}

impl CosmosRpcRoster {
    pub fn new(gateway: NodeGateway, provider: Option<Provider>) -> Self {
        Self { gateway, provider }
    }

    /// Where the validator set is read from
    fn validators_gateway(&self) -> &NodeGateway {
        match &self.provider {
            Some(provider) => &provider.gateway,
            None => &self.gateway,
        }
    }

    async fn query<Req: Message, Resp: Message + Default>(
        gateway: &NodeGateway,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let bytes = gateway.abci_query(path, &request.encode_to_vec()).await?;
        Resp::decode(bytes.as_slice()).map_err(|source| RosterError::Proto {
            path: path.to_string(),
            source,
        })
    }

    async fn get_staking_validators(&self) -> Result<Vec<ChainValidator>> {
        let request = QueryValidatorsRequest {
            status: String::new(),
            pagination: Some(PageRequest {
                limit: VALIDATORS_PAGE_LIMIT,
                ..Default::default()
            }),
        };

        let response: QueryValidatorsResponse =
            Self::query(self.validators_gateway(), VALIDATORS_PATH, &request).await?;

        response.validators.into_iter().map(parse_validator).collect()
    }

    async fn get_genesis_validators(&self) -> Result<Vec<ChainValidator>> {
        log::info!("Chain has no blocks yet, reading validators from genesis");

        let bytes = self.gateway.get_genesis().await?;
        let genesis: Genesis = serde_json::from_slice(&bytes).map_err(|e| RosterError::Genesis(e.to_string()))?;

        let validators = genesis.app_state.staking.validators;
        if validators.is_empty() {
            return Err(RosterError::Genesis("no staking validators in genesis".to_string()));
        }

        log::info!("Read {} validators from genesis", validators.len());
        validators.into_iter().map(StakingValidator::into_chain_validator).collect()
    }

    /// Fill in consumer keys. A failed lookup leaves that validator on its
    /// provider key.
    async fn assign_consumer_keys(provider: &Provider, validators: &mut [ChainValidator]) {
        let lookups = validators
            .iter()
            .map(|validator| Self::get_consumer_address(provider, &validator.raw_address));
        let assigned = join_all(lookups).await;

        for (validator, assigned) in validators.iter_mut().zip(assigned) {
            match assigned {
                Ok(address) => validator.assigned_address = address,
                Err(e) => log::error!("Could not fetch assigned key of {}: {}", validator.raw_address, e),
            }
        }
    }

    /// Hex consensus address the validator assigned on the consumer chain,
    /// `None` when it kept its provider key
    async fn get_consumer_address(provider: &Provider, provider_address: &str) -> Result<Option<String>> {
        let request = QueryValidatorConsumerAddrRequest {
            chain_id: provider.consumer_chain_id.clone(),
            provider_address: provider_address.to_string(),
        };
        let response: QueryValidatorConsumerAddrResponse =
            Self::query(&provider.gateway, CONSUMER_ADDR_PATH, &request).await?;

        if response.consumer_address.is_empty() {
            return Ok(None);
        }

        Ok(Some(hex_address(&response.consumer_address)?))
    }
}

fn parse_validator(validator: Validator) -> Result<ChainValidator> {
    let invalid = |reason: String| RosterError::InvalidConsensusPubkey {
        operator: validator.operator_address.clone(),
        reason,
    };

    let any = validator
        .consensus_pubkey
        .as_ref()
        .ok_or_else(|| invalid("missing".to_string()))?;

    if any.type_url != ED25519_PUBKEY_TYPE {
        return Err(invalid(format!("unsupported key type {}", any.type_url)));
    }

    let pubkey = Ed25519PubKey::decode(any.value.as_slice()).map_err(|e| invalid(e.to_string()))?;
    let moniker = validator
        .description
        .as_ref()
        .map(|description| description.moniker.clone())
        .unwrap_or_default();

    chain_validator(validator.operator_address.clone(), moniker, &pubkey.key)
}

#[async_trait]
impl ValidatorRoster for CosmosRpcRoster {
    async fn get_validators(&self) -> Result<Vec<ChainValidator>> {
        let mut validators = match self.get_staking_validators().await {
            Err(RosterError::Rpc(e)) if e.mentions(NO_FIRST_BLOCK_ERROR) => self.get_genesis_validators().await?,
            other => other?,
        };

        if let Some(provider) = &self.provider {
            Self::assign_consumer_keys(provider, &mut validators).await;
        }

        Ok(validators)
    }

    async fn get_upgrade_plan(&self) -> Result<Option<Upgrade>> {
        let response: QueryCurrentPlanResponse =
            Self::query(&self.gateway, CURRENT_PLAN_PATH, &QueryCurrentPlanRequest {}).await?;

        Ok(response.plan.map(|plan| Upgrade {
            name: plan.name,
            height: plan.height,
        }))
    }
}

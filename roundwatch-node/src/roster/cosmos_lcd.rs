//! Roster backed by a Cosmos SDK LCD (REST) endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use roundwatch_rpc::{RpcError, Transport};
use roundwatch_state::{ChainValidator, Upgrade};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use base64::{engine::general_purpose, Engine as _};

use super::{chain_validator, Result, RosterError, ValidatorRoster};

const VALIDATORS_URL: &str = "/cosmos/staking/v1beta1/validators?status=BOND_STATUS_BONDED&pagination.limit=1000";
const CURRENT_PLAN_URL: &str = "/cosmos/upgrade/v1beta1/current_plan";

#[derive(Debug, Deserialize)]
struct ValidatorsResponse {
    #[serde(default)]
    validators: Vec<StakingValidator>,
}

/// Staking validator in its JSON form, as served by the LCD and as listed in
/// a genesis file's `app_state.staking`
#[derive(Debug, Deserialize)]
pub(super) struct StakingValidator {
    operator_address: String,
    consensus_pubkey: ConsensusPubkey,
    #[serde(default)]
    description: Description,
}

impl StakingValidator {
    pub(super) fn into_chain_validator(self) -> Result<ChainValidator> {
        let pubkey = general_purpose::STANDARD
            .decode(&self.consensus_pubkey.key)
            .map_err(|e| RosterError::InvalidConsensusPubkey {
                operator: self.operator_address.clone(),
                reason: e.to_string(),
            })?;

        chain_validator(self.operator_address, self.description.moniker, &pubkey)
    }
}

#[derive(Debug, Deserialize)]
struct ConsensusPubkey {
    key: String,
}

#[derive(Debug, Default, Deserialize)]
struct Description {
    #[serde(default)]
    moniker: String,
}

#[derive(Debug, Deserialize)]
struct CurrentPlanResponse {
    plan: Option<Plan>,
}

#[derive(Debug, Deserialize)]
struct Plan {
    name: String,
    height: String,
}

pub struct CosmosLcdRoster {
    transport: Arc<dyn Transport>,
}

impl CosmosLcdRoster {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn get<T: DeserializeOwned>(&self, relative_url: &str) -> Result<T> {
        let body = self.transport.get_plain(relative_url).await?;
        serde_json::from_str(&body).map_err(|source| {
            RosterError::Rpc(RpcError::Decode {
                url: format!("{}{}", self.transport.host(), relative_url),
                source,
            })
        })
    }
}

#[async_trait]
impl ValidatorRoster for CosmosLcdRoster {
    async fn get_validators(&self) -> Result<Vec<ChainValidator>> {
        let response: ValidatorsResponse = self.get(VALIDATORS_URL).await?;

        response
            .validators
            .into_iter()
            .map(StakingValidator::into_chain_validator)
            .collect()
    }

    async fn get_upgrade_plan(&self) -> Result<Option<Upgrade>> {
        let response: CurrentPlanResponse = self.get(CURRENT_PLAN_URL).await?;

        let Some(plan) = response.plan else {
            return Ok(None);
        };

        let height = plan
            .height
            .parse::<i64>()
            .map_err(|_| RosterError::InvalidUpgradeHeight(plan.height.clone()))?;

        Ok(Some(Upgrade { name: plan.name, height }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticTransport {
        bodies: HashMap<&'static str, &'static str>,
    }

    #[async_trait]
    impl Transport for StaticTransport {
        fn host(&self) -> &str {
            "http://lcd"
        }

        async fn get_plain(&self, relative_url: &str) -> roundwatch_rpc::Result<String> {
            self.bodies
                .get(relative_url)
                .map(|body| body.to_string())
                .ok_or_else(|| RpcError::Status {
                    url: relative_url.to_string(),
                    status: 404,
                    body: "not found".to_string(),
                })
        }
    }

    fn roster(bodies: &[(&'static str, &'static str)]) -> CosmosLcdRoster {
        CosmosLcdRoster::new(Arc::new(StaticTransport {
            bodies: bodies.iter().cloned().collect(),
        }))
    }

    #[tokio::test]
    async fn test_get_validators() {
        let body = r#"{
            "validators": [
                {
                    "operator_address": "cosmosvaloper1qyqszqgpqyqszqgpqyqszqgpqyqszqgph84tp0",
                    "consensus_pubkey": {
                        "@type": "/cosmos.crypto.ed25519.PubKey",
                        "key": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
                    },
                    "description": { "moniker": "zero" }
                }
            ],
            "pagination": { "next_key": null, "total": "1" }
        }"#;

        let validators = roster(&[(VALIDATORS_URL, body)]).get_validators().await.unwrap();
        assert_eq!(
            validators,
            vec![ChainValidator {
                moniker: "zero".to_string(),
                address: "66687AADF862BD776C8FC18B8E9F8E2008971485".to_string(),
                raw_address: "cosmosvalcons1ve584t0cv27hwmy0cx9ca8uwyqyfw9y90lquj6".to_string(),
                assigned_address: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_operator_address_must_be_bech32() {
        let body = r#"{"validators": [{"operator_address": "cosmosvaloper1abc", "consensus_pubkey": {"key": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="}}]}"#;
        let err = roster(&[(VALIDATORS_URL, body)]).get_validators().await.unwrap_err();
        assert!(matches!(err, RosterError::Address(_)));
    }

    #[tokio::test]
    async fn test_bad_pubkey_is_an_error() {
        let body = r#"{"validators": [{"operator_address": "cosmosvaloper1abc", "consensus_pubkey": {"key": "%%%"}}]}"#;
        let err = roster(&[(VALIDATORS_URL, body)]).get_validators().await.unwrap_err();
        assert!(matches!(err, RosterError::InvalidConsensusPubkey { .. }));
    }

    #[tokio::test]
    async fn test_upgrade_plan() {
        let body = r#"{"plan": {"name": "v15", "time": "0001-01-01T00:00:00Z", "height": "18500000", "info": ""}}"#;
        let upgrade = roster(&[(CURRENT_PLAN_URL, body)]).get_upgrade_plan().await.unwrap();
        assert_eq!(
            upgrade,
            Some(Upgrade {
                name: "v15".to_string(),
                height: 18_500_000
            })
        );
    }

    #[tokio::test]
    async fn test_no_upgrade_plan() {
        let upgrade = roster(&[(CURRENT_PLAN_URL, r#"{"plan": null}"#)])
            .get_upgrade_plan()
            .await
            .unwrap();
        assert_eq!(upgrade, None);
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let err = roster(&[]).get_upgrade_plan().await.unwrap_err();
        assert!(matches!(err, RosterError::Rpc(RpcError::Status { status: 404, .. })));
    }
}

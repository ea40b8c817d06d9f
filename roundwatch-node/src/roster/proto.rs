//! The few Cosmos SDK and Interchain Security query messages the RPC roster
//! sends over `/abci_query`. Only the fields read here are declared; unknown
//! fields are skipped when decoding.

use prost::Message;

pub const VALIDATORS_PATH: &str = "/cosmos.staking.v1beta1.Query/Validators";
pub const CURRENT_PLAN_PATH: &str = "/cosmos.upgrade.v1beta1.Query/CurrentPlan";
pub const CONSUMER_ADDR_PATH: &str = "/interchain_security.ccv.provider.v1.Query/QueryValidatorConsumerAddr";

pub const ED25519_PUBKEY_TYPE: &str = "/cosmos.crypto.ed25519.PubKey";

// cosmos.base.query.v1beta1

#[derive(Clone, PartialEq, Message)]
pub struct PageRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub offset: u64,
    #[prost(uint64, tag = "3")]
    pub limit: u64,
    #[prost(bool, tag = "4")]
    pub count_total: bool,
    #[prost(bool, tag = "5")]
    pub reverse: bool,
}

// cosmos.staking.v1beta1

#[derive(Clone, PartialEq, Message)]
pub struct QueryValidatorsRequest {
    #[prost(string, tag = "1")]
    pub status: String,
    #[prost(message, optional, tag = "2")]
    pub pagination: Option<PageRequest>,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryValidatorsResponse {
    #[prost(message, repeated, tag = "1")]
    pub validators: Vec<Validator>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Validator {
    #[prost(string, tag = "1")]
    pub operator_address: String,
    #[prost(message, optional, tag = "2")]
    pub consensus_pubkey: Option<Any>,
    #[prost(message, optional, tag = "7")]
    pub description: Option<Description>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Description {
    #[prost(string, tag = "1")]
    pub moniker: String,
}

// google.protobuf / cosmos.crypto.ed25519

#[derive(Clone, PartialEq, Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Ed25519PubKey {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
}

// cosmos.upgrade.v1beta1

#[derive(Clone, PartialEq, Message)]
pub struct QueryCurrentPlanRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct QueryCurrentPlanResponse {
    #[prost(message, optional, tag = "1")]
    pub plan: Option<Plan>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Plan {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int64, tag = "3")]
    pub height: i64,
}

// interchain_security.ccv.provider.v1

#[derive(Clone, PartialEq, Message)]
pub struct QueryValidatorConsumerAddrRequest {
    #[prost(string, tag = "1")]
    pub chain_id: String,
    #[prost(string, tag = "2")]
    pub provider_address: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryValidatorConsumerAddrResponse {
    #[prost(string, tag = "1")]
    pub consumer_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators_request_wire_format() {
        let request = QueryValidatorsRequest {
            status: String::new(),
            pagination: Some(PageRequest {
                limit: 1000,
                ..Default::default()
            }),
        };
        // field 2 (pagination) holding field 3 (limit) = 1000
        assert_eq!(request.encode_to_vec(), vec![0x12, 0x03, 0x18, 0xe8, 0x07]);
    }

    #[test]
    fn test_plan_skips_unknown_fields() {
        // name = "v2", info (field 4) = "x", height = 5
        let bytes = [0x0a, 0x09, 0x0a, 0x02, b'v', b'2', 0x22, 0x01, b'x', 0x18, 0x05];
        let response = QueryCurrentPlanResponse::decode(&bytes[..]).unwrap();
        assert_eq!(
            response.plan,
            Some(Plan {
                name: "v2".to_string(),
                height: 5
            })
        );
    }
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use roundwatch_node::roster::NoopRoster;
use roundwatch_node::Aggregator;
use roundwatch_rpc::{NodeGateway, RpcError, Transport};
use serde_json::{json, Value};

pub const VOTE: &str =
    "Vote{0:0A1B2C3D4E5F 77/00/SIGNED_MSG_TYPE_PREVOTE(Prevote) 8B01023386C3 5E6D3F2A1B0C @ 2024-03-01T12:00:00.1Z}";

/// Canned node: one body (or HTTP status) per relative URL, calls recorded
#[derive(Default)]
pub struct FakeNode {
    responses: Mutex<HashMap<String, Result<String, (u16, String)>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, result: Value) {
        let body = json!({ "jsonrpc": "2.0", "id": -1, "result": result });
        self.responses.lock().unwrap().insert(url.to_string(), Ok(body.to_string()));
    }

    pub fn fail(&self, url: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err((status, body.to_string())));
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| *call == url).count()
    }

    /// A healthy two-validator chain at height 77, round 0
    pub fn healthy(self: &Arc<Self>) -> Arc<Self> {
        self.respond(
            "/consensus_state",
            json!({
                "round_state": {
                    "height/round/step": "77/0/6",
                    "start_time": "2024-03-01T12:00:00Z",
                    "height_vote_set": [
                        { "round": 0, "prevotes": [VOTE, "nil-Vote"], "precommits": [VOTE, "nil-Vote"] }
                    ],
                    "proposer": { "address": "VAL0", "index": 0 }
                }
            }),
        );
        self.respond(
            "/validators?page=1&per_page=100",
            json!({
                "block_height": "77",
                "count": "2",
                "total": "2",
                "validators": [
                    { "address": "VAL0", "voting_power": "60" },
                    { "address": "VAL1", "voting_power": "40" }
                ]
            }),
        );
        self.respond(
            "/status",
            json!({
                "node_info": { "id": "abcd", "network": "testnet-1", "version": "0.37.2", "moniker": "sentry" },
                "validator_info": { "address": "VAL0" },
                "sync_info": { "latest_block_height": "77", "catching_up": false }
            }),
        );
        self.clone()
    }
}

#[async_trait]
impl Transport for FakeNode {
    fn host(&self) -> &str {
        "http://fake-node:26657"
    }

    async fn get_plain(&self, relative_url: &str) -> Result<String, RpcError> {
        self.calls.lock().unwrap().push(relative_url.to_string());

        match self.responses.lock().unwrap().get(relative_url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err((status, body))) => Err(RpcError::Status {
                url: format!("{}{}", self.host(), relative_url),
                status: *status,
                body: body.clone(),
            }),
            None => Err(RpcError::Status {
                url: format!("{}{}", self.host(), relative_url),
                status: 404,
                body: "not found".to_string(),
            }),
        }
    }
}

pub fn aggregator(node: &Arc<FakeNode>, halt_height: Option<i64>) -> Aggregator {
    let gateway = NodeGateway::new(node.clone());
    Aggregator::new(gateway, Arc::new(NoopRoster), halt_height)
}

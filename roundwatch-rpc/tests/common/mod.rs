#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use roundwatch_rpc::{RpcError, Transport};
use serde_json::{json, Value};

pub enum FakeResponse {
    Ok(String),
    Status(u16, String),
}

/// Transport serving canned bodies per relative URL and recording calls
pub struct FakeTransport {
    responses: Mutex<HashMap<String, FakeResponse>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, url: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeResponse::Ok(body.to_string()));
    }

    pub fn respond_raw(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeResponse::Ok(body.to_string()));
    }

    pub fn respond_status(&self, url: &str, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeResponse::Status(status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn host(&self) -> &str {
        "http://fake-node:26657"
    }

    async fn get_plain(&self, relative_url: &str) -> Result<String, RpcError> {
        self.calls.lock().unwrap().push(relative_url.to_string());

        match self.responses.lock().unwrap().get(relative_url) {
            Some(FakeResponse::Ok(body)) => Ok(body.clone()),
            Some(FakeResponse::Status(status, body)) => Err(RpcError::Status {
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

pub fn envelope(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": -1, "result": result })
}

pub fn validator(index: usize, voting_power: u64) -> Value {
    json!({
        "address": format!("VALIDATOR{:04}", index),
        "voting_power": voting_power.to_string(),
        "pub_key": { "type": "tendermint/PubKeyEd25519", "value": "AAAA" },
    })
}

pub fn validators_page(indexes: std::ops::Range<usize>, total: usize) -> Value {
    let validators: Vec<Value> = indexes.map(|i| validator(i, 10)).collect();
    envelope(json!({
        "block_height": "10",
        "count": validators.len().to_string(),
        "total": total.to_string(),
        "validators": validators,
    }))
}

pub fn block(height: i64, time: &str) -> Value {
    envelope(json!({
        "block_id": {},
        "block": { "header": { "height": height.to_string(), "time": time } },
    }))
}

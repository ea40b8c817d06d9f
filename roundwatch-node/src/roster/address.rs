//! Consensus address encodings: Tendermint's upper-case hex and the
//! chain's bech32 `valcons` form.

use bech32::{Bech32, Hrp};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Tendermint addresses are the first 20 bytes of the pubkey's SHA-256
const ADDRESS_LENGTH: usize = 20;

const OPERATOR_SUFFIX: &str = "valoper";
const CONSENSUS_SUFFIX: &str = "valcons";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid bech32 address {address:?}: {reason}")]
    Bech32 { address: String, reason: String },

    #[error("{0:?} is not a validator operator address")]
    NotOperator(String),
}

/// Raw consensus address of an ed25519 pubkey
pub fn consensus_address_bytes(pubkey: &[u8]) -> Vec<u8> {
    Sha256::digest(pubkey)[..ADDRESS_LENGTH].to_vec()
}

/// Bech32 `valcons` address, using the prefix of `operator_address`.
///
/// `cosmosvaloper1...` yields `cosmosvalcons1...`.
pub fn valcons_address(operator_address: &str, address: &[u8]) -> Result<String, AddressError> {
    let (operator_hrp, _) = bech32::decode(operator_address).map_err(|e| AddressError::Bech32 {
        address: operator_address.to_string(),
        reason: e.to_string(),
    })?;

    let prefix = operator_hrp
        .as_str()
        .strip_suffix(OPERATOR_SUFFIX)
        .ok_or_else(|| AddressError::NotOperator(operator_address.to_string()))?;

    let hrp = Hrp::parse(&format!("{}{}", prefix, CONSENSUS_SUFFIX)).map_err(|e| AddressError::Bech32 {
        address: operator_address.to_string(),
        reason: e.to_string(),
    })?;

    bech32::encode::<Bech32>(hrp, address).map_err(|e| AddressError::Bech32 {
        address: operator_address.to_string(),
        reason: e.to_string(),
    })
}

/// Upper-case hex of the bytes behind any bech32 address
pub fn hex_address(bech32_address: &str) -> Result<String, AddressError> {
    let (_, data) = bech32::decode(bech32_address).map_err(|e| AddressError::Bech32 {
        address: bech32_address.to_string(),
        reason: e.to_string(),
    })?;

    Ok(hex::encode_upper(data))
}

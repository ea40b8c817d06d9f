use std::collections::HashMap;

/// Human identity of a validator, supplied by the chain's roster source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainValidator {
    pub moniker: String,
    /// Upper-case hex consensus address, as Tendermint prints it
    pub address: String,
    /// Chain-native encoding of the same address (e.g. operator address)
    pub raw_address: String,
    /// Consensus address assigned on a consumer chain, if any
    pub assigned_address: Option<String>,
}

/// Index a roster by every address it can be joined on.
///
/// An assigned consumer address maps to the same entry as the validator's
/// own address.
pub fn index_by_address(validators: &[ChainValidator]) -> HashMap<&str, &ChainValidator> {
    let mut map = HashMap::with_capacity(validators.len());

    for validator in validators {
        map.insert(validator.address.as_str(), validator);
        if let Some(assigned) = validator.assigned_address.as_deref() {
            if !assigned.is_empty() {
                map.insert(assigned, validator);
            }
        }
    }

    map
}

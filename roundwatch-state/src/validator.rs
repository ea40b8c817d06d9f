use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::chain_validator::ChainValidator;
use crate::vote::VoteState;

/// A member of the active set at the current height.
///
/// `index` is the position the node listed it at in this refresh and is
/// only stable within one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    pub index: usize,
    pub address: String,
    pub voting_power: BigInt,
    /// Share of the set's total voting power, in percent
    pub voting_power_percent: BigRational,
}

/// One validator's votes in one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundVote {
    pub address: String,
    pub prevote: VoteState,
    pub precommit: VoteState,
    pub is_proposer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorWithRoundVote {
    pub validator: Validator,
    pub round_vote: RoundVote,
}

/// Every round's votes at the current height, index-aligned with `validators`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AllRoundsVotes {
    pub validators: Vec<Validator>,
    pub rounds: BTreeMap<i64, Vec<RoundVote>>,
}

/// Current-round row joined with identity data
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorWithInfo {
    pub validator: Validator,
    pub round_vote: RoundVote,
    pub chain_validator: Option<ChainValidator>,
}

impl ValidatorWithInfo {
    /// Moniker when the roster knows the validator, its address otherwise
    pub fn display_name(&self) -> &str {
        match &self.chain_validator {
            Some(chain_validator) => &chain_validator.moniker,
            None => &self.validator.address,
        }
    }
}

/// Validator joined with identity data, used by the all-rounds grid
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorWithChainValidator {
    pub validator: Validator,
    pub chain_validator: Option<ChainValidator>,
}

impl ValidatorWithChainValidator {
    pub fn display_name(&self) -> &str {
        match &self.chain_validator {
            Some(chain_validator) => &chain_validator.moniker,
            None => &self.validator.address,
        }
    }
}

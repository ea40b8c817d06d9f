//! Voting-power weighted quorum over one round.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::math::percent_of;
use crate::validator::ValidatorWithRoundVote;
use crate::vote::VoteState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Prevote,
    Precommit,
}

/// Which votes count toward agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quorum {
    /// Only votes for a concrete block
    Strict,
    /// Concrete votes plus zero-hash votes
    Inclusive,
}

impl Quorum {
    pub fn counts(&self, vote: VoteState) -> bool {
        match self {
            Quorum::Strict => vote == VoteState::Voted,
            Quorum::Inclusive => matches!(vote, VoteState::Voted | VoteState::VotedZero),
        }
    }
}

fn vote_in(row: &ValidatorWithRoundVote, phase: Phase) -> VoteState {
    match phase {
        Phase::Prevote => row.round_vote.prevote,
        Phase::Precommit => row.round_vote.precommit,
    }
}

pub fn total_voting_power(validators: &[ValidatorWithRoundVote]) -> BigInt {
    validators
        .iter()
        .fold(BigInt::zero(), |sum, row| sum + &row.validator.voting_power)
}

/// Percent of total voting power whose vote in `phase` counts under `quorum`.
///
/// An empty round has zero total power and yields exactly zero.
pub fn quorum_percent(validators: &[ValidatorWithRoundVote], phase: Phase, quorum: Quorum) -> BigRational {
    let total = total_voting_power(validators);
    let agreeing = validators
        .iter()
        .filter(|row| quorum.counts(vote_in(row, phase)))
        .fold(BigInt::zero(), |sum, row| sum + &row.validator.voting_power);

    percent_of(&agreeing, &total)
}

/// Sum of voting power percent of every validator with any vote recorded
pub fn participation_percent(validators: &[ValidatorWithRoundVote], phase: Phase) -> BigRational {
    validators
        .iter()
        .filter(|row| !vote_in(row, phase).is_nil())
        .fold(BigRational::zero(), |sum, row| sum + &row.validator.voting_power_percent)
}

/// All quorum figures for one round, computed once per consensus update
#[derive(Debug, Clone, PartialEq)]
pub struct QuorumSummary {
    pub total_voting_power: BigInt,
    pub prevote_strict: BigRational,
    pub prevote_inclusive: BigRational,
    pub precommit_strict: BigRational,
    pub precommit_inclusive: BigRational,
    pub prevote_participation: BigRational,
    pub precommit_participation: BigRational,
}

impl QuorumSummary {
    pub fn from_round(validators: &[ValidatorWithRoundVote]) -> Self {
        Self {
            total_voting_power: total_voting_power(validators),
            prevote_strict: quorum_percent(validators, Phase::Prevote, Quorum::Strict),
            prevote_inclusive: quorum_percent(validators, Phase::Prevote, Quorum::Inclusive),
            precommit_strict: quorum_percent(validators, Phase::Precommit, Quorum::Strict),
            precommit_inclusive: quorum_percent(validators, Phase::Precommit, Quorum::Inclusive),
            prevote_participation: participation_percent(validators, Phase::Prevote),
            precommit_participation: participation_percent(validators, Phase::Precommit),
        }
    }

    pub fn percent(&self, phase: Phase, quorum: Quorum) -> &BigRational {
        match (phase, quorum) {
            (Phase::Prevote, Quorum::Strict) => &self.prevote_strict,
            (Phase::Prevote, Quorum::Inclusive) => &self.prevote_inclusive,
            (Phase::Precommit, Quorum::Strict) => &self.precommit_strict,
            (Phase::Precommit, Quorum::Inclusive) => &self.precommit_inclusive,
        }
    }
}

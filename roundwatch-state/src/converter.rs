//! Turns raw node payloads into typed consensus snapshots.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::Zero;
use roundwatch_rpc::{HeightVoteSet, RoundState, TendermintValidator};

use crate::error::{Result, StateError};
use crate::math::percent_of;
use crate::quorum::QuorumSummary;
use crate::validator::{AllRoundsVotes, RoundVote, Validator, ValidatorWithRoundVote};
use crate::vote::VoteState;

/// The node's `"height/round/step"` position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeightRoundStep {
    pub height: i64,
    pub round: i64,
    pub step: i64,
}

impl FromStr for HeightRoundStep {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StateError::InvalidHeightRoundStep(s.to_string());

        let parts = s
            .split('/')
            .map(|part| part.trim().parse::<i64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [height, round, step] => Ok(Self {
                height: *height,
                round: *round,
                step: *step,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Everything derived from one consensus fetch, committed to state as a unit
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusView {
    pub hrs: HeightRoundStep,
    pub start_time: DateTime<Utc>,
    /// Current round rows; empty while the round has no vote set yet
    pub validators: Vec<ValidatorWithRoundVote>,
    pub all_rounds: AllRoundsVotes,
    pub quorum: QuorumSummary,
}

/// Parse voting powers and compute each validator's share of the total.
pub fn validators_from_tendermint(raw: &[TendermintValidator]) -> Result<Vec<Validator>> {
    let powers = raw
        .iter()
        .map(|validator| {
            BigInt::from_str(validator.voting_power.trim()).map_err(|_| StateError::InvalidVotingPower {
                address: validator.address.clone(),
                power: validator.voting_power.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let total = powers.iter().fold(BigInt::zero(), |sum, power| sum + power);

    Ok(raw
        .iter()
        .zip(powers)
        .enumerate()
        .map(|(index, (validator, voting_power))| Validator {
            index,
            address: validator.address.clone(),
            voting_power_percent: percent_of(&voting_power, &total),
            voting_power,
        })
        .collect())
}

/// Classify one round's raw votes against the validator list.
///
/// A round with no votes at all yields no rows. Otherwise both vote lists
/// must line up with the validator list index by index.
pub fn round_votes(vote_set: &HeightVoteSet, validators: &[Validator], proposer: &str) -> Result<Vec<RoundVote>> {
    let prevotes = vote_set.prevotes.len();
    let precommits = vote_set.precommits.len();

    if prevotes == 0 && precommits == 0 {
        return Ok(Vec::new());
    }

    if prevotes != validators.len() || precommits != validators.len() {
        return Err(StateError::MisalignedVotes {
            round: vote_set.round,
            prevotes,
            precommits,
            validators: validators.len(),
        });
    }

    Ok(validators
        .iter()
        .zip(vote_set.prevotes.iter().zip(vote_set.precommits.iter()))
        .map(|(validator, (prevote, precommit))| RoundVote {
            address: validator.address.clone(),
            prevote: VoteState::from_raw(prevote),
            precommit: VoteState::from_raw(precommit),
            is_proposer: validator.address == proposer,
        })
        .collect())
}

/// Build a complete snapshot from one consensus state and one validator list.
///
/// Fails without partial output, so a caller can keep its previous view.
pub fn build_consensus_view(round_state: &RoundState, raw_validators: &[TendermintValidator]) -> Result<ConsensusView> {
    let hrs = HeightRoundStep::from_str(&round_state.height_round_step)?;
    let validators = validators_from_tendermint(raw_validators)?;
    let proposer = round_state.proposer.address.as_str();

    let mut rounds = BTreeMap::new();
    for vote_set in &round_state.height_vote_set {
        rounds.insert(vote_set.round, round_votes(vote_set, &validators, proposer)?);
    }

    let current_votes = rounds.get(&hrs.round).ok_or(StateError::MissingRound(hrs.round))?;

    let current: Vec<ValidatorWithRoundVote> = validators
        .iter()
        .zip(current_votes.iter())
        .map(|(validator, round_vote)| ValidatorWithRoundVote {
            validator: validator.clone(),
            round_vote: round_vote.clone(),
        })
        .collect();

    let quorum = QuorumSummary::from_round(&current);

    Ok(ConsensusView {
        hrs,
        start_time: round_state.start_time,
        validators: current,
        all_rounds: AllRoundsVotes { validators, rounds },
        quorum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::format_percent;
    use roundwatch_rpc::Proposer;

    const VOTE: &str = "Vote{0:0A1B2C3D4E5F 7/00/SIGNED_MSG_TYPE_PREVOTE(Prevote) 8B01023386C3 5E6D3F2A1B0C @ 2024-03-01T12:00:00.1Z}";

    fn tm(address: &str, power: &str) -> TendermintValidator {
        TendermintValidator {
            address: address.to_string(),
            voting_power: power.to_string(),
            pub_key: None,
        }
    }

    fn vote_set(round: i64, prevotes: &[&str], precommits: &[&str]) -> HeightVoteSet {
        HeightVoteSet {
            round,
            prevotes: prevotes.iter().map(|v| v.to_string()).collect(),
            precommits: precommits.iter().map(|v| v.to_string()).collect(),
            prevotes_bit_array: String::new(),
            precommits_bit_array: String::new(),
        }
    }

    fn round_state(hrs: &str, sets: Vec<HeightVoteSet>) -> RoundState {
        RoundState {
            height_round_step: hrs.to_string(),
            start_time: DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
                .map(|t| t.with_timezone(&Utc))
                .unwrap(),
            height_vote_set: sets,
            proposer: Proposer {
                address: "AAA".to_string(),
                index: 0,
            },
        }
    }

    #[test]
    fn test_parse_height_round_step() {
        let hrs: HeightRoundStep = "7/0/1".parse().unwrap();
        assert_eq!(hrs, HeightRoundStep { height: 7, round: 0, step: 1 });
    }

    #[test]
    fn test_parse_height_round_step_rejects_bad_input() {
        for input in ["7/0", "7/0/1/2", "7/x/1", "", "a/b/c"] {
            assert!(
                matches!(input.parse::<HeightRoundStep>(), Err(StateError::InvalidHeightRoundStep(_))),
                "{input} should not parse"
            );
        }
    }

    #[test]
    fn test_voting_power_percent() {
        let validators = validators_from_tendermint(&[tm("AAA", "3"), tm("BBB", "1")]).unwrap();
        assert_eq!(format_percent(&validators[0].voting_power_percent, 2), "75.00");
        assert_eq!(format_percent(&validators[1].voting_power_percent, 2), "25.00");
        assert_eq!(validators[1].index, 1);
    }

    #[test]
    fn test_invalid_voting_power() {
        let err = validators_from_tendermint(&[tm("AAA", "lots")]).unwrap_err();
        assert!(matches!(err, StateError::InvalidVotingPower { .. }));
    }

    #[test]
    fn test_build_view_marks_proposer() {
        let state = round_state("7/0/1", vec![vote_set(0, &[VOTE, "nil-Vote"], &["nil-Vote", "nil-Vote"])]);
        let view = build_consensus_view(&state, &[tm("AAA", "3"), tm("BBB", "1")]).unwrap();

        assert_eq!(view.hrs.height, 7);
        assert_eq!(view.validators.len(), 2);
        assert!(view.validators[0].round_vote.is_proposer);
        assert!(!view.validators[1].round_vote.is_proposer);
        assert_eq!(view.validators[0].round_vote.prevote, VoteState::Voted);
        assert_eq!(format_percent(&view.quorum.prevote_strict, 2), "75.00");
    }

    #[test]
    fn test_round_without_votes_has_zero_quorum() {
        let state = round_state("7/1/1", vec![vote_set(0, &[VOTE], &[VOTE]), vote_set(1, &[], &[])]);
        let view = build_consensus_view(&state, &[tm("AAA", "3")]).unwrap();

        assert!(view.validators.is_empty());
        assert!(view.quorum.prevote_strict.is_zero());
        assert_eq!(view.all_rounds.rounds.len(), 2);
        assert_eq!(view.all_rounds.validators.len(), 1);
    }

    #[test]
    fn test_missing_current_round() {
        let state = round_state("7/2/1", vec![vote_set(0, &[VOTE], &[VOTE])]);
        let err = build_consensus_view(&state, &[tm("AAA", "3")]).unwrap_err();
        assert!(matches!(err, StateError::MissingRound(2)));
    }

    #[test]
    fn test_misaligned_votes() {
        let state = round_state("7/0/1", vec![vote_set(0, &[VOTE], &[VOTE])]);
        let err = build_consensus_view(&state, &[tm("AAA", "3"), tm("BBB", "1")]).unwrap_err();
        assert!(matches!(err, StateError::MisalignedVotes { validators: 2, .. }));
    }
}

use chrono::{TimeZone, Utc};
use num_rational::BigRational;
use num_traits::Zero;
use roundwatch_rpc::{RoundState, TendermintValidator};
use roundwatch_state::math::format_percent;
use roundwatch_state::{Category, ChainValidator, ReconciliationState, Upgrade, VoteState};
use serde_json::json;

const VOTE: &str =
    "Vote{0:0A1B2C3D4E5F 500/00/SIGNED_MSG_TYPE_PREVOTE(Prevote) 8B01023386C3 5E6D3F2A1B0C @ 2024-03-01T12:00:00.1Z}";
const ZERO_VOTE: &str =
    "Vote{3:1122334455AA 500/00/SIGNED_MSG_TYPE_PREVOTE(Prevote) 000000000000 9F8E7D6C5B4A @ 2024-03-01T12:00:00.1Z}";
const NIL: &str = "nil-Vote";

fn validators(powers: &[&str]) -> Vec<TendermintValidator> {
    powers
        .iter()
        .enumerate()
        .map(|(i, power)| TendermintValidator {
            address: format!("VAL{}", i),
            voting_power: power.to_string(),
            pub_key: None,
        })
        .collect()
}

fn round_state(hrs: &str, prevotes: &[&str], precommits: &[&str]) -> RoundState {
    serde_json::from_value(json!({
        "height/round/step": hrs,
        "start_time": "2024-03-01T12:00:00Z",
        "height_vote_set": [
            {
                "round": 0,
                "prevotes": prevotes,
                "precommits": precommits,
                "prevotes_bit_array": "",
                "precommits_bit_array": ""
            }
        ],
        "proposer": { "address": "VAL0", "index": 0 }
    }))
    .unwrap()
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap()
}

#[test]
fn test_applying_the_same_payload_twice_is_idempotent() {
    let payload = round_state("500/0/3", &[VOTE, VOTE, VOTE, NIL], &[VOTE, NIL, NIL, NIL]);
    let raw = validators(&["40", "30", "20", "10"]);

    let mut state = ReconciliationState::new();
    state.apply_consensus(&payload, &raw, now()).unwrap();
    let once = state.clone();
    state.apply_consensus(&payload, &raw, now()).unwrap();

    assert_eq!(state, once);
    assert_eq!(state.validators.len(), 4);
    assert_eq!(state.all_rounds.rounds[&0].len(), 4);
}

#[test]
fn test_quorum_scenario() {
    let raw = validators(&["40", "30", "20", "10"]);
    let mut state = ReconciliationState::new();

    state
        .apply_consensus(&round_state("500/0/3", &[VOTE, VOTE, VOTE, NIL], &[NIL; 4]), &raw, now())
        .unwrap();
    let quorum = state.quorum.clone().unwrap();
    assert_eq!(format_percent(&quorum.prevote_strict, 2), "90.00");
    assert_eq!(format_percent(&quorum.prevote_inclusive, 2), "90.00");

    state
        .apply_consensus(&round_state("500/0/3", &[VOTE, VOTE, VOTE, ZERO_VOTE], &[NIL; 4]), &raw, now())
        .unwrap();
    let quorum = state.quorum.clone().unwrap();
    assert_eq!(state.validators[3].round_vote.prevote, VoteState::VotedZero);
    assert_eq!(format_percent(&quorum.prevote_strict, 2), "90.00");
    assert_eq!(format_percent(&quorum.prevote_inclusive, 2), "100.00");
}

#[test]
fn test_voting_power_percent_sums_to_100() {
    let raw = validators(&[
        "340282366920938463463374607431768211455",
        "1",
        "7",
        "123456789012345678901234567890",
        "3",
    ]);
    let mut state = ReconciliationState::new();
    state
        .apply_consensus(&round_state("9/0/1", &[NIL; 5], &[NIL; 5]), &raw, now())
        .unwrap();

    let sum = state
        .validators
        .iter()
        .fold(BigRational::zero(), |sum, row| sum + &row.validator.voting_power_percent);
    assert_eq!(sum, BigRational::from_integer(100.into()));
}

#[test]
fn test_empty_round_quorum_is_zero() {
    let mut state = ReconciliationState::new();
    state
        .apply_consensus(&round_state("1/0/1", &[], &[]), &validators(&["10", "10"]), now())
        .unwrap();

    let quorum = state.quorum.unwrap();
    assert!(quorum.prevote_strict.is_zero());
    assert!(quorum.prevote_inclusive.is_zero());
    assert!(quorum.precommit_strict.is_zero());
    assert!(quorum.precommit_inclusive.is_zero());
}

#[test]
fn test_parse_failure_retains_prior_snapshot() {
    let raw = validators(&["40", "30", "20", "10"]);
    let mut state = ReconciliationState::new();
    state
        .apply_consensus(&round_state("500/0/3", &[VOTE, VOTE, VOTE, NIL], &[NIL; 4]), &raw, now())
        .unwrap();
    let good = state.clone();

    let bad_hrs = round_state("500/x/3", &[VOTE; 4], &[VOTE; 4]);
    assert!(state.apply_consensus(&bad_hrs, &raw, now()).is_err());

    let bad_power = validators(&["40", "thirty", "20", "10"]);
    let payload = round_state("501/0/1", &[VOTE; 4], &[VOTE; 4]);
    assert!(state.apply_consensus(&payload, &bad_power, now()).is_err());

    assert_eq!(state.hrs, good.hrs);
    assert_eq!(state.validators, good.validators);
    assert_eq!(state.quorum, good.quorum);
    assert!(state.errors.consensus.as_deref().unwrap().contains("thirty"));
}

#[test]
fn test_failure_in_one_category_leaves_consensus_untouched() {
    let raw = validators(&["40", "30", "20", "10"]);
    let mut state = ReconciliationState::new();
    state
        .apply_consensus(&round_state("500/0/3", &[VOTE, VOTE, VOTE, NIL], &[NIL; 4]), &raw, now())
        .unwrap();
    let before = state.clone();

    state.ingest_upgrade::<String>(Err("upgrade endpoint unreachable".to_string()));
    state.record_error(Category::ChainValidators, "roster unreachable");

    assert_eq!(state.validators, before.validators);
    assert_eq!(state.quorum, before.quorum);
    assert_eq!(state.errors.consensus, None);
    assert_eq!(state.errors.validators, None);
    assert_eq!(state.errors.get(Category::Upgrade), Some("upgrade endpoint unreachable"));
}

#[test]
fn test_successful_consensus_clears_validators_error() {
    let raw = validators(&["1"]);
    let mut state = ReconciliationState::new();
    state.record_error(Category::Validators, "page 2 timed out");

    state
        .apply_consensus(&round_state("2/0/1", &[VOTE], &[VOTE]), &raw, now())
        .unwrap();

    assert_eq!(state.errors.validators, None);
    assert_eq!(state.round_age(now()), Some(chrono::Duration::seconds(5)));
}

#[test]
fn test_unmatched_validators_keep_address_identity() {
    let raw = validators(&["40", "30", "20", "10"]);
    let mut state = ReconciliationState::new();
    state
        .apply_consensus(&round_state("500/0/3", &[VOTE, VOTE, VOTE, NIL], &[NIL; 4]), &raw, now())
        .unwrap();

    state.ingest_chain_validators::<String>(Ok(vec![
        ChainValidator {
            moniker: "alpha".to_string(),
            address: "VAL0".to_string(),
            raw_address: "cosmosvaloper1alpha".to_string(),
            assigned_address: None,
        },
        ChainValidator {
            moniker: "gamma".to_string(),
            address: "PROVIDER2".to_string(),
            raw_address: "cosmosvaloper1gamma".to_string(),
            assigned_address: Some("VAL2".to_string()),
        },
    ]));

    let rows = state.validators_with_info();
    let names: Vec<&str> = rows.iter().map(|row| row.display_name()).collect();
    assert_eq!(names, vec!["alpha", "VAL1", "gamma", "VAL3"]);
    assert!(rows[0].round_vote.is_proposer);

    let grid = state.validators_with_all_round_votes();
    assert_eq!(grid.validators.len(), 4);
    assert_eq!(grid.validators[1].display_name(), "VAL1");
    assert_eq!(grid.rounds[&0].len(), grid.validators.len());
}

#[test]
fn test_halt_upgrade_progress() {
    let mut state = ReconciliationState::new();
    state
        .apply_consensus(&round_state("90/0/1", &[VOTE], &[VOTE]), &validators(&["1"]), now())
        .unwrap();
    state.ingest_upgrade::<String>(Ok(Some(Upgrade::halt(100))));
    state.ingest_block_time::<String>(Ok(std::time::Duration::from_secs(1)));

    match state.upgrade_progress(now()) {
        Some(roundwatch_state::UpgradeProgress::Scheduled { blocks_left, eta }) => {
            assert_eq!(blocks_left, 10);
            assert_eq!(eta, Some(now() + chrono::Duration::seconds(10)));
        }
        other => panic!("unexpected progress {:?}", other),
    }
}

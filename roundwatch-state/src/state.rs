//! The dashboard's single source of truth.
//!
//! Each data category is replaced wholesale by its own refresh loop. A failed
//! refresh records its error and leaves the category's last good data alone.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use roundwatch_rpc::{RoundState, TendermintValidator};

use crate::chain_validator::{index_by_address, ChainValidator};
use crate::converter::{build_consensus_view, HeightRoundStep};
use crate::error::Result;
use crate::quorum::QuorumSummary;
use crate::status::NodeStatus;
use crate::upgrade::{Upgrade, UpgradeProgress};
use crate::validator::{AllRoundsVotes, RoundVote, ValidatorWithChainValidator, ValidatorWithInfo, ValidatorWithRoundVote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Consensus,
    Validators,
    ChainValidators,
    Upgrade,
    Status,
    BlockTime,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Consensus => "consensus",
            Category::Validators => "validators",
            Category::ChainValidators => "chain validators",
            Category::Upgrade => "upgrade",
            Category::Status => "status",
            Category::BlockTime => "block time",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last error per category, cleared by the category's next success
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryErrors {
    pub consensus: Option<String>,
    pub validators: Option<String>,
    pub chain_validators: Option<String>,
    pub upgrade: Option<String>,
    pub status: Option<String>,
    pub block_time: Option<String>,
}

impl CategoryErrors {
    pub fn get(&self, category: Category) -> Option<&str> {
        self.slot(category).as_deref()
    }

    fn slot(&self, category: Category) -> &Option<String> {
        match category {
            Category::Consensus => &self.consensus,
            Category::Validators => &self.validators,
            Category::ChainValidators => &self.chain_validators,
            Category::Upgrade => &self.upgrade,
            Category::Status => &self.status,
            Category::BlockTime => &self.block_time,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::Consensus => &mut self.consensus,
            Category::Validators => &mut self.validators,
            Category::ChainValidators => &mut self.chain_validators,
            Category::Upgrade => &mut self.upgrade,
            Category::Status => &mut self.status,
            Category::BlockTime => &mut self.block_time,
        }
    }
}

/// Validators joined with identity, plus every round's votes in the same order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AllRoundsView {
    pub validators: Vec<ValidatorWithChainValidator>,
    pub rounds: BTreeMap<i64, Vec<RoundVote>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciliationState {
    /// Height, round and step, always written together
    pub hrs: HeightRoundStep,
    pub start_time: Option<DateTime<Utc>>,
    pub validators: Vec<ValidatorWithRoundVote>,
    pub all_rounds: AllRoundsVotes,
    pub quorum: Option<QuorumSummary>,
    pub chain_validators: Option<Vec<ChainValidator>>,
    pub node_status: Option<NodeStatus>,
    pub upgrade: Option<Upgrade>,
    pub block_time: Option<Duration>,
    pub consensus_updated_at: Option<DateTime<Utc>>,
    pub errors: CategoryErrors,
}

impl ReconciliationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(&self) -> i64 {
        self.hrs.height
    }

    pub fn round(&self) -> i64 {
        self.hrs.round
    }

    pub fn step(&self) -> i64 {
        self.hrs.step
    }

    /// Replace the consensus snapshot with one built from fresh payloads.
    ///
    /// Either everything derived from the payloads is committed, or nothing is
    /// and the failure lands in the consensus error slot.
    pub fn apply_consensus(
        &mut self,
        round_state: &RoundState,
        validators: &[TendermintValidator],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let view = match build_consensus_view(round_state, validators) {
            Ok(view) => view,
            Err(e) => {
                self.record_error(Category::Consensus, &e);
                return Err(e);
            }
        };

        debug!(
            "Consensus at {}/{}/{} with {} validators",
            view.hrs.height,
            view.hrs.round,
            view.hrs.step,
            view.all_rounds.validators.len()
        );

        self.hrs = view.hrs;
        self.start_time = Some(view.start_time);
        self.validators = view.validators;
        self.all_rounds = view.all_rounds;
        self.quorum = Some(view.quorum);
        self.consensus_updated_at = Some(now);
        self.errors.consensus = None;
        self.errors.validators = None;

        Ok(())
    }

    pub fn ingest_chain_validators<E: Display>(&mut self, result: std::result::Result<Vec<ChainValidator>, E>) {
        match result {
            Ok(chain_validators) => {
                self.chain_validators = Some(chain_validators);
                self.errors.chain_validators = None;
            }
            Err(e) => self.record_error(Category::ChainValidators, e),
        }
    }

    /// `Ok(None)` means the source reports no scheduled upgrade.
    pub fn ingest_upgrade<E: Display>(&mut self, result: std::result::Result<Option<Upgrade>, E>) {
        match result {
            Ok(upgrade) => {
                self.upgrade = upgrade;
                self.errors.upgrade = None;
            }
            Err(e) => self.record_error(Category::Upgrade, e),
        }
    }

    pub fn ingest_status<E: Display>(&mut self, result: std::result::Result<NodeStatus, E>) {
        match result {
            Ok(status) => {
                self.node_status = Some(status);
                self.errors.status = None;
            }
            Err(e) => self.record_error(Category::Status, e),
        }
    }

    pub fn ingest_block_time<E: Display>(&mut self, result: std::result::Result<Duration, E>) {
        match result {
            Ok(block_time) => {
                self.block_time = Some(block_time);
                self.errors.block_time = None;
            }
            Err(e) => self.record_error(Category::BlockTime, e),
        }
    }

    /// Record a failed refresh. Data of every category is left untouched.
    pub fn record_error(&mut self, category: Category, error: impl Display) {
        let message = error.to_string();
        warn!("Failed to refresh {}: {}", category, message);
        *self.errors.slot_mut(category) = Some(message);
    }

    /// Current round rows joined with the roster by address.
    ///
    /// Validators the roster doesn't know are kept, with no identity attached.
    pub fn validators_with_info(&self) -> Vec<ValidatorWithInfo> {
        let index = self.chain_validators.as_deref().map(index_by_address).unwrap_or_default();

        self.validators
            .iter()
            .map(|row| ValidatorWithInfo {
                validator: row.validator.clone(),
                round_vote: row.round_vote.clone(),
                chain_validator: index.get(row.validator.address.as_str()).map(|cv| (*cv).clone()),
            })
            .collect()
    }

    pub fn validators_with_all_round_votes(&self) -> AllRoundsView {
        let index = self.chain_validators.as_deref().map(index_by_address).unwrap_or_default();

        AllRoundsView {
            validators: self
                .all_rounds
                .validators
                .iter()
                .map(|validator| ValidatorWithChainValidator {
                    validator: validator.clone(),
                    chain_validator: index.get(validator.address.as_str()).map(|cv| (*cv).clone()),
                })
                .collect(),
            rounds: self.all_rounds.rounds.clone(),
        }
    }

    /// Height used for upgrade projections: consensus first, node status as a fallback
    pub fn current_height(&self) -> Option<i64> {
        if self.consensus_updated_at.is_some() {
            return Some(self.hrs.height);
        }

        self.node_status.as_ref().and_then(|status| status.latest_block_height)
    }

    pub fn upgrade_progress(&self, now: DateTime<Utc>) -> Option<UpgradeProgress> {
        let upgrade = self.upgrade.as_ref()?;
        let height = self.current_height()?;
        Some(upgrade.progress(height, self.block_time, now))
    }

    /// Time since the current round started
    pub fn round_age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.start_time.map(|start| now.signed_duration_since(start))
    }
}

//! Roundwatch State
//!
//! The reconciliation side of the dashboard: raw node payloads come in, a
//! typed snapshot of the current height/round comes out.
//!
//! - Classifies every raw vote string as voted, voted-for-zero or nil
//! - Weighs votes by voting power with exact big-number arithmetic
//! - Keeps one error slot per data category so a failing source never
//!   blanks another source's last good data

pub mod chain_validator;
pub mod converter;
pub mod error;
pub mod handle;
pub mod math;
pub mod quorum;
pub mod state;
pub mod status;
pub mod upgrade;
pub mod validator;
pub mod vote;

pub use chain_validator::ChainValidator;
pub use converter::{ConsensusView, HeightRoundStep};
pub use error::{Result, StateError};
pub use handle::StateHandle;
pub use quorum::{Phase, Quorum, QuorumSummary};
pub use state::{AllRoundsView, Category, CategoryErrors, ReconciliationState};
pub use status::NodeStatus;
pub use upgrade::{Upgrade, UpgradeProgress};
pub use validator::{
    AllRoundsVotes, RoundVote, Validator, ValidatorWithChainValidator, ValidatorWithInfo, ValidatorWithRoundVote,
};
pub use vote::VoteState;

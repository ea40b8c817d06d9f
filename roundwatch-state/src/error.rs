use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Could not parse height/round/step {0:?}")]
    InvalidHeightRoundStep(String),

    #[error("Could not parse voting power {power:?} of validator {address}")]
    InvalidVotingPower { address: String, power: String },

    #[error("No vote set for round {0}")]
    MissingRound(i64),

    #[error("Round {round} has {prevotes} prevotes and {precommits} precommits for {validators} validators")]
    MisalignedVotes {
        round: i64,
        prevotes: usize,
        precommits: usize,
        validators: usize,
    },
}

pub type Result<T> = std::result::Result<T, StateError>;

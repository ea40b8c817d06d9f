//! Classification of raw vote strings.
//!
//! Tendermint reports each validator's vote in a round as a debug string,
//! e.g. `Vote{0:ABCD1234 100/00/SIGNED_MSG_TYPE_PREVOTE(Prevote) 8B01023386C3 ...}`,
//! or `nil-Vote` when nothing was received. The only structured signal we
//! rely on is the block hash prefix printed after the message type.

/// Raw string for a vote that was never received (or was explicitly nil)
pub const NIL_VOTE: &str = "nil-Vote";

/// Prefix of a prevote signed for the all-zero block hash
pub const ZERO_PREVOTE_MARKER: &str = "SIGNED_MSG_TYPE_PREVOTE(Prevote) 000000000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteState {
    /// Signed for a concrete, non-zero block
    Voted,
    /// Signed, but for the all-zero block hash
    VotedZero,
    /// Nothing recorded
    VotedNil,
}

impl VoteState {
    /// Classify one raw vote string.
    ///
    /// Only the prevote zero-hash marker is recognised, so a precommit for
    /// the zero hash classifies as [`VoteState::Voted`].
    pub fn from_raw(raw: &str) -> Self {
        if raw == NIL_VOTE {
            return VoteState::VotedNil;
        }

        if raw.contains(ZERO_PREVOTE_MARKER) {
            return VoteState::VotedZero;
        }

        VoteState::Voted
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, VoteState::VotedNil)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            VoteState::Voted => "✅",
            VoteState::VotedZero => "🤷",
            VoteState::VotedNil => "❌",
        }
    }
}

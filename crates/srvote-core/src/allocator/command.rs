//! Commands for the vote allocation kernel.

use crate::ballot::Allocation;
use crate::CandidateId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a fresh wallet balance snapshot.
    SyncBalance { balance: u64 },
    EnableVoting,
    /// `requested: None` clears the entry.
    SetVote {
        candidate: CandidateId,
        requested: Option<i64>,
    },
    Reset,
    Cancel,
    /// Replace the allocation with the account's existing votes.
    LoadVotes { allocation: Allocation },
    BeginSubmit,
    SubmitSucceeded,
    SubmitFailed,
    ExpireSubmitted,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SyncBalance { .. } => "sync_balance",
            Command::EnableVoting => "enable_voting",
            Command::SetVote { .. } => "set_vote",
            Command::Reset => "reset",
            Command::Cancel => "cancel",
            Command::LoadVotes { .. } => "load_votes",
            Command::BeginSubmit => "begin_submit",
            Command::SubmitSucceeded => "submit_succeeded",
            Command::SubmitFailed => "submit_failed",
            Command::ExpireSubmitted => "expire_submitted",
        }
    }
}

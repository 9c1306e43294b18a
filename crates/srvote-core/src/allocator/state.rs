//! State struct for the vote allocation kernel.

use super::types::*;
use crate::ballot::{Allocation, Ballot};
use crate::status::VoteStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub allocation: Allocation,
    /// Last balance snapshot, in whole votes.
    pub balance: u64,
    pub mode: Mode,
    /// Ballot handed to the sink; present only while `Submitting`.
    pub pending_ballot: Option<Ballot>,
}

impl State {
    pub fn init() -> Self {
        Self {
            allocation: Allocation::new(),
            balance: 0,
            mode: Mode::Browsing,
            pending_ballot: None,
        }
    }

    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance,
            ..Self::init()
        }
    }

    pub fn status(&self) -> VoteStatus {
        VoteStatus::compute(self.balance, &self.allocation)
    }

    /// Largest value `candidate` may hold without pushing the total over the balance.
    pub fn available_for(&self, candidate: &crate::CandidateId) -> u64 {
        self.balance
            .saturating_sub(self.allocation.spent_excluding(candidate))
    }
}

impl Default for State {
    fn default() -> Self {
        Self::init()
    }
}

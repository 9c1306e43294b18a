//! Derived budget status of an allocation.

use crate::ballot::Allocation;
use serde::{Deserialize, Serialize};

/// Budget state, in display priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    /// Every vote is assigned.
    Exhausted,
    /// Some votes are still free.
    Remaining,
    /// More votes assigned than the balance holds.
    Overspent,
    /// The wallet has no voting power.
    NoBalance,
}

impl VoteState {
    pub fn message(self) -> &'static str {
        match self {
            VoteState::Exhausted => "All votes are used",
            VoteState::Remaining => "Votes remaining",
            VoteState::Overspent => "Too many votes assigned",
            VoteState::NoBalance => "At least 1 frozen unit is required to vote",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteStatus {
    pub balance: u64,
    pub spent: u64,
    /// `balance - spent`; negative only when overspent.
    pub available: i128,
    pub state: VoteState,
    /// Share of the balance that is spent, in percent. `None` for a zero balance.
    pub percentage: Option<f64>,
}

impl VoteStatus {
    pub fn compute(balance: u64, allocation: &Allocation) -> Self {
        let spent = allocation.spent();
        let available = i128::from(balance) - i128::from(spent);

        let state = if balance == 0 {
            VoteState::NoBalance
        } else if available < 0 {
            VoteState::Overspent
        } else if available == 0 && spent > 0 {
            VoteState::Exhausted
        } else {
            VoteState::Remaining
        };

        let percentage = if balance == 0 {
            None
        } else {
            Some(spent as f64 / balance as f64 * 100.0)
        };

        Self {
            balance,
            spent,
            available,
            state,
            percentage,
        }
    }

    pub fn spend_all(&self) -> bool {
        self.spent > 0 && self.available == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CandidateId;

    fn alloc(pairs: &[(&str, u64)]) -> Allocation {
        Allocation::from_votes(pairs.iter().map(|(k, v)| (CandidateId::new(*k), *v)))
    }

    #[test]
    fn empty_allocation_with_balance_is_remaining() {
        let s = VoteStatus::compute(100, &Allocation::new());
        assert_eq!(s.state, VoteState::Remaining);
        assert_eq!(s.available, 100);
        assert_eq!(s.percentage, Some(0.0));
        assert!(!s.spend_all());
    }

    #[test]
    fn zero_balance_wins_over_everything() {
        let s = VoteStatus::compute(0, &alloc(&[("A", 10)]));
        assert_eq!(s.state, VoteState::NoBalance);
        assert_eq!(s.available, -10);
        assert_eq!(s.percentage, None);
    }

    #[test]
    fn exact_spend_is_exhausted() {
        let s = VoteStatus::compute(100, &alloc(&[("A", 60), ("B", 40)]));
        assert_eq!(s.state, VoteState::Exhausted);
        assert_eq!(s.spent, 100);
        assert_eq!(s.percentage, Some(100.0));
        assert!(s.spend_all());
    }

    #[test]
    fn overspend_is_reported() {
        let s = VoteStatus::compute(50, &alloc(&[("A", 60)]));
        assert_eq!(s.state, VoteState::Overspent);
        assert_eq!(s.available, -10);
    }
}

//! Step function for the vote allocation kernel.
//! This is the single chokepoint for allocator state changes.

use super::{command::Command, invariants::check_invariants, state::State, types::*};
use crate::ballot::{Ballot, VoteEntry};
use crate::MAX_ALLOCATION_ENTRIES;

/// Effects produced by a transition (data, not side effects).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Effects {
    /// Ballot to hand to the sink.
    pub submit: Option<Ballot>,
    /// Delayed work for the host scheduler.
    pub schedule: Vec<Scheduled>,
    /// The UI should drop its search/filter text.
    pub clear_search: bool,
}

/// Execute a transition: (state, command) -> Result<(new_state, effects), Error>
///
/// Invariants are checked pre and post; preconditions in guards. On error the
/// caller's state is untouched.
pub fn step(state: &State, cmd: Command) -> Result<(State, Effects), Error> {
    check_invariants(state)?;

    let (post, effects) = match cmd {
        Command::SyncBalance { balance } => {
            let next = State {
                balance,
                ..state.clone()
            };
            (next, Effects::default())
        }
        Command::EnableVoting => {
            if state.mode != Mode::Browsing {
                return Err(Error::PreconditionFailed("enable_voting guard"));
            }
            if state.balance == 0 {
                return Err(Error::NoBalance);
            }

            let next = State {
                mode: Mode::Allocating,
                ..state.clone()
            };
            (next, Effects::default())
        }
        Command::SetVote {
            candidate,
            requested,
        } => {
            if state.mode != Mode::Allocating {
                return Err(Error::PreconditionFailed("set_vote guard"));
            }
            if !state.allocation.contains(&candidate)
                && state.allocation.len() >= MAX_ALLOCATION_ENTRIES
            {
                return Err(Error::TooManyEntries);
            }

            let entry = match requested {
                None => VoteEntry::Unset,
                Some(v) => {
                    // Negative requests fail the conversion and land on zero.
                    let v = u64::try_from(v).unwrap_or(0);
                    VoteEntry::Votes(v.min(state.available_for(&candidate)))
                }
            };

            let mut next = state.clone();
            next.allocation.set(candidate, entry);

            // P1_SetVoteWithinBudget
            let ceiling = state.balance.max(state.allocation.spent());
            if next.allocation.spent() > ceiling {
                return Err(Error::InvariantViolation("P1_SetVoteWithinBudget"));
            }
            (next, Effects::default())
        }
        Command::Reset => {
            if state.mode == Mode::Submitting {
                return Err(Error::SubmissionInFlight);
            }

            let mut next = state.clone();
            next.allocation.clear();
            (next, Effects::default())
        }
        Command::Cancel => {
            if state.mode != Mode::Allocating {
                return Err(Error::PreconditionFailed("cancel guard"));
            }

            let mut next = state.clone();
            next.allocation.clear();
            next.mode = Mode::Browsing;
            let effects = Effects {
                clear_search: true,
                ..Effects::default()
            };
            (next, effects)
        }
        Command::LoadVotes { allocation } => {
            if state.mode == Mode::Submitting {
                return Err(Error::SubmissionInFlight);
            }
            if allocation.len() > MAX_ALLOCATION_ENTRIES {
                return Err(Error::TooManyEntries);
            }

            let next = State {
                allocation,
                ..state.clone()
            };
            (next, Effects::default())
        }
        Command::BeginSubmit => {
            match state.mode {
                Mode::Allocating => {}
                Mode::Submitting => return Err(Error::SubmissionInFlight),
                Mode::Submitted => return Err(Error::AlreadySubmitted),
                Mode::Browsing => return Err(Error::PreconditionFailed("begin_submit guard")),
            }

            let ballot = state.allocation.to_ballot();
            let next = State {
                mode: Mode::Submitting,
                pending_ballot: Some(ballot.clone()),
                ..state.clone()
            };
            let effects = Effects {
                submit: Some(ballot),
                ..Effects::default()
            };
            (next, effects)
        }
        Command::SubmitSucceeded => {
            if state.mode != Mode::Submitting {
                return Err(Error::PreconditionFailed("submit_succeeded guard"));
            }

            let next = State {
                mode: Mode::Submitted,
                pending_ballot: None,
                ..state.clone()
            };
            let effects = Effects {
                schedule: vec![Scheduled::RefreshBalance, Scheduled::ExpireSubmitted],
                ..Effects::default()
            };
            (next, effects)
        }
        Command::SubmitFailed => {
            if state.mode != Mode::Submitting {
                return Err(Error::PreconditionFailed("submit_failed guard"));
            }

            let next = State {
                mode: Mode::Allocating,
                pending_ballot: None,
                ..state.clone()
            };
            (next, Effects::default())
        }
        Command::ExpireSubmitted => {
            if state.mode != Mode::Submitted {
                return Err(Error::PreconditionFailed("expire_submitted guard"));
            }

            let next = State {
                mode: Mode::Browsing,
                ..state.clone()
            };
            (next, Effects::default())
        }
    };

    check_invariants(&post)?;
    Ok((post, effects))
}

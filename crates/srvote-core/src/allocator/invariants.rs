//! Invariant checker for the vote allocation kernel.

use super::{state::State, types::*};
use crate::MAX_ALLOCATION_ENTRIES;

/// Check all invariants. Returns Err if any violated.
pub fn check_invariants(state: &State) -> Result<(), Error> {
    // I1_PendingBallotIffSubmitting
    if state.pending_ballot.is_some() != (state.mode == Mode::Submitting) {
        return Err(Error::InvariantViolation("I1_PendingBallotIffSubmitting"));
    }

    // I2_BoundedEntries
    if state.allocation.len() > MAX_ALLOCATION_ENTRIES {
        return Err(Error::InvariantViolation("I2_BoundedEntries"));
    }

    // I3_PendingBallotPositive
    if let Some(ballot) = &state.pending_ballot {
        if ballot.iter().any(|(_, v)| v == 0) {
            return Err(Error::InvariantViolation("I3_PendingBallotPositive"));
        }
    }

    Ok(())
}

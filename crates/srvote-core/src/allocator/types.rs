//! Domain types for the vote allocation kernel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvariantViolation(&'static str),
    PreconditionFailed(&'static str),
    /// A ballot is already with the sink.
    SubmissionInFlight,
    /// The last ballot was accepted and the submitted window is still open.
    AlreadySubmitted,
    /// Voting needs a non-zero balance.
    NoBalance,
    /// The allocation would exceed `MAX_ALLOCATION_ENTRIES`.
    TooManyEntries,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvariantViolation(id) => write!(f, "Invariant violated: {id}"),
            Error::PreconditionFailed(id) => write!(f, "Precondition failed: {id}"),
            Error::SubmissionInFlight => write!(f, "A ballot submission is already in flight"),
            Error::AlreadySubmitted => write!(f, "Votes were just submitted"),
            Error::NoBalance => write!(f, "No voting power available"),
            Error::TooManyEntries => write!(f, "Too many allocation entries"),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Browsing,
    Allocating,
    Submitting,
    Submitted,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Browsing
    }
}

/// Delayed work requested by a transition. The host decides the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheduled {
    RefreshBalance,
    ExpireSubmitted,
}

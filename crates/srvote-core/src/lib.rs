//! srvote core: Super Representative vote allocation.
//!
//! A wallet with frozen stake holds a fixed budget of votes. This crate lets a
//! host distribute that budget across candidates, derive the budget status, and
//! submit the resulting ballot through an external sink.
//!
//! Layout:
//! - `allocator`: pure state machine (state, command, step, invariants).
//! - `session`: owns an allocator state and drives the collaborators in `ports`.
//! - `actor`: message-passing front end for a session.
//! - `ranking`: read-only candidate views (rank, search, shares).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod actor;
pub mod allocator;
pub mod ballot;
pub mod config;
pub mod input;
pub mod ports;
pub mod ranking;
pub mod session;
pub mod status;

pub use actor::{spawn_allocator, AllocatorHandle};
pub use ballot::{Allocation, Ballot, VoteEntry};
pub use config::VoteConfig;
pub use session::{AllocatorSnapshot, SessionEvent, SubmitReceipt, VoteSession};
pub use status::{VoteState, VoteStatus};

/// Smallest on-chain unit per whole unit of frozen stake.
pub const SUN_PER_UNIT: u64 = 1_000_000;

/// Upper bound on allocation entries accepted by the kernel.
pub const MAX_ALLOCATION_ENTRIES: usize = 512;

/// Unique candidate identifier (the candidate's account address).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Voting power of a wallet, in whole votes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(pub u64);

impl Balance {
    pub const ZERO: Balance = Balance(0);

    /// Convert a frozen amount expressed in sun into whole votes (floor).
    pub fn from_frozen_sun(sun: u64) -> Self {
        Self(sun / SUN_PER_UNIT)
    }

    pub fn votes(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// A Super Representative candidate as supplied by the candidate loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(alias = "address")]
    pub id: CandidateId,
    #[serde(alias = "votes")]
    pub current_votes: u64,
    #[serde(default)]
    pub change_day: i64,
    #[serde(default)]
    pub change_cycle: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "hasPage")]
    pub has_page: bool,
}

impl Candidate {
    pub fn new(id: impl Into<String>, current_votes: u64) -> Self {
        Self {
            id: CandidateId::new(id),
            current_votes,
            change_day: 0,
            change_cycle: 0,
            name: String::new(),
            url: String::new(),
            has_page: false,
        }
    }

    /// Name if set, otherwise the url.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

/// Unified error type for srvote operations.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Transition rejected: {0}")]
    Transition(#[from] allocator::Error),

    #[error("Ballot submission failed: {message}")]
    SubmissionRejected { message: String },

    #[error("Collaborator error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Allocator actor is no longer running")]
    ActorClosed,
}

pub type Result<T> = std::result::Result<T, VoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_sun_rounds_down_to_whole_votes() {
        assert_eq!(Balance::from_frozen_sun(0), Balance::ZERO);
        assert_eq!(Balance::from_frozen_sun(999_999), Balance::ZERO);
        assert_eq!(Balance::from_frozen_sun(2_500_000), Balance(2));
    }

    #[test]
    fn candidate_accepts_address_and_votes_aliases() {
        let raw = r#"{"address":"TXa","votes":42,"change_cycle":-3,"url":"https://a.example"}"#;
        let c: Candidate = serde_json::from_str(raw).expect("candidate json");
        assert_eq!(c.id, CandidateId::new("TXa"));
        assert_eq!(c.current_votes, 42);
        assert_eq!(c.change_cycle, -3);
        assert_eq!(c.change_day, 0);
        assert_eq!(c.display_name(), "https://a.example");
        assert!(!c.has_page);
    }

    #[test]
    fn candidate_reads_camel_case_page_flag() {
        let raw = r#"{"address":"TXb","votes":1,"hasPage":true}"#;
        let c: Candidate = serde_json::from_str(raw).expect("candidate json");
        assert!(c.has_page);
    }
}

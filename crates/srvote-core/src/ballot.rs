//! Allocation and ballot types.

use crate::CandidateId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One allocation entry.
///
/// `Unset` records a cleared or non-numeric input. It counts as zero everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteEntry {
    Unset,
    Votes(u64),
}

impl VoteEntry {
    pub fn votes(self) -> u64 {
        match self {
            VoteEntry::Unset => 0,
            VoteEntry::Votes(v) => v,
        }
    }
}

impl Default for VoteEntry {
    fn default() -> Self {
        Self::Unset
    }
}

/// In-progress distribution of votes across candidates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation {
    entries: BTreeMap<CandidateId, VoteEntry>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from plain vote counts (e.g. the account's existing votes).
    pub fn from_votes(votes: impl IntoIterator<Item = (CandidateId, u64)>) -> Self {
        Self {
            entries: votes
                .into_iter()
                .map(|(id, v)| (id, VoteEntry::Votes(v)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &CandidateId) -> Option<VoteEntry> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.entries.contains_key(id)
    }

    /// Votes assigned to `id`, zero when absent or unset.
    pub fn votes_for(&self, id: &CandidateId) -> u64 {
        self.get(id).map(VoteEntry::votes).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateId, &VoteEntry)> {
        self.entries.iter()
    }

    /// Sum of all entries.
    pub fn spent(&self) -> u64 {
        self.entries
            .values()
            .fold(0u64, |acc, e| acc.saturating_add(e.votes()))
    }

    /// Sum of all entries except the one for `id`.
    pub fn spent_excluding(&self, id: &CandidateId) -> u64 {
        self.entries
            .iter()
            .filter(|(k, _)| *k != id)
            .fold(0u64, |acc, (_, e)| acc.saturating_add(e.votes()))
    }

    pub(crate) fn set(&mut self, id: CandidateId, entry: VoteEntry) {
        self.entries.insert(id, entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Finalize into a ballot. Unset and zero entries are dropped.
    pub fn to_ballot(&self) -> Ballot {
        Ballot {
            votes: self
                .entries
                .iter()
                .filter_map(|(id, e)| match *e {
                    VoteEntry::Votes(v) if v > 0 => Some((id.clone(), v)),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Finalized mapping of candidate to vote count, as handed to the ballot sink.
///
/// Only strictly positive counts are present; a missing candidate means no vote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ballot {
    votes: BTreeMap<CandidateId, u64>,
}

impl Ballot {
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn get(&self, id: &CandidateId) -> u64 {
        self.votes.get(id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.votes.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateId, u64)> {
        self.votes.iter().map(|(k, v)| (k, *v))
    }
}

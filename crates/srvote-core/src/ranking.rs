//! Read-only candidate views: ranking, search, totals and vote shares.

use crate::Candidate;
use serde::Serialize;

/// Candidate with its 0-based position in the vote ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub candidate: Candidate,
}

impl RankedCandidate {
    /// 1-based position for display.
    pub fn position(&self) -> usize {
        self.rank + 1
    }
}

/// Sort by current votes, highest first. Ties keep their input order.
pub fn rank_candidates(candidates: &[Candidate]) -> Vec<RankedCandidate> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| b.current_votes.cmp(&a.current_votes));
    sorted
        .into_iter()
        .enumerate()
        .map(|(rank, c)| RankedCandidate {
            rank,
            candidate: c.clone(),
        })
        .collect()
}

/// Case-insensitive substring match on the url and, when set, the name.
///
/// A blank query matches everything. Ranks are preserved.
pub fn filter_candidates<'a>(
    ranked: &'a [RankedCandidate],
    query: &str,
) -> Vec<&'a RankedCandidate> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return ranked.iter().collect();
    }

    ranked
        .iter()
        .filter(|r| {
            let c = &r.candidate;
            c.url.trim().to_lowercase().contains(&needle)
                || (!c.name.is_empty() && c.name.trim().to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn total_votes(candidates: &[Candidate]) -> u64 {
    candidates
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.current_votes))
}

/// Share of `total` held by `votes`, in percent. `None` when `total` is 0.
pub fn vote_share(votes: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(votes as f64 / total as f64 * 100.0)
}

/// Candidate with the largest `change_cycle`; the first one wins ties.
pub fn biggest_gainer(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .reduce(|best, c| if c.change_cycle > best.change_cycle { c } else { best })
}

/// Direction of a vote change metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "direction", content = "amount")]
pub enum VoteChange {
    Up(i64),
    Down(i64),
    Flat,
}

impl VoteChange {
    pub fn of(value: i64) -> Self {
        match value {
            v if v > 0 => VoteChange::Up(v),
            v if v < 0 => VoteChange::Down(v),
            _ => VoteChange::Flat,
        }
    }
}

impl std::fmt::Display for VoteChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteChange::Up(v) => write!(f, "+{v}"),
            VoteChange::Down(v) => write!(f, "{v}"),
            VoteChange::Flat => f.write_str("-"),
        }
    }
}

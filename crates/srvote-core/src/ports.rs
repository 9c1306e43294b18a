//! Collaborator boundaries.
//!
//! The allocator reads the wallet balance and candidate data, and hands ballots
//! to a sink. None of these are implemented here; hosts plug in their wallet
//! and API clients. Delayed work goes through a [`Scheduler`].

use crate::ballot::Ballot;
use crate::{Balance, Candidate, CandidateId, Result};
use std::collections::BTreeMap;
use std::time::Duration;

/// Wallet voting power.
pub trait WalletBalance: Send + Sync {
    /// Current frozen stake in whole votes (synchronous snapshot).
    fn frozen_balance(&self) -> Balance;

    /// Ask the wallet to reload from the chain. Fire and forget.
    fn request_refresh(&self);
}

/// Candidate list loader.
#[async_trait::async_trait]
pub trait CandidateSource: Send + Sync {
    async fn load_candidates(&self) -> Result<Vec<Candidate>>;
}

/// Votes the account already cast on chain.
#[async_trait::async_trait]
pub trait AccountVotesSource: Send + Sync {
    async fn account_votes(&self, address: &str) -> Result<BTreeMap<CandidateId, u64>>;
}

/// Result of handing a ballot to the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl SubmissionOutcome {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Signs and broadcasts ballots.
///
/// Transport and signing errors are reported as `success == false`.
#[async_trait::async_trait]
pub trait BallotSink: Send + Sync {
    async fn submit_ballot(&self, ballot: &Ballot) -> SubmissionOutcome;
}

/// Run a callback after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule_after(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>) -> TimerHandle;
}

/// Handle to a scheduled callback. Dropping it cancels the callback.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}

/// Scheduler backed by the ambient tokio runtime.
///
/// Must be used from within a runtime context.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>) -> TimerHandle {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        let abort = task.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

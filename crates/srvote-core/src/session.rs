//! Vote session: owns the allocator state and talks to the collaborators.
//!
//! The session is the only writer of the allocation. Every change goes through
//! the kernel [`step`](crate::allocator::step); the session then carries out
//! the returned effects (sink call, timers, UI notifications).
//!
//! Timers never touch the session directly. A fired timer posts a
//! [`TimerEvent`] on a channel and the owner feeds it back through
//! [`VoteSession::handle_timer`]. Dropping the session cancels its timers.

use crate::allocator::{self, step, Command, Effects, Mode, Scheduled, State};
use crate::ballot::{Allocation, Ballot, VoteEntry};
use crate::config::VoteConfig;
use crate::input::parse_vote_input;
use crate::ports::{
    AccountVotesSource, BallotSink, CandidateSource, Scheduler, SubmissionOutcome, TimerHandle,
    WalletBalance,
};
use crate::ranking::{rank_candidates, RankedCandidate};
use crate::status::VoteStatus;
use crate::{Candidate, CandidateId, Result, VoteError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, instrument, warn};

/// Message shown when the sink gives no reason.
pub const DEFAULT_SUBMISSION_FAILURE: &str =
    "Something went wrong while submitting your votes. Please try again later.";

const EVENT_CAPACITY: usize = 64;

/// Notifications for the UI collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    ModeChanged { mode: Mode },
    /// The UI should drop its search/filter text.
    SearchCleared,
    Submitted { ballot: Ballot },
    SubmissionFailed { message: String },
    BalanceRefreshRequested,
}

/// Timer completions routed back into the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    SubmittedExpired { generation: u64 },
}

/// Read-only view of the session for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocatorSnapshot {
    pub mode: Mode,
    pub allocation: Allocation,
    pub status: VoteStatus,
    pub step_size: u64,
}

/// Returned by a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub ballot: Ballot,
    pub total_votes: u64,
}

pub struct VoteSession {
    state: State,
    config: VoteConfig,
    wallet: Arc<dyn WalletBalance>,
    sink: Arc<dyn BallotSink>,
    scheduler: Arc<dyn Scheduler>,
    candidates: Vec<Candidate>,
    /// Bumped on every accepted ballot; stale expiry timers are ignored.
    generation: u64,
    refresh_timer: Option<TimerHandle>,
    expire_timer: Option<TimerHandle>,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    timer_rx: Option<mpsc::UnboundedReceiver<TimerEvent>>,
    events: broadcast::Sender<SessionEvent>,
}

impl VoteSession {
    pub fn new(
        config: VoteConfig,
        wallet: Arc<dyn WalletBalance>,
        sink: Arc<dyn BallotSink>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = State::with_balance(wallet.frozen_balance().votes());
        Self {
            state,
            config,
            wallet,
            sink,
            scheduler,
            candidates: Vec::new(),
            generation: 0,
            refresh_timer: None,
            expire_timer: None,
            timer_tx,
            timer_rx: Some(timer_rx),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }

    pub fn config(&self) -> &VoteConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn allocation(&self) -> &Allocation {
        &self.state.allocation
    }

    /// Status against the wallet's current balance.
    pub fn compute_status(&self) -> VoteStatus {
        VoteStatus::compute(self.live_balance(), &self.state.allocation)
    }

    /// Size of one +/- step: `ceil(balance / step_divisor)`.
    pub fn step_size(&self) -> u64 {
        self.config.allocation.step_size(self.live_balance())
    }

    pub fn snapshot(&self) -> AllocatorSnapshot {
        AllocatorSnapshot {
            mode: self.state.mode,
            allocation: self.state.allocation.clone(),
            status: self.compute_status(),
            step_size: self.step_size(),
        }
    }

    fn live_balance(&self) -> u64 {
        self.wallet.frozen_balance().votes()
    }

    /// Take the wallet's current balance into the kernel.
    pub fn sync_balance(&mut self) {
        let balance = self.live_balance();
        if balance != self.state.balance {
            // SyncBalance has no guard; it only fails on a corrupted state.
            if let Err(err) = self.apply(Command::SyncBalance { balance }) {
                warn!(error = %err, "balance sync rejected");
            }
        }
    }

    pub fn enable_voting(&mut self) -> Result<()> {
        self.sync_balance();
        self.apply(Command::EnableVoting)?;
        Ok(())
    }

    /// Set a candidate's votes from raw text input.
    ///
    /// Non-numeric input clears the entry; negative values become 0; values
    /// above the candidate's share of the free budget are clamped to it.
    pub fn set_vote(&mut self, candidate: &CandidateId, raw: &str) -> Result<VoteEntry> {
        self.write_vote(candidate, parse_vote_input(raw))
    }

    /// Same clamping as [`set_vote`](Self::set_vote) for an already numeric request.
    pub fn set_vote_count(&mut self, candidate: &CandidateId, votes: i64) -> Result<VoteEntry> {
        self.write_vote(candidate, Some(votes))
    }

    pub fn increment(&mut self, candidate: &CandidateId) -> Result<VoteEntry> {
        self.nudge(candidate, 1)
    }

    pub fn decrement(&mut self, candidate: &CandidateId) -> Result<VoteEntry> {
        self.nudge(candidate, -1)
    }

    fn nudge(&mut self, candidate: &CandidateId, direction: i64) -> Result<VoteEntry> {
        self.sync_balance();
        let current = i64::try_from(self.state.allocation.votes_for(candidate)).unwrap_or(i64::MAX);
        let step = i64::try_from(self.step_size()).unwrap_or(i64::MAX);
        self.write_vote(
            candidate,
            Some(current.saturating_add(step.saturating_mul(direction))),
        )
    }

    fn write_vote(&mut self, candidate: &CandidateId, requested: Option<i64>) -> Result<VoteEntry> {
        self.sync_balance();
        self.apply(Command::SetVote {
            candidate: candidate.clone(),
            requested,
        })?;
        Ok(self
            .state
            .allocation
            .get(candidate)
            .unwrap_or(VoteEntry::Unset))
    }

    /// Clear the allocation. The mode is unchanged.
    pub fn reset(&mut self) -> Result<()> {
        self.sync_balance();
        self.apply(Command::Reset)?;
        Ok(())
    }

    /// Clear the allocation and leave voting.
    pub fn cancel(&mut self) -> Result<()> {
        self.sync_balance();
        self.apply(Command::Cancel)?;
        Ok(())
    }

    /// Move to `Submitting` and return the ballot to hand to the sink.
    pub fn begin_submit(&mut self) -> Result<Ballot> {
        self.sync_balance();
        let effects = self.apply(Command::BeginSubmit).map_err(|err| {
            warn!(error = %err, "submission refused");
            err
        })?;
        effects.submit.ok_or(VoteError::Transition(
            allocator::Error::InvariantViolation("begin_submit produced no ballot"),
        ))
    }

    /// Record the sink's answer for the ballot from [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(
        &mut self,
        ballot: Ballot,
        outcome: SubmissionOutcome,
    ) -> Result<SubmitReceipt> {
        if outcome.success {
            self.apply(Command::SubmitSucceeded)?;
            let total_votes = ballot.total();
            info!(
                candidates = ballot.len(),
                total_votes, "ballot accepted"
            );
            let _ = self.events.send(SessionEvent::Submitted {
                ballot: ballot.clone(),
            });
            Ok(SubmitReceipt {
                ballot,
                total_votes,
            })
        } else {
            self.apply(Command::SubmitFailed)?;
            let message = outcome
                .message
                .unwrap_or_else(|| DEFAULT_SUBMISSION_FAILURE.to_string());
            warn!(%message, "ballot rejected by sink");
            let _ = self.events.send(SessionEvent::SubmissionFailed {
                message: message.clone(),
            });
            Err(VoteError::SubmissionRejected { message })
        }
    }

    /// Return to `Allocating` after a submission whose answer will never arrive.
    pub fn abandon_submission(&mut self) -> Result<()> {
        self.apply(Command::SubmitFailed)?;
        Ok(())
    }

    /// Submit the current allocation and wait for the sink.
    ///
    /// A session that is already submitting or has just submitted rejects the
    /// call without contacting the sink.
    #[instrument(skip(self), fields(entries = self.state.allocation.len()))]
    pub async fn submit(&mut self) -> Result<SubmitReceipt> {
        let ballot = self.begin_submit()?;
        let outcome = self.sink.submit_ballot(&ballot).await;
        self.finish_submit(ballot, outcome)
    }

    pub(crate) fn sink(&self) -> Arc<dyn BallotSink> {
        Arc::clone(&self.sink)
    }

    /// Replace the allocation with votes the account already holds.
    pub fn apply_loaded_votes(&mut self, votes: BTreeMap<CandidateId, u64>) -> Result<()> {
        self.sync_balance();
        self.apply(Command::LoadVotes {
            allocation: Allocation::from_votes(votes),
        })?;
        Ok(())
    }

    pub async fn load_current_votes(
        &mut self,
        source: &dyn AccountVotesSource,
        address: &str,
    ) -> Result<()> {
        let votes = source.account_votes(address).await?;
        debug!(address, entries = votes.len(), "loaded account votes");
        self.apply_loaded_votes(votes)
    }

    pub async fn refresh_candidates(&mut self, source: &dyn CandidateSource) -> Result<&[Candidate]> {
        self.candidates = source.load_candidates().await?;
        debug!(count = self.candidates.len(), "candidate list refreshed");
        Ok(&self.candidates)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn ranked_candidates(&self) -> Vec<RankedCandidate> {
        rank_candidates(&self.candidates)
    }

    /// Hand the timer receiver to an external event loop.
    ///
    /// Afterwards [`process_due_timers`](Self::process_due_timers) sees nothing.
    pub fn take_timer_events(&mut self) -> Option<mpsc::UnboundedReceiver<TimerEvent>> {
        self.timer_rx.take()
    }

    /// Handle every timer event that has already fired. Returns how many.
    pub fn process_due_timers(&mut self) -> usize {
        let mut due = Vec::new();
        if let Some(rx) = self.timer_rx.as_mut() {
            while let Ok(event) = rx.try_recv() {
                due.push(event);
            }
        }
        let count = due.len();
        for event in due {
            self.handle_timer(event);
        }
        count
    }

    pub fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::SubmittedExpired { generation } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "stale expiry timer");
                    return;
                }
                self.expire_timer = None;
                if let Err(err) = self.apply(Command::ExpireSubmitted) {
                    warn!(error = %err, "expiry timer ignored");
                }
            }
        }
    }

    fn apply(&mut self, cmd: Command) -> std::result::Result<Effects, allocator::Error> {
        let name = cmd.name();
        let (post, effects) = step(&self.state, cmd).map_err(|err| {
            debug!(command = name, error = %err, "transition rejected");
            err
        })?;

        let mode_changed = post.mode != self.state.mode;
        self.state = post;
        debug!(command = name, mode = ?self.state.mode, spent = self.state.allocation.spent(), "transition");

        if mode_changed {
            let _ = self.events.send(SessionEvent::ModeChanged {
                mode: self.state.mode,
            });
        }
        if effects.clear_search {
            let _ = self.events.send(SessionEvent::SearchCleared);
        }
        for scheduled in &effects.schedule {
            self.schedule(*scheduled);
        }
        Ok(effects)
    }

    fn schedule(&mut self, scheduled: Scheduled) {
        match scheduled {
            Scheduled::RefreshBalance => {
                let wallet = Arc::clone(&self.wallet);
                let events = self.events.clone();
                let handle = self.scheduler.schedule_after(
                    self.config.timing.balance_refresh_delay(),
                    Box::new(move || {
                        wallet.request_refresh();
                        let _ = events.send(SessionEvent::BalanceRefreshRequested);
                    }),
                );
                self.refresh_timer = Some(handle);
            }
            Scheduled::ExpireSubmitted => {
                self.generation += 1;
                let generation = self.generation;
                let tx = self.timer_tx.clone();
                let handle = self.scheduler.schedule_after(
                    self.config.timing.submitted_reset_delay(),
                    Box::new(move || {
                        let _ = tx.send(TimerEvent::SubmittedExpired { generation });
                    }),
                );
                self.expire_timer = Some(handle);
            }
        }
    }
}

impl std::fmt::Debug for VoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteSession")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("candidates", &self.candidates.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#![allow(dead_code)]

use srvote_core::ports::{
    AccountVotesSource, BallotSink, CandidateSource, SubmissionOutcome, TokioScheduler,
    WalletBalance,
};
use srvote_core::{Balance, Ballot, Candidate, CandidateId, VoteConfig, VoteError, VoteSession};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn id(s: &str) -> CandidateId {
    CandidateId::new(s)
}

#[derive(Default)]
pub struct TestWallet {
    pub balance: AtomicU64,
    pub refreshes: AtomicUsize,
}

impl TestWallet {
    pub fn with_balance(votes: u64) -> Arc<Self> {
        Arc::new(Self {
            balance: AtomicU64::new(votes),
            refreshes: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, votes: u64) {
        self.balance.store(votes, Ordering::SeqCst);
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl WalletBalance for TestWallet {
    fn frozen_balance(&self) -> Balance {
        Balance(self.balance.load(Ordering::SeqCst))
    }

    fn request_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink that records every ballot and answers with a fixed verdict.
pub struct RecordingSink {
    pub accept: AtomicBool,
    pub ballots: Mutex<Vec<Ballot>>,
    /// When set, each call waits for a `notify_one` before answering.
    pub gate: Option<Notify>,
}

impl RecordingSink {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            accept: AtomicBool::new(true),
            ballots: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            accept: AtomicBool::new(false),
            ballots: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            accept: AtomicBool::new(true),
            ballots: Mutex::new(Vec::new()),
            gate: Some(Notify::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.ballots.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Ballot> {
        self.ballots.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl BallotSink for RecordingSink {
    async fn submit_ballot(&self, ballot: &Ballot) -> SubmissionOutcome {
        self.ballots.lock().unwrap().push(ballot.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.accept.load(Ordering::SeqCst) {
            SubmissionOutcome::accepted()
        } else {
            SubmissionOutcome {
                success: false,
                message: None,
            }
        }
    }
}

pub struct StaticCandidates(pub Vec<Candidate>);

#[async_trait::async_trait]
impl CandidateSource for StaticCandidates {
    async fn load_candidates(&self) -> srvote_core::Result<Vec<Candidate>> {
        Ok(self.0.clone())
    }
}

pub struct StaticVotes(pub BTreeMap<String, BTreeMap<CandidateId, u64>>);

#[async_trait::async_trait]
impl AccountVotesSource for StaticVotes {
    async fn account_votes(&self, address: &str) -> srvote_core::Result<BTreeMap<CandidateId, u64>> {
        self.0
            .get(address)
            .cloned()
            .ok_or_else(|| VoteError::Source(format!("unknown account {address}")))
    }
}

pub fn session(wallet: Arc<TestWallet>, sink: Arc<RecordingSink>) -> VoteSession {
    VoteSession::new(
        VoteConfig::default(),
        wallet,
        sink,
        Arc::new(TokioScheduler),
    )
}

//! Message-passing front end for a [`VoteSession`].
//!
//! The session runs inside a single tokio task. UI code talks to it through a
//! cloneable [`AllocatorHandle`] and listens for [`SessionEvent`]s. While a
//! ballot is with the sink the task keeps serving requests, so a second
//! submit is answered with `SubmissionInFlight` instead of queueing.

use crate::ballot::{Ballot, VoteEntry};
use crate::ports::SubmissionOutcome;
use crate::session::{AllocatorSnapshot, SessionEvent, SubmitReceipt, VoteSession};
use crate::{CandidateId, Result, VoteError};
use std::collections::BTreeMap;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

const REQUEST_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Request {
    Snapshot(oneshot::Sender<AllocatorSnapshot>),
    EnableVoting(Reply<()>),
    SetVote {
        candidate: CandidateId,
        raw: String,
        reply: Reply<VoteEntry>,
    },
    SetVoteCount {
        candidate: CandidateId,
        votes: i64,
        reply: Reply<VoteEntry>,
    },
    Increment {
        candidate: CandidateId,
        reply: Reply<VoteEntry>,
    },
    Decrement {
        candidate: CandidateId,
        reply: Reply<VoteEntry>,
    },
    Reset(Reply<()>),
    Cancel(Reply<()>),
    LoadVotes {
        votes: BTreeMap<CandidateId, u64>,
        reply: Reply<()>,
    },
    Submit(Reply<SubmitReceipt>),
}

struct SubmitDone {
    ballot: Ballot,
    outcome: SubmissionOutcome,
    reply: Reply<SubmitReceipt>,
}

/// Cloneable handle to a running allocator task.
#[derive(Clone)]
pub struct AllocatorHandle {
    requests: mpsc::Sender<Request>,
    events: broadcast::Sender<SessionEvent>,
}

/// Move `session` into its own task. The task stops once every handle is dropped.
pub fn spawn_allocator(session: VoteSession) -> (AllocatorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(REQUEST_CAPACITY);
    let handle = AllocatorHandle {
        requests: tx,
        events: session.event_sender(),
    };
    let task = tokio::spawn(run(session, rx));
    (handle, task)
}

async fn run(mut session: VoteSession, mut requests: mpsc::Receiver<Request>) {
    let Some(mut timers) = session.take_timer_events() else {
        debug!("session timer events already taken; allocator not started");
        return;
    };
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SubmitDone>();

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                handle_request(&mut session, request, &done_tx);
            }
            Some(event) = timers.recv() => session.handle_timer(event),
            Some(done) = done_rx.recv() => {
                let result = session.finish_submit(done.ballot, done.outcome);
                let _ = done.reply.send(result);
            }
        }
    }
    debug!("allocator task stopped");
}

fn handle_request(
    session: &mut VoteSession,
    request: Request,
    done_tx: &mpsc::UnboundedSender<SubmitDone>,
) {
    match request {
        Request::Snapshot(reply) => {
            let _ = reply.send(session.snapshot());
        }
        Request::EnableVoting(reply) => {
            let _ = reply.send(session.enable_voting());
        }
        Request::SetVote {
            candidate,
            raw,
            reply,
        } => {
            let _ = reply.send(session.set_vote(&candidate, &raw));
        }
        Request::SetVoteCount {
            candidate,
            votes,
            reply,
        } => {
            let _ = reply.send(session.set_vote_count(&candidate, votes));
        }
        Request::Increment { candidate, reply } => {
            let _ = reply.send(session.increment(&candidate));
        }
        Request::Decrement { candidate, reply } => {
            let _ = reply.send(session.decrement(&candidate));
        }
        Request::Reset(reply) => {
            let _ = reply.send(session.reset());
        }
        Request::Cancel(reply) => {
            let _ = reply.send(session.cancel());
        }
        Request::LoadVotes { votes, reply } => {
            let _ = reply.send(session.apply_loaded_votes(votes));
        }
        Request::Submit(reply) => {
            let ballot = match session.begin_submit() {
                Ok(ballot) => ballot,
                Err(err) => {
                    let _ = reply.send(Err(err));
                    return;
                }
            };
            let sink = session.sink();
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let outcome = sink.submit_ballot(&ballot).await;
                let _ = done_tx.send(SubmitDone {
                    ballot,
                    outcome,
                    reply,
                });
            });
        }
    }
}

impl AllocatorHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Request) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(make(tx))
            .await
            .map_err(|_| VoteError::ActorClosed)?;
        rx.await.map_err(|_| VoteError::ActorClosed)?
    }

    pub async fn snapshot(&self) -> Result<AllocatorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(Request::Snapshot(tx))
            .await
            .map_err(|_| VoteError::ActorClosed)?;
        rx.await.map_err(|_| VoteError::ActorClosed)
    }

    pub async fn enable_voting(&self) -> Result<()> {
        self.call(Request::EnableVoting).await
    }

    pub async fn set_vote(&self, candidate: CandidateId, raw: impl Into<String>) -> Result<VoteEntry> {
        let raw = raw.into();
        self.call(|reply| Request::SetVote {
            candidate,
            raw,
            reply,
        })
        .await
    }

    pub async fn set_vote_count(&self, candidate: CandidateId, votes: i64) -> Result<VoteEntry> {
        self.call(|reply| Request::SetVoteCount {
            candidate,
            votes,
            reply,
        })
        .await
    }

    pub async fn increment(&self, candidate: CandidateId) -> Result<VoteEntry> {
        self.call(|reply| Request::Increment { candidate, reply })
            .await
    }

    pub async fn decrement(&self, candidate: CandidateId) -> Result<VoteEntry> {
        self.call(|reply| Request::Decrement { candidate, reply })
            .await
    }

    pub async fn reset(&self) -> Result<()> {
        self.call(Request::Reset).await
    }

    pub async fn cancel(&self) -> Result<()> {
        self.call(Request::Cancel).await
    }

    pub async fn load_votes(&self, votes: BTreeMap<CandidateId, u64>) -> Result<()> {
        self.call(|reply| Request::LoadVotes { votes, reply }).await
    }

    /// Submit the current allocation. Resolves when the sink has answered.
    pub async fn submit(&self) -> Result<SubmitReceipt> {
        self.call(Request::Submit).await
    }
}

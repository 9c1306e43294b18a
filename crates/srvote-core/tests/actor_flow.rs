mod common;

use common::*;
use srvote_core::allocator::{self, Mode};
use srvote_core::{spawn_allocator, SessionEvent, VoteEntry, VoteError, VoteState};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn handle_drives_a_full_round() {
    let wallet = TestWallet::with_balance(100);
    let sink = RecordingSink::accepting();
    let (handle, task) = spawn_allocator(session(Arc::clone(&wallet), Arc::clone(&sink)));
    let mut events = handle.subscribe();

    handle.enable_voting().await.unwrap();
    assert_eq!(
        handle.set_vote(id("A"), "60").await.unwrap(),
        VoteEntry::Votes(60)
    );
    assert_eq!(
        handle.set_vote_count(id("B"), 60).await.unwrap(),
        VoteEntry::Votes(40)
    );
    assert_eq!(
        handle.snapshot().await.unwrap().status.state,
        VoteState::Exhausted
    );

    let receipt = handle.submit().await.unwrap();
    assert_eq!(receipt.total_votes, 100);
    assert_eq!(handle.snapshot().await.unwrap().mode, Mode::Submitted);

    tokio::time::sleep(Duration::from_millis(5_001)).await;
    assert_eq!(handle.snapshot().await.unwrap().mode, Mode::Browsing);
    assert_eq!(wallet.refresh_count(), 1);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&SessionEvent::BalanceRefreshRequested));
    assert!(seen
        .iter()
        .any(|e| matches!(e, SessionEvent::Submitted { .. })));

    drop(handle);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_in_flight_is_rejected() {
    let sink = RecordingSink::gated();
    let (handle, _task) = spawn_allocator(session(
        TestWallet::with_balance(100),
        Arc::clone(&sink),
    ));

    handle.enable_voting().await.unwrap();
    handle.set_vote(id("A"), "10").await.unwrap();
    handle.set_vote(id("B"), "5").await.unwrap();

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.submit().await })
    };
    // Let the first submission reach the sink.
    while sink.calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(handle.snapshot().await.unwrap().mode, Mode::Submitting);

    let second = handle.submit().await.unwrap_err();
    assert!(matches!(
        second,
        VoteError::Transition(allocator::Error::SubmissionInFlight)
    ));

    // Edits are refused while the ballot is out.
    handle.set_vote(id("A"), "1").await.unwrap_err();

    if let Some(gate) = &sink.gate {
        gate.notify_one();
    }
    let receipt = first.await.unwrap().unwrap();
    assert_eq!(receipt.ballot.get(&id("A")), 10);
    assert_eq!(sink.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn closed_actor_reports_error() {
    let (handle, task) = spawn_allocator(session(
        TestWallet::with_balance(1),
        RecordingSink::accepting(),
    ));
    task.abort();
    let _ = task.await;
    assert!(matches!(handle.reset().await, Err(VoteError::ActorClosed)));
}

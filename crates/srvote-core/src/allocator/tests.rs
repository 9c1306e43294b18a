//! Kernel tests for the vote allocator.

use super::*;
use crate::ballot::{Allocation, VoteEntry};
use crate::status::VoteState;
use crate::CandidateId;
use proptest::prelude::*;

fn id(s: &str) -> CandidateId {
    CandidateId::new(s)
}

fn allocating(balance: u64) -> State {
    let s = State::with_balance(balance);
    let (s, _) = step(&s, Command::EnableVoting).expect("enable voting");
    s
}

fn set(s: &State, who: &str, v: Option<i64>) -> State {
    let cmd = Command::SetVote {
        candidate: id(who),
        requested: v,
    };
    step(s, cmd).expect("set_vote").0
}

#[test]
fn init_satisfies_invariants() {
    let s = State::init();
    assert!(check_invariants(&s).is_ok());
    assert_eq!(s.mode, Mode::Browsing);
}

#[test]
fn second_candidate_is_clamped_to_remaining_budget() {
    let s = allocating(100);
    let s = set(&s, "A", Some(60));
    let s = set(&s, "B", Some(60));

    assert_eq!(s.allocation.votes_for(&id("B")), 40);
    let status = s.status();
    assert_eq!(status.spent, 100);
    assert_eq!(status.available, 0);
    assert_eq!(status.state, VoteState::Exhausted);
}

#[test]
fn own_allocation_can_be_raised_into_freed_budget() {
    let s = allocating(100);
    let s = set(&s, "A", Some(30));
    let s = set(&s, "B", Some(70));
    let s = set(&s, "B", Some(20));
    let s = set(&s, "A", Some(500));

    assert_eq!(s.allocation.votes_for(&id("A")), 80);
    assert_eq!(s.status().state, VoteState::Exhausted);
}

#[test]
fn negative_request_becomes_zero() {
    let s = allocating(10);
    let s = set(&s, "A", Some(-4));
    assert_eq!(s.allocation.get(&id("A")), Some(VoteEntry::Votes(0)));
}

#[test]
fn missing_request_unsets_the_entry() {
    let s = allocating(10);
    let s = set(&s, "A", Some(4));
    let s = set(&s, "A", None);
    assert_eq!(s.allocation.get(&id("A")), Some(VoteEntry::Unset));
    assert_eq!(s.status().spent, 0);
}

#[test]
fn set_vote_is_idempotent() {
    let s = allocating(10);
    let once = set(&s, "A", Some(4));
    let twice = set(&once, "A", Some(4));
    assert_eq!(once, twice);
}

#[test]
fn set_vote_outside_allocating_is_rejected() {
    let s = State::with_balance(10);
    let err = step(
        &s,
        Command::SetVote {
            candidate: id("A"),
            requested: Some(1),
        },
    )
    .unwrap_err();
    assert_eq!(err, Error::PreconditionFailed("set_vote guard"));
}

#[test]
fn enable_voting_needs_balance() {
    let s = State::init();
    assert_eq!(step(&s, Command::EnableVoting).unwrap_err(), Error::NoBalance);
}

#[test]
fn overspent_allocation_can_only_shrink() {
    let s = allocating(100);
    let loaded = Allocation::from_votes([(id("A"), 80), (id("B"), 50)]);
    let (s, _) = step(&s, Command::LoadVotes { allocation: loaded }).unwrap();
    assert_eq!(s.status().state, VoteState::Overspent);

    // B is capped at balance minus the other entries.
    let s = set(&s, "B", Some(60));
    assert_eq!(s.allocation.votes_for(&id("B")), 20);
    assert_eq!(s.status().state, VoteState::Exhausted);
}

#[test]
fn reset_keeps_mode_and_clears_allocation() {
    let s = set(&allocating(10), "A", Some(3));
    let (s, _) = step(&s, Command::Reset).unwrap();
    assert!(s.allocation.is_empty());
    assert_eq!(s.mode, Mode::Allocating);
    assert_eq!(s.status().state, VoteState::Remaining);
    assert_eq!(s.status().available, 10);
}

#[test]
fn cancel_returns_to_browsing_and_clears_search() {
    let s = set(&allocating(10), "A", Some(3));
    let (s, effects) = step(&s, Command::Cancel).unwrap();
    assert_eq!(s.mode, Mode::Browsing);
    assert!(s.allocation.is_empty());
    assert!(effects.clear_search);
}

#[test]
fn submit_flow_success() {
    let s = set(&set(&allocating(100), "A", Some(10)), "B", Some(5));
    let (s, effects) = step(&s, Command::BeginSubmit).unwrap();
    let ballot = effects.submit.expect("ballot effect");
    assert_eq!(ballot.get(&id("A")), 10);
    assert_eq!(ballot.get(&id("B")), 5);
    assert_eq!(s.mode, Mode::Submitting);

    assert_eq!(
        step(&s, Command::BeginSubmit).unwrap_err(),
        Error::SubmissionInFlight
    );

    let (s, effects) = step(&s, Command::SubmitSucceeded).unwrap();
    assert_eq!(s.mode, Mode::Submitted);
    assert_eq!(
        effects.schedule,
        vec![Scheduled::RefreshBalance, Scheduled::ExpireSubmitted]
    );
    assert_eq!(
        step(&s, Command::BeginSubmit).unwrap_err(),
        Error::AlreadySubmitted
    );

    let (s, _) = step(&s, Command::ExpireSubmitted).unwrap();
    assert_eq!(s.mode, Mode::Browsing);
}

#[test]
fn submit_failure_keeps_allocation() {
    let before = set(&allocating(100), "A", Some(10));
    let (pending, _) = step(&before, Command::BeginSubmit).unwrap();
    let (after, effects) = step(&pending, Command::SubmitFailed).unwrap();
    assert_eq!(after, before);
    assert!(effects.schedule.is_empty());
}

#[test]
fn reset_is_rejected_while_submitting() {
    let s = set(&allocating(100), "A", Some(10));
    let (s, _) = step(&s, Command::BeginSubmit).unwrap();
    assert_eq!(step(&s, Command::Reset).unwrap_err(), Error::SubmissionInFlight);
}

#[test]
fn stale_expiry_is_rejected() {
    let s = allocating(100);
    assert!(step(&s, Command::ExpireSubmitted).is_err());
}

#[test]
fn broken_state_is_refused() {
    let mut s = allocating(10);
    s.mode = Mode::Submitting;
    assert_eq!(
        step(&s, Command::Reset).unwrap_err(),
        Error::InvariantViolation("I1_PendingBallotIffSubmitting")
    );
}

fn full_allocation(n: usize) -> Allocation {
    Allocation::from_votes((0..n).map(|i| (id(&format!("C{i}")), 1)))
}

#[test]
fn new_candidate_past_entry_limit_is_rejected() {
    let s = allocating(10_000);
    let (s, _) = step(
        &s,
        Command::LoadVotes {
            allocation: full_allocation(crate::MAX_ALLOCATION_ENTRIES),
        },
    )
    .unwrap();
    assert_eq!(s.allocation.len(), crate::MAX_ALLOCATION_ENTRIES);

    let cmd = Command::SetVote {
        candidate: id("late"),
        requested: Some(1),
    };
    assert_eq!(step(&s, cmd).unwrap_err(), Error::TooManyEntries);

    // Existing entries stay editable at the limit.
    let s = set(&s, "C0", Some(7));
    assert_eq!(s.allocation.votes_for(&id("C0")), 7);
    assert_eq!(s.allocation.len(), crate::MAX_ALLOCATION_ENTRIES);
}

#[test]
fn loading_too_many_votes_is_rejected() {
    let s = allocating(10_000);
    let cmd = Command::LoadVotes {
        allocation: full_allocation(crate::MAX_ALLOCATION_ENTRIES + 1),
    };
    assert_eq!(step(&s, cmd).unwrap_err(), Error::TooManyEntries);
}

fn set_vote_ops() -> impl Strategy<Value = Vec<(u8, Option<i64>)>> {
    proptest::collection::vec(
        (0u8..5, proptest::option::weighted(0.9, -50i64..500)),
        0..40,
    )
}

proptest! {
    #[test]
    fn spent_never_exceeds_balance(balance in 0u64..400, ops in set_vote_ops()) {
        let mut s = State::with_balance(balance);
        s.mode = Mode::Allocating;
        for (who, v) in ops {
            let cand = CandidateId::new(format!("C{who}"));
            s = step(&s, Command::SetVote { candidate: cand, requested: v }).unwrap().0;
            prop_assert!(s.allocation.spent() <= balance);
            prop_assert!(s.status().available >= 0);
        }
    }

    #[test]
    fn negative_is_same_as_zero(balance in 1u64..400, prior in 0i64..400, v in i64::MIN..0) {
        let s = set(&allocating(balance), "A", Some(prior));
        let neg = set(&s, "B", Some(v));
        let zero = set(&s, "B", Some(0));
        prop_assert_eq!(neg, zero);
    }

    #[test]
    fn oversized_is_same_as_available(balance in 1u64..400, prior in 0i64..400, extra in 1i64..1000) {
        let s = set(&allocating(balance), "A", Some(prior));
        let cap = s.available_for(&id("B"));
        let big = set(&s, "B", Some(cap as i64 + extra));
        let exact = set(&s, "B", Some(cap as i64));
        prop_assert_eq!(big, exact);
    }
}

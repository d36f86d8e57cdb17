//! Racing mutations through [`SharedRegistry`].

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::*;
use satscircle_ledger::SharedRegistry;
use satscircle_types::{CircleError, CircleId};

fn shared_circle(limit: u32, joiners: usize) -> (SharedRegistry, CircleId) {
    let shared = SharedRegistry::new();
    let id = shared.create_circle(weekly(limit), owner(), amount()).unwrap();
    for i in 0..joiners {
        shared.join_circle(id, member(i), amount(), None).unwrap();
    }
    (shared, id)
}

#[test]
fn race_for_last_slot_has_one_winner() {
    init_tracing();
    let (shared, id) = shared_circle(5, 3);
    let contenders = 8;
    let barrier = Arc::new(Barrier::new(contenders));

    let handles: Vec<_> = (0..contenders)
        .map(|i| {
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                shared.join_circle(id, member(100 + i), amount(), None)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CircleError::CircleFull { .. })));
    assert_eq!(shared.circle_member_count(id).unwrap(), 5);
    shared.with(|reg| reg.verify_conservation(id)).unwrap();
}

#[test]
fn duplicate_contributions_race() {
    init_tracing();
    let (shared, id) = shared_circle(3, 2);
    shared.distribute_payout(id, owner()).unwrap();

    let attempts = 6;
    let barrier = Arc::new(Barrier::new(attempts));
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                shared.submit_contribution(id, member(0), amount())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CircleError::AlreadyContributedThisRound { round: 2, .. })));
    shared.with(|reg| reg.verify_conservation(id)).unwrap();
}

#[test]
fn racing_payouts_release_once() {
    init_tracing();
    let (shared, id) = shared_circle(3, 2);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || shared.distribute_payout(id, owner()))
        })
        .collect();
    let ok = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .filter(Result::is_ok)
        .count();

    assert_eq!(ok, 1);
    let status = shared.circle_status(id).unwrap();
    assert_eq!(status.circle.current_round, 2);
    assert_eq!(shared.with(|reg| reg.transfer().receipts().len()), 1);
}

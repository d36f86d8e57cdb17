//! Shared fixtures for the ledger integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use satscircle_ledger::CircleRegistry;
use satscircle_types::{Address, CircleId, CircleParams, Frequency, Visibility};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. `RUST_LOG` controls the output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 0.001 BTC.
pub fn amount() -> Decimal {
    Decimal::new(1, 3)
}

pub fn owner() -> Address {
    Address::from_label("owner")
}

pub fn member(i: usize) -> Address {
    Address::from_label(&format!("member-{i}"))
}

pub fn weekly(limit: u32) -> CircleParams {
    CircleParams::new(
        "Weekly Bitcoin Savers",
        amount(),
        Frequency::Weekly,
        limit,
        Visibility::Public,
    )
}

/// A public circle owned by [`owner`] with `joiners` extra members.
///
/// Returns the circle and every member address in join order.
pub fn circle_with_members(
    reg: &mut CircleRegistry,
    limit: u32,
    joiners: usize,
) -> (CircleId, Vec<Address>) {
    let id = reg.create_circle(weekly(limit), owner(), amount()).unwrap();
    let mut everyone = vec![owner()];
    for i in 0..joiners {
        reg.join_circle(id, member(i), amount(), None).unwrap();
        everyone.push(member(i));
    }
    (id, everyone)
}

/// Everyone active who has not paid this round pays now.
pub fn pay_round(reg: &mut CircleRegistry, id: CircleId) {
    let status = reg.circle_status(id).unwrap();
    for m in status.details.iter().filter(|m| !m.has_paid_current_round) {
        reg.submit_contribution(id, m.address, amount()).unwrap();
    }
}

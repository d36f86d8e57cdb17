//! Contribution ledger: per-round payment tracking.
//!
//! Payment state lives on each [`Member`](satscircle_types::Member)
//! record; these functions enforce the one-payment-per-round rule and
//! answer whether the current round is fully funded.

use rust_decimal::Decimal;
use satscircle_types::{Address, Circle, CircleError, Result};

use crate::access;
use crate::membership::MembershipLedger;

/// Record `who`'s payment for the circle's current round.
///
/// Returns the round the payment was credited to.
///
/// # Errors
/// - `CircleInactive` / `CircleCompleted` if the circle is not open
/// - `NotMember` if `who` has no active record
/// - `AlreadyContributedThisRound` if `who` already paid this round
/// - `ContributionMismatch` if `paid` differs from the contribution amount
/// - `AmountOverflow` if `total_saved` would overflow
pub fn record_contribution(
    circle: &mut Circle,
    members: &mut MembershipLedger,
    who: Address,
    paid: Decimal,
) -> Result<u32> {
    access::require_open(circle)?;

    let member = members
        .member_mut(circle.id, &who)
        .filter(|m| m.is_active)
        .ok_or(CircleError::NotMember {
            circle: circle.id,
            member: who,
        })?;

    if member.has_paid_current_round {
        return Err(CircleError::AlreadyContributedThisRound {
            circle: circle.id,
            round: circle.current_round,
        });
    }

    if paid != circle.contribution_amount {
        return Err(CircleError::ContributionMismatch {
            expected: circle.contribution_amount,
            paid,
        });
    }

    let saved = circle.saved_after(paid)?;
    member.record_payment(paid)?;
    circle.total_saved = saved;

    tracing::info!(
        circle = %circle.id,
        member = %who,
        round = circle.current_round,
        amount = %paid,
        streak = member.current_streak,
        "Contribution recorded"
    );
    Ok(circle.current_round)
}

/// `(paid, active)` for the current round.
#[must_use]
pub fn round_progress(circle: &Circle, members: &MembershipLedger) -> (usize, usize) {
    let active = members.active_members(circle.id);
    let paid = active.iter().filter(|m| m.has_paid_current_round).count();
    (paid, active.len())
}

/// True iff every active member has paid for the current round. No side
/// effects.
#[must_use]
pub fn round_is_complete(circle: &Circle, members: &MembershipLedger) -> bool {
    let (paid, active) = round_progress(circle, members);
    paid == active
}

//! Payout scheduler: rotation and round advance.
//!
//! Payouts follow join order. The rotation cursor (`payout_index`) points
//! at a join-order slot; the recipient is the first *active* member at or
//! after the cursor, wrapping to the lowest slot when nothing remains
//! above it. Removed members leave gaps that rotation steps over.
//!
//! A payout is split into a pure planning step ([`plan_payout`]) and a
//! commit step ([`commit_round`]) so the registry can advance the round
//! before any funds leave escrow.

use rust_decimal::Decimal;
use satscircle_types::{Address, Circle, CircleError, Member, Result};
use serde::{Deserialize, Serialize};

use crate::contribution;
use crate::membership::MembershipLedger;

/// A validated payout, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutPlan {
    /// The round being paid out.
    pub round: u32,
    pub recipient: Address,
    pub recipient_slot: u32,
    /// `contribution_amount × active members`.
    pub amount: Decimal,
    /// Cursor value after this payout.
    pub next_index: u32,
}

/// A payout that reached its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: Address,
    pub amount: Decimal,
    pub round: u32,
}

/// The member who receives the next payout, if anyone is active.
#[must_use]
pub fn select_recipient<'a>(circle: &Circle, members: &'a MembershipLedger) -> Option<&'a Member> {
    let active = members.active_members(circle.id);
    active
        .iter()
        .find(|m| m.join_order >= circle.payout_index)
        .or_else(|| active.first())
        .copied()
}

/// Validate that the current round can be paid out and work out to whom.
///
/// Does not mutate anything. Access checks (owner, open) are the caller's
/// job.
///
/// # Errors
/// - `RoundIncomplete` if an active member has not paid
/// - `Internal` if the circle has no active member
/// - `AmountOverflow` if the pot is not representable
pub fn plan_payout(circle: &Circle, members: &MembershipLedger) -> Result<PayoutPlan> {
    let (paid, active) = contribution::round_progress(circle, members);
    if paid != active {
        tracing::warn!(
            circle = %circle.id,
            round = circle.current_round,
            paid,
            active,
            "Payout rejected: round incomplete"
        );
        return Err(CircleError::RoundIncomplete {
            circle: circle.id,
            round: circle.current_round,
            paid,
            active,
        });
    }

    let recipient = select_recipient(circle, members)
        .ok_or_else(|| CircleError::Internal(format!("{} has no active members", circle.id)))?;

    // Past the last slot the cursor falls back to the lowest active slot,
    // so later joiners still sit ahead of it.
    let next_index = recipient
        .join_order
        .checked_add(1)
        .ok_or_else(|| CircleError::Internal(format!("{} cursor overflow", circle.id)))?;

    tracing::debug!(
        circle = %circle.id,
        cursor = circle.payout_index,
        recipient = %recipient.address,
        slot = recipient.join_order,
        next_index,
        "Rotation recipient selected"
    );

    Ok(PayoutPlan {
        round: circle.current_round,
        recipient: recipient.address,
        recipient_slot: recipient.join_order,
        amount: circle.pot_for(active)?,
        next_index,
    })
}

/// Advance the circle past a planned payout.
///
/// Increments the round, moves the cursor, and rolls every member into
/// the new round (clearing `has_paid_current_round`, resetting the streak
/// of anyone who had not paid).
pub fn commit_round(circle: &mut Circle, members: &mut MembershipLedger, plan: &PayoutPlan) {
    circle.current_round = plan.round + 1;
    circle.payout_index = plan.next_index;
    members.roll_round(circle.id);

    if circle.is_completed() {
        tracing::info!(
            circle = %circle.id,
            rounds = circle.member_limit,
            total_saved = %circle.total_saved,
            "Circle completed"
        );
    }
}

/// Active members in the order they will receive upcoming payouts,
/// starting from the cursor. Empty once the circle has completed.
#[must_use]
pub fn payout_schedule(circle: &Circle, members: &MembershipLedger) -> Vec<Address> {
    if circle.is_completed() {
        return Vec::new();
    }
    let active = members.active_members(circle.id);
    let (after, before): (Vec<&Member>, Vec<&Member>) = active
        .into_iter()
        .partition(|m| m.join_order >= circle.payout_index);
    let remaining = (circle.member_limit + 1 - circle.current_round) as usize;
    after
        .into_iter()
        .chain(before)
        .map(|m| m.address)
        .take(remaining)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use satscircle_types::{CircleId, CircleParams, Frequency, Visibility};

    fn amount() -> Decimal {
        Decimal::new(1, 3)
    }

    fn setup(limit: u32, extra: usize) -> (MembershipLedger, Circle, Vec<Address>) {
        let owner = Address::from_label("owner");
        let mut circle = Circle::open(
            CircleId(1),
            CircleParams::new("test", amount(), Frequency::Monthly, limit, Visibility::Public),
            owner,
        );
        let mut ledger = MembershipLedger::new();
        let mut everyone = vec![owner];
        ledger.admit(&mut circle, owner, amount(), None).unwrap();
        for i in 0..extra {
            let who = Address::from_label(&format!("m{i}"));
            ledger.admit(&mut circle, who, amount(), None).unwrap();
            everyone.push(who);
        }
        (ledger, circle, everyone)
    }

    fn pay_all(ledger: &mut MembershipLedger, circle: &mut Circle) {
        let unpaid: Vec<Address> = ledger
            .active_members(circle.id)
            .iter()
            .filter(|m| !m.has_paid_current_round)
            .map(|m| m.address)
            .collect();
        for who in unpaid {
            contribution::record_contribution(circle, ledger, who, amount()).unwrap();
        }
    }

    #[test]
    fn first_payout_goes_to_owner() {
        let (ledger, circle, everyone) = setup(3, 2);
        let plan = plan_payout(&circle, &ledger).unwrap();
        assert_eq!(plan.recipient, everyone[0]);
        assert_eq!(plan.round, 1);
        assert_eq!(plan.amount, amount() * Decimal::new(3, 0));
        assert_eq!(plan.next_index, 1);
    }

    #[test]
    fn commit_advances_and_resets() {
        let (mut ledger, mut circle, _) = setup(3, 2);
        let plan = plan_payout(&circle, &ledger).unwrap();
        commit_round(&mut circle, &mut ledger, &plan);

        assert_eq!(circle.current_round, 2);
        assert_eq!(circle.payout_index, 1);
        assert!(ledger
            .active_members(circle.id)
            .iter()
            .all(|m| !m.has_paid_current_round));
        assert!(!contribution::round_is_complete(&circle, &ledger));
    }

    #[test]
    fn incomplete_round_rejected() {
        let (mut ledger, mut circle, _) = setup(3, 2);
        let plan = plan_payout(&circle, &ledger).unwrap();
        commit_round(&mut circle, &mut ledger, &plan);

        let err = plan_payout(&circle, &ledger).unwrap_err();
        assert!(matches!(
            err,
            CircleError::RoundIncomplete { paid: 0, active: 3, .. }
        ));
    }

    #[test]
    fn rotation_follows_join_order() {
        let (mut ledger, mut circle, everyone) = setup(3, 2);
        let mut recipients = Vec::new();
        for _ in 0..3 {
            pay_all(&mut ledger, &mut circle);
            let plan = plan_payout(&circle, &ledger).unwrap();
            recipients.push(plan.recipient);
            commit_round(&mut circle, &mut ledger, &plan);
        }
        assert_eq!(recipients, everyone);
        assert!(circle.is_completed());
    }

    #[test]
    fn rotation_skips_removed_slot() {
        let (mut ledger, mut circle, everyone) = setup(4, 3);
        ledger.remove(&circle, everyone[1]).unwrap();

        let plan = plan_payout(&circle, &ledger).unwrap();
        assert_eq!(plan.recipient, everyone[0]);
        commit_round(&mut circle, &mut ledger, &plan);

        pay_all(&mut ledger, &mut circle);
        let plan = plan_payout(&circle, &ledger).unwrap();
        assert_eq!(plan.recipient, everyone[2], "slot 1 was removed");
        assert_eq!(plan.recipient_slot, 2);
        assert_eq!(plan.amount, amount() * Decimal::new(3, 0));
    }

    #[test]
    fn cursor_wraps_past_last_slot() {
        let (mut ledger, mut circle, everyone) = setup(5, 1);
        for _ in 0..2 {
            pay_all(&mut ledger, &mut circle);
            let plan = plan_payout(&circle, &ledger).unwrap();
            commit_round(&mut circle, &mut ledger, &plan);
        }
        assert_eq!(circle.payout_index, 2, "cursor sits past the last slot");
        pay_all(&mut ledger, &mut circle);
        let plan = plan_payout(&circle, &ledger).unwrap();
        assert_eq!(plan.recipient, everyone[0]);
        assert_eq!(plan.next_index, 1);
    }

    #[test]
    fn late_joiner_after_last_slot_is_paid_next() {
        let (mut ledger, mut circle, everyone) = setup(4, 2);
        for _ in 0..3 {
            pay_all(&mut ledger, &mut circle);
            let plan = plan_payout(&circle, &ledger).unwrap();
            commit_round(&mut circle, &mut ledger, &plan);
        }
        assert_eq!(circle.payout_index, 3);

        let late = Address::from_label("late");
        ledger.admit(&mut circle, late, amount(), None).unwrap();
        pay_all(&mut ledger, &mut circle);
        let plan = plan_payout(&circle, &ledger).unwrap();
        assert_eq!(plan.recipient, late);
        assert_eq!(plan.recipient_slot, 3);
        assert!(!everyone.contains(&plan.recipient));
    }

    #[test]
    fn schedule_starts_at_cursor() {
        let (mut ledger, mut circle, everyone) = setup(3, 2);
        assert_eq!(payout_schedule(&circle, &ledger), everyone);

        let plan = plan_payout(&circle, &ledger).unwrap();
        commit_round(&mut circle, &mut ledger, &plan);
        assert_eq!(
            payout_schedule(&circle, &ledger),
            vec![everyone[1], everyone[2]]
        );
    }
}

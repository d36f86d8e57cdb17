//! Member records, keyed by `(CircleId, Address)`.
//!
//! A member slot is created on join and never deleted. Removal only clears
//! `is_active`; the `join_order` slot is kept so rotation order stays
//! stable, and is skipped by future payouts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, CircleError, CircleId, Result};

/// One member's standing in one circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub address: Address,
    /// Every payment made, admission included.
    pub total_contributed: Decimal,
    /// Consecutive rounds paid without a miss.
    pub current_streak: u32,
    /// Reset to `false` whenever the round advances.
    pub has_paid_current_round: bool,
    /// `false` once removed, permanently.
    pub is_active: bool,
    /// Rotation position. Unique within a circle; the owner holds 0.
    pub join_order: u32,
}

impl Member {
    /// A newly admitted member. The admission payment counts as this
    /// round's contribution.
    #[must_use]
    pub fn admitted(address: Address, join_order: u32, paid: Decimal) -> Self {
        Self {
            address,
            total_contributed: paid,
            current_streak: 1,
            has_paid_current_round: true,
            is_active: true,
            join_order,
        }
    }

    /// Record a round contribution. On overflow the record is left as it
    /// was.
    ///
    /// # Errors
    /// Returns [`CircleError::AmountOverflow`] if `total_contributed`
    /// would overflow.
    pub fn record_payment(&mut self, paid: Decimal) -> Result<()> {
        let total = self
            .total_contributed
            .checked_add(paid)
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{} total_contributed", self.address),
            })?;
        self.total_contributed = total;
        self.has_paid_current_round = true;
        self.current_streak = self.current_streak.saturating_add(1);
        Ok(())
    }

    /// Round advance: a member who did not pay loses their streak, and
    /// everyone owes the next round.
    pub fn roll_round(&mut self) {
        if !self.has_paid_current_round {
            self.current_streak = 0;
        }
        self.has_paid_current_round = false;
    }
}

/// Permission for one address to join one private circle.
///
/// Grants are resolved outside the ledger (invite codes, out-of-band
/// approval) and presented alongside the join call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteGrant {
    pub circle_id: CircleId,
    pub invitee: Address,
}

impl InviteGrant {
    #[must_use]
    pub fn new(circle_id: CircleId, invitee: Address) -> Self {
        Self { circle_id, invitee }
    }

    /// Does this grant admit `who` into `circle`?
    #[must_use]
    pub fn admits(&self, circle: CircleId, who: &Address) -> bool {
        self.circle_id == circle && self.invitee == *who
    }
}

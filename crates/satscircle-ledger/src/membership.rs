//! Membership ledger: admission rules and the per-circle member table.
//!
//! Members are keyed by `(CircleId, Address)` and indexed per circle in
//! join order. Slots are never compacted: a removed member keeps their
//! `join_order`, which rotation skips, and new members always take the
//! next unused slot.

use std::collections::HashMap;

use rust_decimal::Decimal;
use satscircle_types::{
    Address, Circle, CircleError, CircleId, InviteGrant, Member, Result, Visibility,
};

use crate::access;

/// Owns every member record plus the join-order and per-address indexes.
#[derive(Debug, Default)]
pub struct MembershipLedger {
    members: HashMap<(CircleId, Address), Member>,
    /// Per-circle slots: position `i` holds the member with `join_order == i`.
    slots: HashMap<CircleId, Vec<Address>>,
    /// Circles each address has ever joined, in join order.
    by_address: HashMap<Address, Vec<CircleId>>,
}

impl MembershipLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `who` into `circle`, taking `paid` as both the admission
    /// payment and this round's contribution.
    ///
    /// Checks run in order and the first failure aborts with nothing
    /// changed. On success the member takes the next join-order slot and
    /// `circle.total_saved` grows by `paid`.
    ///
    /// # Errors
    /// - `CircleInactive` / `CircleCompleted` if the circle is not open
    /// - `CircleFull` if active members already equal the limit
    /// - `AlreadyMember` if `who` holds an active record
    /// - `MemberPreviouslyRemoved` if `who` was removed earlier
    /// - `PrivateCircleAccessDenied` if private and no matching grant
    /// - `ContributionMismatch` if `paid` differs from the contribution amount
    /// - `AmountOverflow` if `total_saved` would overflow
    pub fn admit(
        &mut self,
        circle: &mut Circle,
        who: Address,
        paid: Decimal,
        grant: Option<&InviteGrant>,
    ) -> Result<u32> {
        access::require_open(circle)?;

        let active = self.active_count(circle.id);
        if active >= circle.member_limit as usize {
            return Err(CircleError::CircleFull {
                circle: circle.id,
                limit: circle.member_limit,
            });
        }

        if let Some(existing) = self.members.get(&(circle.id, who)) {
            return Err(if existing.is_active {
                CircleError::AlreadyMember {
                    circle: circle.id,
                    member: who,
                }
            } else {
                CircleError::MemberPreviouslyRemoved {
                    circle: circle.id,
                    member: who,
                }
            });
        }

        if circle.visibility == Visibility::Private
            && !circle.is_owner(&who)
            && !grant.is_some_and(|g| g.admits(circle.id, &who))
        {
            return Err(CircleError::PrivateCircleAccessDenied {
                circle: circle.id,
                member: who,
            });
        }

        if paid != circle.contribution_amount {
            return Err(CircleError::ContributionMismatch {
                expected: circle.contribution_amount,
                paid,
            });
        }

        let saved = circle.saved_after(paid)?;
        let slots = self.slots.entry(circle.id).or_default();
        let join_order = u32::try_from(slots.len())
            .map_err(|_| CircleError::Internal(format!("{} slot count overflow", circle.id)))?;
        slots.push(who);
        self.members
            .insert((circle.id, who), Member::admitted(who, join_order, paid));
        self.by_address.entry(who).or_default().push(circle.id);
        circle.total_saved = saved;

        tracing::info!(
            circle = %circle.id,
            member = %who,
            join_order,
            active = active + 1,
            limit = circle.member_limit,
            "Member admitted"
        );
        Ok(join_order)
    }

    /// Deactivate `target`. The slot and history are kept; any payment
    /// already made this round stays in the pool.
    ///
    /// Ownership of the *caller* is checked by the registry, not here.
    ///
    /// # Errors
    /// - `CannotRemoveOwner` if `target` owns the circle
    /// - `NotMember` if `target` has no active record
    pub fn remove(&mut self, circle: &Circle, target: Address) -> Result<()> {
        if circle.is_owner(&target) {
            return Err(CircleError::CannotRemoveOwner(circle.id));
        }
        let member = self
            .members
            .get_mut(&(circle.id, target))
            .filter(|m| m.is_active)
            .ok_or(CircleError::NotMember {
                circle: circle.id,
                member: target,
            })?;
        member.is_active = false;

        tracing::info!(
            circle = %circle.id,
            member = %target,
            join_order = member.join_order,
            "Member removed"
        );
        Ok(())
    }

    /// Look up a member record, active or not.
    #[must_use]
    pub fn member(&self, circle: CircleId, who: &Address) -> Option<&Member> {
        self.members.get(&(circle, *who))
    }

    pub(crate) fn member_mut(&mut self, circle: CircleId, who: &Address) -> Option<&mut Member> {
        self.members.get_mut(&(circle, *who))
    }

    /// Does `who` hold an active record?
    #[must_use]
    pub fn is_member(&self, circle: CircleId, who: &Address) -> bool {
        self.member(circle, who).is_some_and(|m| m.is_active)
    }

    /// Every member ever admitted, in join order.
    #[must_use]
    pub fn all_members(&self, circle: CircleId) -> Vec<&Member> {
        self.slots
            .get(&circle)
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|who| self.members.get(&(circle, *who)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Active members in join order.
    #[must_use]
    pub fn active_members(&self, circle: CircleId) -> Vec<&Member> {
        self.all_members(circle)
            .into_iter()
            .filter(|m| m.is_active)
            .collect()
    }

    #[must_use]
    pub fn active_count(&self, circle: CircleId) -> usize {
        self.active_members(circle).len()
    }

    /// Join-order slots ever assigned, removed members included.
    #[must_use]
    pub fn slot_count(&self, circle: CircleId) -> usize {
        self.slots.get(&circle).map_or(0, Vec::len)
    }

    /// Circles `who` has ever joined.
    #[must_use]
    pub fn circles_of(&self, who: &Address) -> &[CircleId] {
        self.by_address.get(who).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of `total_contributed` over every member ever admitted.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the sum is not representable.
    pub fn total_contributed(&self, circle: CircleId) -> Result<Decimal> {
        self.all_members(circle)
            .iter()
            .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.total_contributed))
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{circle} member contributions"),
            })
    }

    /// Advance every member of `circle` to the next round.
    pub(crate) fn roll_round(&mut self, circle: CircleId) {
        let Some(slots) = self.slots.get(&circle) else {
            return;
        };
        for who in slots {
            if let Some(member) = self.members.get_mut(&(circle, *who)) {
                member.roll_round();
            }
        }
    }

    /// Copy every member record of a circle, for rollback.
    pub(crate) fn snapshot(&self, circle: CircleId) -> Vec<Member> {
        self.all_members(circle).into_iter().cloned().collect()
    }

    /// Put back records taken by [`Self::snapshot`].
    pub(crate) fn restore(&mut self, circle: CircleId, snapshot: Vec<Member>) {
        for member in snapshot {
            self.members.insert((circle, member.address), member);
        }
    }
}

//! Read-only projections over the registry.
//!
//! Nothing here mutates; every answer reflects the latest committed state.

use rust_decimal::Decimal;
use satscircle_escrow::PayoutTransfer;
use satscircle_types::{Address, Circle, CircleId, CircleState, Member, Result};
use serde::{Deserialize, Serialize};

use crate::access;
use crate::payout;
use crate::registry::CircleRegistry;

/// Full view of one circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleStatus {
    pub circle: Circle,
    /// Active members in join order.
    pub members: Vec<Address>,
    /// Records of the active members, same order as `members`.
    pub details: Vec<Member>,
    pub state: CircleState,
    /// Funds currently held in escrow for this circle.
    pub escrow_held: Decimal,
}

/// Per-address dashboard totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    /// Sum of `total_contributed` across every circle joined.
    pub total_saved: Decimal,
    pub open_circles: usize,
    /// Completed or deactivated.
    pub ended_circles: usize,
    /// Sum of current streaks across every circle joined.
    pub total_streak: u32,
}

impl<T: PayoutTransfer> CircleRegistry<T> {
    /// # Errors
    /// `CircleNotFound` if the circle does not exist.
    pub fn circle_status(&self, circle: CircleId) -> Result<CircleStatus> {
        let record = access::require_circle(&self.circles, circle)?;
        let details: Vec<Member> = self
            .members
            .active_members(circle)
            .into_iter()
            .cloned()
            .collect();
        Ok(CircleStatus {
            circle: record.clone(),
            members: details.iter().map(|m| m.address).collect(),
            details,
            state: record.state(),
            escrow_held: self.vault.held(circle),
        })
    }

    /// Active members of `circle`.
    ///
    /// # Errors
    /// `CircleNotFound` if the circle does not exist.
    pub fn circle_member_count(&self, circle: CircleId) -> Result<usize> {
        access::require_circle(&self.circles, circle)?;
        Ok(self.members.active_count(circle))
    }

    /// False for unknown circles and removed members.
    #[must_use]
    pub fn is_circle_member(&self, circle: CircleId, who: &Address) -> bool {
        self.members.is_member(circle, who)
    }

    #[must_use]
    pub fn circle(&self, circle: CircleId) -> Option<&Circle> {
        self.circles.get(&circle)
    }

    /// A member record, removed members included.
    #[must_use]
    pub fn member(&self, circle: CircleId, who: &Address) -> Option<&Member> {
        self.members.member(circle, who)
    }

    /// Active member addresses in join order.
    ///
    /// # Errors
    /// `CircleNotFound` if the circle does not exist.
    pub fn members(&self, circle: CircleId) -> Result<Vec<Address>> {
        access::require_circle(&self.circles, circle)?;
        Ok(self
            .members
            .active_members(circle)
            .iter()
            .map(|m| m.address)
            .collect())
    }

    /// Circles `who` has ever joined, in join order.
    #[must_use]
    pub fn circles_of(&self, who: &Address) -> &[CircleId] {
        self.members.circles_of(who)
    }

    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.circles.len()
    }

    /// Upcoming payout recipients, next first.
    ///
    /// # Errors
    /// `CircleNotFound` if the circle does not exist.
    pub fn payout_schedule(&self, circle: CircleId) -> Result<Vec<Address>> {
        let record = access::require_circle(&self.circles, circle)?;
        Ok(payout::payout_schedule(record, &self.members))
    }

    #[must_use]
    pub fn member_stats(&self, who: &Address) -> MemberStats {
        let mut stats = MemberStats::default();
        for id in self.members.circles_of(who) {
            let (Some(circle), Some(member)) =
                (self.circles.get(id), self.members.member(*id, who))
            else {
                continue;
            };
            stats.total_saved = stats.total_saved.saturating_add(member.total_contributed);
            stats.total_streak = stats.total_streak.saturating_add(member.current_streak);
            match circle.state() {
                CircleState::Open => stats.open_circles += 1,
                CircleState::Completed | CircleState::Deactivated => stats.ended_circles += 1,
            }
        }
        stats
    }
}

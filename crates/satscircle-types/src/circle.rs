//! Circle records: the group running one rotating-payout savings cycle.
//!
//! ## Lifecycle
//!
//! ```text
//!   ┌──────┐  distribute (round > limit)  ┌───────────┐
//!   │ OPEN ├─────────────────────────────▶│ COMPLETED │
//!   └──┬───┘                              └───────────┘
//!      │ owner deactivates
//!      ▼
//!   ┌─────────────┐
//!   │ DEACTIVATED │
//!   └─────────────┘
//! ```
//!
//! Both terminal states are permanent. Circles are never deleted.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, CircleError, CircleId, Result, constants};

/// Informational contribution cadence. The ledger does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Weekly,
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "WEEKLY"),
            Self::Monthly => write!(f, "MONTHLY"),
        }
    }
}

/// Whether anyone may join, or only holders of an invite grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "PUBLIC"),
            Self::Private => write!(f, "PRIVATE"),
        }
    }
}

/// Derived lifecycle state of a circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircleState {
    /// Accepting joins and contributions; payouts pending.
    Open,
    /// Every round has been paid out (`current_round > member_limit`).
    Completed,
    /// The owner cleared `is_active`.
    Deactivated,
}

impl fmt::Display for CircleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Deactivated => write!(f, "DEACTIVATED"),
        }
    }
}

/// Caller-supplied parameters for creating a circle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleParams {
    pub name: String,
    pub contribution_amount: Decimal,
    pub frequency: Frequency,
    pub member_limit: u32,
    pub visibility: Visibility,
}

impl CircleParams {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        contribution_amount: Decimal,
        frequency: Frequency,
        member_limit: u32,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            contribution_amount,
            frequency,
            member_limit,
            visibility,
        }
    }
}

/// A savings circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    /// Sequential, immutable identity.
    pub id: CircleId,
    pub name: String,
    /// The creator. Permanent, always `join_order` 0.
    pub owner: Address,
    /// Fixed for the circle's lifetime; strictly positive.
    pub contribution_amount: Decimal,
    pub frequency: Frequency,
    /// Fixed, at least 2. Also the number of rounds the circle runs.
    pub member_limit: u32,
    /// Starts at 1; the circle completes once this exceeds `member_limit`.
    pub current_round: u32,
    /// Rotation cursor over join-order slots.
    pub payout_index: u32,
    pub visibility: Visibility,
    /// Sum of all contributions ever received. Never decreases.
    pub total_saved: Decimal,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Circle {
    /// A fresh circle in round 1 with an empty pool.
    #[must_use]
    pub fn open(id: CircleId, params: CircleParams, owner: Address) -> Self {
        Self {
            id,
            name: params.name,
            owner,
            contribution_amount: params.contribution_amount,
            frequency: params.frequency,
            member_limit: params.member_limit,
            current_round: constants::FIRST_ROUND,
            payout_index: 0,
            visibility: params.visibility,
            total_saved: Decimal::ZERO,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    /// Returns `true` once every round has been paid out.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.current_round > self.member_limit
    }

    #[must_use]
    pub fn state(&self) -> CircleState {
        if self.is_completed() {
            CircleState::Completed
        } else if self.is_active {
            CircleState::Open
        } else {
            CircleState::Deactivated
        }
    }

    #[must_use]
    pub fn is_owner(&self, who: &Address) -> bool {
        self.owner == *who
    }

    /// Full pot for a round with `active_members` participants.
    ///
    /// # Errors
    /// Returns [`CircleError::AmountOverflow`] if the pot is not
    /// representable.
    pub fn pot_for(&self, active_members: usize) -> Result<Decimal> {
        self.contribution_amount
            .checked_mul(Decimal::from(active_members))
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{} pot for {active_members} members", self.id),
            })
    }

    /// `total_saved` after crediting `paid`. Nothing is mutated.
    ///
    /// # Errors
    /// Returns [`CircleError::AmountOverflow`] if the total would overflow.
    pub fn saved_after(&self, paid: Decimal) -> Result<Decimal> {
        self.total_saved
            .checked_add(paid)
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{} total_saved", self.id),
            })
    }
}

//! Observable events for external subscribers (chat relay, push
//! notifications, indexers).
//!
//! Every committed mutation appends exactly one [`EventRecord`]. Failed
//! operations emit nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, CircleId, EventId};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CircleEvent {
    CircleCreated {
        circle_id: CircleId,
        name: String,
        owner: Address,
        contribution_amount: Decimal,
    },
    MemberJoined {
        circle_id: CircleId,
        member: Address,
    },
    ContributionMade {
        circle_id: CircleId,
        member: Address,
        amount: Decimal,
        round: u32,
    },
    PayoutSent {
        circle_id: CircleId,
        recipient: Address,
        amount: Decimal,
        round: u32,
    },
    MemberRemoved {
        circle_id: CircleId,
        member: Address,
    },
    CircleDeactivated {
        circle_id: CircleId,
    },
}

impl CircleEvent {
    /// The circle this event concerns.
    #[must_use]
    pub fn circle_id(&self) -> CircleId {
        match self {
            Self::CircleCreated { circle_id, .. }
            | Self::MemberJoined { circle_id, .. }
            | Self::ContributionMade { circle_id, .. }
            | Self::PayoutSent { circle_id, .. }
            | Self::MemberRemoved { circle_id, .. }
            | Self::CircleDeactivated { circle_id } => *circle_id,
        }
    }

    /// Short event name, as emitted on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CircleCreated { .. } => "CircleCreated",
            Self::MemberJoined { .. } => "MemberJoined",
            Self::ContributionMade { .. } => "ContributionMade",
            Self::PayoutSent { .. } => "PayoutSent",
            Self::MemberRemoved { .. } => "MemberRemoved",
            Self::CircleDeactivated { .. } => "CircleDeactivated",
        }
    }
}

/// An event stamped with its position in the ledger's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// Gapless, starting at 0.
    pub sequence: u64,
    pub event: CircleEvent,
    pub emitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_id_accessor() {
        let ev = CircleEvent::PayoutSent {
            circle_id: CircleId(4),
            recipient: Address::from_label("r"),
            amount: Decimal::new(3, 3),
            round: 1,
        };
        assert_eq!(ev.circle_id(), CircleId(4));
        assert_eq!(ev.name(), "PayoutSent");
    }

    #[test]
    fn serde_is_tagged() {
        let ev = CircleEvent::MemberJoined {
            circle_id: CircleId(1),
            member: Address::from_label("m"),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "MemberJoined");
        let back: CircleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(ev, back);
    }
}

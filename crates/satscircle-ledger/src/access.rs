//! Access control, the gate in front of every mutating entry point.
//!
//! Holds no state of its own. Administrative operations (`distribute`,
//! `remove_member`, `deactivate`) require the caller to be the circle
//! owner; member operations (`join`, `contribute`) require the circle to
//! exist and still be open.
//!
//! ## Design Principles
//!
//! - **Fail-closed**: a failed check aborts before any state is touched
//! - **No bypass**: every registry entry point goes through these checks

use std::collections::BTreeMap;

use satscircle_types::{Address, Circle, CircleError, CircleId, CircleState, Result};

/// Look up a circle or fail `CircleNotFound`.
pub fn require_circle(circles: &BTreeMap<CircleId, Circle>, id: CircleId) -> Result<&Circle> {
    circles.get(&id).ok_or(CircleError::CircleNotFound(id))
}

/// Mutable lookup, same failure.
pub fn require_circle_mut(
    circles: &mut BTreeMap<CircleId, Circle>,
    id: CircleId,
) -> Result<&mut Circle> {
    circles.get_mut(&id).ok_or(CircleError::CircleNotFound(id))
}

/// Only the owner passes.
pub fn require_owner(circle: &Circle, caller: &Address) -> Result<()> {
    if circle.is_owner(caller) {
        Ok(())
    } else {
        Err(CircleError::NotOwner {
            circle: circle.id,
            caller: *caller,
        })
    }
}

/// The circle must still accept joins, contributions and payouts.
pub fn require_open(circle: &Circle) -> Result<()> {
    match circle.state() {
        CircleState::Open => Ok(()),
        CircleState::Completed => Err(CircleError::CircleCompleted {
            circle: circle.id,
            rounds: circle.member_limit,
        }),
        CircleState::Deactivated => Err(CircleError::CircleInactive(circle.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use satscircle_types::{CircleParams, Frequency, Visibility};

    fn circle() -> Circle {
        Circle::open(
            CircleId(1),
            CircleParams::new("c", Decimal::ONE, Frequency::Weekly, 3, Visibility::Public),
            Address::from_label("owner"),
        )
    }

    #[test]
    fn owner_passes() {
        let c = circle();
        assert!(require_owner(&c, &Address::from_label("owner")).is_ok());
    }

    #[test]
    fn stranger_blocked() {
        let c = circle();
        let err = require_owner(&c, &Address::from_label("eve")).unwrap_err();
        assert!(matches!(err, CircleError::NotOwner { .. }));
    }

    #[test]
    fn open_state_gate() {
        let mut c = circle();
        assert!(require_open(&c).is_ok());

        c.is_active = false;
        assert!(matches!(
            require_open(&c).unwrap_err(),
            CircleError::CircleInactive(_)
        ));

        c.is_active = true;
        c.current_round = 4;
        assert!(matches!(
            require_open(&c).unwrap_err(),
            CircleError::CircleCompleted { rounds: 3, .. }
        ));
    }

    #[test]
    fn missing_circle() {
        let circles = BTreeMap::new();
        let err = require_circle(&circles, CircleId(999)).unwrap_err();
        assert!(matches!(err, CircleError::CircleNotFound(CircleId(999))));
    }
}

//! Escrow conservation invariant checker.
//!
//! Invariant enforced per circle:
//! ```text
//! Σ(member.total_contributed) − Σ(payouts sent) == held in escrow ≥ 0
//! ```
//!
//! If this ever breaks, funds were created or destroyed somewhere between
//! the ledger and the vault, and the operation must not proceed.

use std::collections::HashMap;

use rust_decimal::Decimal;
use satscircle_types::{CircleError, CircleId, Result};

/// Tracks per-circle inflow and outflow since creation.
pub struct EscrowConservation {
    /// Total contributions received per circle.
    received: HashMap<CircleId, Decimal>,
    /// Total payouts released per circle.
    paid_out: HashMap<CircleId, Decimal>,
}

impl EscrowConservation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            received: HashMap::new(),
            paid_out: HashMap::new(),
        }
    }

    /// # Errors
    /// Returns [`CircleError::AmountOverflow`], recording nothing, if the
    /// inflow total would overflow.
    pub fn record_contribution(&mut self, circle: CircleId, amount: Decimal) -> Result<()> {
        let total = checked_total(&self.received, circle, amount, "received")?;
        self.received.insert(circle, total);
        Ok(())
    }

    /// # Errors
    /// Returns [`CircleError::AmountOverflow`], recording nothing, if the
    /// outflow total would overflow.
    pub fn record_payout(&mut self, circle: CircleId, amount: Decimal) -> Result<()> {
        let total = checked_total(&self.paid_out, circle, amount, "paid out")?;
        self.paid_out.insert(circle, total);
        Ok(())
    }

    /// Undo a payout whose transfer never completed.
    pub fn reverse_payout(&mut self, circle: CircleId, amount: Decimal) {
        if let Some(total) = self.paid_out.get_mut(&circle) {
            *total -= amount;
        }
    }

    #[must_use]
    pub fn total_received(&self, circle: CircleId) -> Decimal {
        self.received.get(&circle).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_paid_out(&self, circle: CircleId) -> Decimal {
        self.paid_out.get(&circle).copied().unwrap_or(Decimal::ZERO)
    }

    /// What the pool should hold: received − paid out.
    #[must_use]
    pub fn expected_held(&self, circle: CircleId) -> Decimal {
        self.total_received(circle) - self.total_paid_out(circle)
    }

    /// Verify the ledger's view of contributions and the vault's actual
    /// holding against the recorded flows.
    ///
    /// # Errors
    /// Returns [`CircleError::EscrowInvariantViolation`] if the ledger total
    /// disagrees with recorded inflow, if the holding disagrees with
    /// inflow minus outflow, or if the holding is negative.
    pub fn verify(&self, circle: CircleId, ledger_contributed: Decimal, held: Decimal) -> Result<()> {
        let received = self.total_received(circle);
        let paid_out = self.total_paid_out(circle);
        if ledger_contributed != received {
            return Err(CircleError::EscrowInvariantViolation {
                reason: format!(
                    "{circle}: members contributed {ledger_contributed} but escrow received {received}"
                ),
            });
        }
        let expected = received - paid_out;
        if held != expected || held < Decimal::ZERO {
            return Err(CircleError::EscrowInvariantViolation {
                reason: format!(
                    "{circle}: held {held} != expected {expected} \
                     (received={received}, paid_out={paid_out})"
                ),
            });
        }
        Ok(())
    }
}

fn checked_total(
    totals: &HashMap<CircleId, Decimal>,
    circle: CircleId,
    amount: Decimal,
    what: &str,
) -> Result<Decimal> {
    totals
        .get(&circle)
        .copied()
        .unwrap_or(Decimal::ZERO)
        .checked_add(amount)
        .ok_or_else(|| CircleError::AmountOverflow {
            context: format!("{circle} escrow {what}"),
        })
}

impl Default for EscrowConservation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_circle_is_balanced() {
        let ec = EscrowConservation::new();
        assert_eq!(ec.expected_held(CircleId(1)), Decimal::ZERO);
        assert!(ec.verify(CircleId(1), Decimal::ZERO, Decimal::ZERO).is_ok());
    }

    #[test]
    fn payouts_reduce_expected() {
        let mut ec = EscrowConservation::new();
        let c = CircleId(1);
        ec.record_contribution(c, Decimal::new(3, 0)).unwrap();
        ec.record_payout(c, Decimal::new(2, 0)).unwrap();
        assert_eq!(ec.expected_held(c), Decimal::ONE);
        assert!(ec.verify(c, Decimal::new(3, 0), Decimal::ONE).is_ok());
    }

    #[test]
    fn holding_mismatch_detected() {
        let mut ec = EscrowConservation::new();
        let c = CircleId(1);
        ec.record_contribution(c, Decimal::new(3, 0)).unwrap();
        let err = ec.verify(c, Decimal::new(3, 0), Decimal::new(4, 0)).unwrap_err();
        assert!(matches!(err, CircleError::EscrowInvariantViolation { .. }));
    }

    #[test]
    fn ledger_mismatch_detected() {
        let mut ec = EscrowConservation::new();
        let c = CircleId(1);
        ec.record_contribution(c, Decimal::new(3, 0)).unwrap();
        let err = ec.verify(c, Decimal::new(2, 0), Decimal::new(3, 0)).unwrap_err();
        assert!(matches!(err, CircleError::EscrowInvariantViolation { .. }));
    }

    #[test]
    fn reversed_payout_restores_expected() {
        let mut ec = EscrowConservation::new();
        let c = CircleId(2);
        ec.record_contribution(c, Decimal::new(5, 0)).unwrap();
        ec.record_payout(c, Decimal::new(5, 0)).unwrap();
        ec.reverse_payout(c, Decimal::new(5, 0));
        assert_eq!(ec.expected_held(c), Decimal::new(5, 0));
    }

    #[test]
    fn circles_are_independent() {
        let mut ec = EscrowConservation::new();
        ec.record_contribution(CircleId(1), Decimal::new(5, 0)).unwrap();
        ec.record_contribution(CircleId(2), Decimal::new(7, 0)).unwrap();
        assert_eq!(ec.expected_held(CircleId(1)), Decimal::new(5, 0));
        assert_eq!(ec.expected_held(CircleId(2)), Decimal::new(7, 0));
    }

    #[test]
    fn overflowing_inflow_is_not_recorded() {
        let mut ec = EscrowConservation::new();
        let c = CircleId(3);
        ec.record_contribution(c, Decimal::MAX).unwrap();
        let err = ec.record_contribution(c, Decimal::ONE).unwrap_err();
        assert!(matches!(err, CircleError::AmountOverflow { .. }));
        assert_eq!(ec.total_received(c), Decimal::MAX);
    }
}

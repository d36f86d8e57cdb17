//! Escrow vault: custody of each circle's pooled contributions.
//!
//! Funds enter through [`EscrowVault::deposit`] when a join or contribution
//! commits, and leave only through [`EscrowVault::release`] when a round is
//! paid out. The pool belongs to the circle, never to a member.

use std::collections::HashMap;

use rust_decimal::Decimal;
use satscircle_types::{CircleError, CircleId, Result};

use crate::conservation::EscrowConservation;
use crate::payout_guard::PayoutGuard;

/// Per-circle escrow pools plus the bookkeeping that keeps them honest.
///
/// Every mutation is all-or-nothing: a failed release leaves the pool,
/// the guard and the conservation record untouched.
pub struct EscrowVault {
    pools: HashMap<CircleId, Decimal>,
    guard: PayoutGuard,
    conservation: EscrowConservation,
}

impl EscrowVault {
    #[must_use]
    pub fn new(payout_guard_capacity: usize) -> Self {
        Self {
            pools: HashMap::new(),
            guard: PayoutGuard::new(payout_guard_capacity),
            conservation: EscrowConservation::new(),
        }
    }

    /// Check that `amount` can be taken into custody without overflowing
    /// the pool or the inflow record. Nothing is mutated.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if either total would overflow.
    pub fn check_deposit(&self, circle: CircleId, amount: Decimal) -> Result<()> {
        self.pool_after(circle, amount)?;
        self.conservation
            .total_received(circle)
            .checked_add(amount)
            .map(|_| ())
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{circle} escrow received"),
            })
    }

    /// Take custody of a member's payment.
    ///
    /// # Errors
    /// Returns `AmountOverflow`, with nothing recorded, if the pool or the
    /// inflow total would overflow.
    pub fn deposit(&mut self, circle: CircleId, amount: Decimal) -> Result<()> {
        let pool = self.pool_after(circle, amount)?;
        self.conservation.record_contribution(circle, amount)?;
        self.pools.insert(circle, pool);
        Ok(())
    }

    /// Release a round's pot out of the pool.
    ///
    /// 1. Reject a second release of the same round
    /// 2. Check the pool covers the pot
    /// 3. Debit the pool and record the payout
    ///
    /// # Errors
    /// - `RoundAlreadyPaid` if this round was already released
    /// - `EscrowInvariantViolation` if the pool is short
    /// - `AmountOverflow` if the outflow total would overflow
    pub fn release(&mut self, circle: CircleId, round: u32, amount: Decimal) -> Result<()> {
        if self.guard.is_paid(circle, round) {
            return Err(CircleError::RoundAlreadyPaid { circle, round });
        }
        let held = self.held(circle);
        if held < amount {
            return Err(CircleError::EscrowInvariantViolation {
                reason: format!("{circle}: pool holds {held}, payout needs {amount}"),
            });
        }

        self.guard.mark_paid(circle, round)?;
        if let Err(err) = self.conservation.record_payout(circle, amount) {
            self.guard.forget(circle, round);
            return Err(err);
        }
        self.pools.insert(circle, held - amount);
        Ok(())
    }

    /// Put a released pot back after its transfer failed.
    ///
    /// # Errors
    /// Returns `AmountOverflow`, with nothing changed, if the restored pool
    /// would overflow.
    pub fn rollback_release(&mut self, circle: CircleId, round: u32, amount: Decimal) -> Result<()> {
        let pool = self.pool_after(circle, amount)?;
        self.guard.forget(circle, round);
        self.conservation.reverse_payout(circle, amount);
        self.pools.insert(circle, pool);
        Ok(())
    }

    fn pool_after(&self, circle: CircleId, amount: Decimal) -> Result<Decimal> {
        self.held(circle)
            .checked_add(amount)
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{circle} escrow pool"),
            })
    }

    /// Funds currently held for a circle.
    #[must_use]
    pub fn held(&self, circle: CircleId) -> Decimal {
        self.pools.get(&circle).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total paid out of a circle so far.
    #[must_use]
    pub fn paid_out(&self, circle: CircleId) -> Decimal {
        self.conservation.total_paid_out(circle)
    }

    /// Funds held across every circle, or `None` if the sum is not
    /// representable.
    #[must_use]
    pub fn total_held(&self) -> Option<Decimal> {
        self.pools
            .values()
            .try_fold(Decimal::ZERO, |acc, held| acc.checked_add(*held))
    }

    #[must_use]
    pub fn is_round_paid(&self, circle: CircleId, round: u32) -> bool {
        self.guard.is_paid(circle, round)
    }

    /// Check the pool against the ledger's contribution total.
    ///
    /// # Errors
    /// Returns `EscrowInvariantViolation` on any mismatch.
    pub fn verify(&self, circle: CircleId, ledger_contributed: Decimal) -> Result<()> {
        self.conservation
            .verify(circle, ledger_contributed, self.held(circle))
    }
}

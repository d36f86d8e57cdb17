//! Payout idempotency guard. Prevents paying the same round twice.
//!
//! Each `(circle, round)` can be released exactly once. Attempting a second
//! release returns [`CircleError::RoundAlreadyPaid`]. The guard is bounded
//! with oldest-first eviction so memory stays predictable; by the time an
//! entry is evicted its circle has long since advanced past that round.

use std::collections::{HashSet, VecDeque};

use satscircle_types::{CircleError, CircleId, Result};

type RoundKey = (CircleId, u32);

/// Remembers which rounds have already been paid out.
pub struct PayoutGuard {
    paid: HashSet<RoundKey>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<RoundKey>,
    max_size: usize,
}

impl PayoutGuard {
    /// Create a new guard with the given maximum size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "PayoutGuard max_size must be > 0");
        Self {
            paid: HashSet::with_capacity(max_size.min(1024)),
            order: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Mark a round as paid.
    ///
    /// # Errors
    /// Returns [`CircleError::RoundAlreadyPaid`] if the round was already
    /// marked.
    pub fn mark_paid(&mut self, circle: CircleId, round: u32) -> Result<()> {
        let key = (circle, round);
        if self.paid.contains(&key) {
            return Err(CircleError::RoundAlreadyPaid { circle, round });
        }

        if self.paid.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.paid.remove(&oldest);
            }
        }

        self.paid.insert(key);
        self.order.push_back(key);
        Ok(())
    }

    /// Forget a round whose payout was rolled back.
    pub fn forget(&mut self, circle: CircleId, round: u32) {
        let key = (circle, round);
        if self.paid.remove(&key) {
            self.order.retain(|k| *k != key);
        }
    }

    pub fn is_paid(&self, circle: CircleId, round: u32) -> bool {
        self.paid.contains(&(circle, round))
    }

    pub fn len(&self) -> usize {
        self.paid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paid.is_empty()
    }
}

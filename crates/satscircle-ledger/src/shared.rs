//! Thread-safe handle to a [`CircleRegistry`].
//!
//! Each call holds the lock for the whole operation, so concurrent
//! mutations are applied one at a time and the loser of a race sees the
//! winner's committed state.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use satscircle_escrow::{PayoutTransfer, WalletBook};
use satscircle_types::{
    Address, CircleId, CircleParams, EventRecord, InviteGrant, LedgerConfig, Result,
};

use crate::payout::Payout;
use crate::query::CircleStatus;
use crate::registry::CircleRegistry;

/// Cloneable, lock-guarded registry.
pub struct SharedRegistry<T: PayoutTransfer = WalletBook> {
    inner: Arc<Mutex<CircleRegistry<T>>>,
}

impl<T: PayoutTransfer> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedRegistry<WalletBook> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_registry(CircleRegistry::new())
    }
}

impl Default for SharedRegistry<WalletBook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PayoutTransfer> SharedRegistry<T> {
    #[must_use]
    pub fn from_registry(registry: CircleRegistry<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// # Errors
    /// See [`CircleRegistry::with_config`].
    pub fn with_config(config: LedgerConfig, transfer: T) -> Result<Self> {
        CircleRegistry::with_config(config, transfer).map(Self::from_registry)
    }

    /// Run `f` with the lock held. Use for multi-step reads that must see
    /// one consistent state.
    pub fn with<R>(&self, f: impl FnOnce(&mut CircleRegistry<T>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// # Errors
    /// See [`CircleRegistry::create_circle`].
    pub fn create_circle(
        &self,
        params: CircleParams,
        creator: Address,
        initial_payment: Decimal,
    ) -> Result<CircleId> {
        self.inner
            .lock()
            .create_circle(params, creator, initial_payment)
    }

    /// # Errors
    /// See [`CircleRegistry::join_circle`].
    pub fn join_circle(
        &self,
        circle: CircleId,
        who: Address,
        paid: Decimal,
        grant: Option<&InviteGrant>,
    ) -> Result<u32> {
        self.inner.lock().join_circle(circle, who, paid, grant)
    }

    /// # Errors
    /// See [`CircleRegistry::submit_contribution`].
    pub fn submit_contribution(&self, circle: CircleId, who: Address, paid: Decimal) -> Result<u32> {
        self.inner.lock().submit_contribution(circle, who, paid)
    }

    /// # Errors
    /// See [`CircleRegistry::distribute_payout`].
    pub fn distribute_payout(&self, circle: CircleId, caller: Address) -> Result<Payout> {
        self.inner.lock().distribute_payout(circle, caller)
    }

    /// # Errors
    /// See [`CircleRegistry::remove_member`].
    pub fn remove_member(&self, circle: CircleId, caller: Address, target: Address) -> Result<()> {
        self.inner.lock().remove_member(circle, caller, target)
    }

    /// # Errors
    /// See [`CircleRegistry::deactivate_circle`].
    pub fn deactivate_circle(&self, circle: CircleId, caller: Address) -> Result<()> {
        self.inner.lock().deactivate_circle(circle, caller)
    }

    /// # Errors
    /// See [`CircleRegistry::circle_status`].
    pub fn circle_status(&self, circle: CircleId) -> Result<CircleStatus> {
        self.inner.lock().circle_status(circle)
    }

    /// # Errors
    /// See [`CircleRegistry::circle_member_count`].
    pub fn circle_member_count(&self, circle: CircleId) -> Result<usize> {
        self.inner.lock().circle_member_count(circle)
    }

    #[must_use]
    pub fn is_circle_member(&self, circle: CircleId, who: &Address) -> bool {
        self.inner.lock().is_circle_member(circle, who)
    }

    pub fn drain_events(&self) -> Vec<EventRecord> {
        self.inner.lock().drain_events()
    }
}

//! Circle registry. Owns every circle and composes the ledgers.
//!
//! Every mutating entry point follows the same shape:
//! 1. Gate (exists, owner, open)
//! 2. Validate all preconditions
//! 3. Commit ledger state
//! 4. Move funds (escrow deposit, or release + transfer for payouts)
//! 5. Append the event record
//!
//! A failed step before 3 leaves everything untouched. The only step that
//! can fail after a commit is the outbound payout transfer, which restores
//! the pre-payout snapshot.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use satscircle_escrow::{EscrowVault, PayoutTransfer, WalletBook};
use satscircle_types::{
    Address, Circle, CircleError, CircleEvent, CircleId, CircleParams, EventId, EventRecord,
    InviteGrant, LedgerConfig, Result,
};

use crate::access;
use crate::contribution;
use crate::membership::MembershipLedger;
use crate::payout::{self, Payout};

/// The ledger's single source of truth.
///
/// Mutations take `&mut self`, so a registry value is serialised by
/// construction. Wrap it in [`SharedRegistry`](crate::SharedRegistry) to
/// share it across threads.
pub struct CircleRegistry<T: PayoutTransfer = WalletBook> {
    pub(crate) config: LedgerConfig,
    next_id: CircleId,
    pub(crate) circles: BTreeMap<CircleId, Circle>,
    pub(crate) members: MembershipLedger,
    pub(crate) vault: EscrowVault,
    transfer: T,
    events: Vec<EventRecord>,
    next_sequence: u64,
}

impl CircleRegistry<WalletBook> {
    /// Default configuration, paying out into an in-memory [`WalletBook`].
    #[must_use]
    pub fn new() -> Self {
        Self::build(LedgerConfig::default(), WalletBook::new())
    }
}

impl Default for CircleRegistry<WalletBook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PayoutTransfer> CircleRegistry<T> {
    /// Registry with a custom configuration and payment rail.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails [`LedgerConfig::validate`].
    pub fn with_config(config: LedgerConfig, transfer: T) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, transfer))
    }

    fn build(config: LedgerConfig, transfer: T) -> Self {
        let vault = EscrowVault::new(config.payout_guard_capacity);
        Self {
            config,
            next_id: CircleId::first(),
            circles: BTreeMap::new(),
            members: MembershipLedger::new(),
            vault,
            transfer,
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Create a circle and admit `creator` as its owner and first member.
    ///
    /// The creator takes `join_order` 0, so they receive the first payout.
    ///
    /// # Errors
    /// - `NameEmpty` / `NameTooLong` for a bad name
    /// - `InvalidContributionAmount` if the amount is not positive
    /// - `InvalidMemberLimit` if the limit is outside the configured bounds
    /// - `ContributionMismatch` if `initial_payment` differs from the amount
    /// - `AmountOverflow` if escrow cannot hold the payment
    pub fn create_circle(
        &mut self,
        params: CircleParams,
        creator: Address,
        initial_payment: Decimal,
    ) -> Result<CircleId> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(CircleError::NameEmpty);
        }
        let len = name.chars().count();
        if len > self.config.max_name_len {
            return Err(CircleError::NameTooLong {
                len,
                max: self.config.max_name_len,
            });
        }
        if params.contribution_amount <= Decimal::ZERO {
            return Err(CircleError::InvalidContributionAmount(
                params.contribution_amount,
            ));
        }
        if params.member_limit < self.config.min_member_limit
            || params.member_limit > self.config.max_member_limit
        {
            return Err(CircleError::InvalidMemberLimit {
                limit: params.member_limit,
                min: self.config.min_member_limit,
                max: self.config.max_member_limit,
            });
        }
        if initial_payment != params.contribution_amount {
            return Err(CircleError::ContributionMismatch {
                expected: params.contribution_amount,
                paid: initial_payment,
            });
        }

        let id = self.next_id;
        let params = CircleParams { name, ..params };
        let mut circle = Circle::open(id, params, creator);
        self.vault.check_deposit(id, initial_payment)?;
        self.members
            .admit(&mut circle, creator, initial_payment, None)?;
        self.vault.deposit(id, initial_payment)?;

        tracing::info!(
            circle = %id,
            owner = %creator,
            name = %circle.name,
            amount = %circle.contribution_amount,
            frequency = %circle.frequency,
            limit = circle.member_limit,
            visibility = %circle.visibility,
            "Circle created"
        );

        let event = CircleEvent::CircleCreated {
            circle_id: id,
            name: circle.name.clone(),
            owner: creator,
            contribution_amount: circle.contribution_amount,
        };
        self.circles.insert(id, circle);
        self.next_id = id.next();
        self.emit(event);
        Ok(id)
    }

    /// Join `circle` with the admission payment. Private circles need an
    /// [`InviteGrant`] naming `who`.
    ///
    /// Returns the new member's `join_order`.
    ///
    /// # Errors
    /// `CircleNotFound`, `AmountOverflow` if escrow cannot hold the
    /// payment, plus every admission error of [`MembershipLedger::admit`].
    pub fn join_circle(
        &mut self,
        circle: CircleId,
        who: Address,
        paid: Decimal,
        grant: Option<&InviteGrant>,
    ) -> Result<u32> {
        let record = access::require_circle_mut(&mut self.circles, circle)?;
        self.vault.check_deposit(circle, paid)?;
        let join_order = self.members.admit(record, who, paid, grant)?;
        self.vault.deposit(circle, paid)?;
        self.emit(CircleEvent::MemberJoined {
            circle_id: circle,
            member: who,
        });
        Ok(join_order)
    }

    /// Pay this round's contribution. Returns the round credited.
    ///
    /// # Errors
    /// `CircleNotFound`, `AmountOverflow` if escrow cannot hold the
    /// payment, plus every error of [`contribution::record_contribution`].
    pub fn submit_contribution(
        &mut self,
        circle: CircleId,
        who: Address,
        paid: Decimal,
    ) -> Result<u32> {
        let record = access::require_circle_mut(&mut self.circles, circle)?;
        self.vault.check_deposit(circle, paid)?;
        let round = contribution::record_contribution(record, &mut self.members, who, paid)?;
        self.vault.deposit(circle, paid)?;
        self.emit(CircleEvent::ContributionMade {
            circle_id: circle,
            member: who,
            amount: paid,
            round,
        });
        Ok(round)
    }

    /// Pay the current round's pot to the next member in rotation.
    ///
    /// The round, cursor and payment flags are committed before the pot
    /// leaves escrow. If the transfer fails, the vault and ledger are put
    /// back exactly as they were and nothing is emitted.
    ///
    /// # Errors
    /// - `CircleNotFound` if the circle does not exist
    /// - `NotOwner` if `caller` is not the owner
    /// - `CircleCompleted` / `CircleInactive` if the circle is not open
    /// - `RoundIncomplete` if an active member has not paid
    /// - `PayoutTransferFailed` if the recipient could not be paid
    pub fn distribute_payout(&mut self, circle: CircleId, caller: Address) -> Result<Payout> {
        let record = access::require_circle_mut(&mut self.circles, circle)?;
        access::require_owner(record, &caller)?;
        access::require_open(record)?;
        let plan = payout::plan_payout(record, &self.members)?;

        let circle_before = record.clone();
        let members_before = self.members.snapshot(circle);
        payout::commit_round(record, &mut self.members, &plan);

        if let Err(err) = self.vault.release(circle, plan.round, plan.amount) {
            *record = circle_before;
            self.members.restore(circle, members_before);
            return Err(err);
        }

        if let Err(err) = self.transfer.send(circle, plan.recipient, plan.amount) {
            *record = circle_before;
            self.members.restore(circle, members_before);
            self.vault.rollback_release(circle, plan.round, plan.amount)?;

            tracing::warn!(
                circle = %circle,
                round = plan.round,
                recipient = %plan.recipient,
                amount = %plan.amount,
                error = %err,
                "Payout transfer failed, round rolled back"
            );
            return Err(match err {
                CircleError::PayoutTransferFailed { .. } => err,
                other => CircleError::PayoutTransferFailed {
                    reason: other.to_string(),
                },
            });
        }

        tracing::info!(
            circle = %circle,
            round = plan.round,
            recipient = %plan.recipient,
            amount = %plan.amount,
            "Payout sent"
        );
        self.emit(CircleEvent::PayoutSent {
            circle_id: circle,
            recipient: plan.recipient,
            amount: plan.amount,
            round: plan.round,
        });
        Ok(Payout {
            recipient: plan.recipient,
            amount: plan.amount,
            round: plan.round,
        })
    }

    /// Owner-only: deactivate `target`'s membership.
    ///
    /// # Errors
    /// `CircleNotFound`, `NotOwner`, `CannotRemoveOwner`, `NotMember`.
    pub fn remove_member(
        &mut self,
        circle: CircleId,
        caller: Address,
        target: Address,
    ) -> Result<()> {
        let record = access::require_circle(&self.circles, circle)?;
        access::require_owner(record, &caller)?;
        self.members.remove(record, target)?;
        self.emit(CircleEvent::MemberRemoved {
            circle_id: circle,
            member: target,
        });
        Ok(())
    }

    /// Owner-only: stop the circle. Escrowed funds stay where they are.
    ///
    /// # Errors
    /// `CircleNotFound`, `NotOwner`, and `CircleInactive` /
    /// `CircleCompleted` if the circle is already closed.
    pub fn deactivate_circle(&mut self, circle: CircleId, caller: Address) -> Result<()> {
        let record = access::require_circle_mut(&mut self.circles, circle)?;
        access::require_owner(record, &caller)?;
        access::require_open(record)?;
        record.is_active = false;

        tracing::info!(
            circle = %circle,
            round = record.current_round,
            held = %self.vault.held(circle),
            "Circle deactivated"
        );
        self.emit(CircleEvent::CircleDeactivated { circle_id: circle });
        Ok(())
    }

    /// `Σ total_contributed − Σ payouts == held`, checked against the vault.
    ///
    /// # Errors
    /// `CircleNotFound`, `AmountOverflow` if the member totals cannot be
    /// summed, or `EscrowInvariantViolation` on any mismatch.
    pub fn verify_conservation(&self, circle: CircleId) -> Result<()> {
        let record = access::require_circle(&self.circles, circle)?;
        let contributed = self.members.total_contributed(circle)?;
        if contributed != record.total_saved {
            return Err(CircleError::EscrowInvariantViolation {
                reason: format!(
                    "{circle}: members contributed {contributed}, circle saved {}",
                    record.total_saved
                ),
            });
        }
        self.vault.verify(circle, contributed)
    }

    /// Every event emitted so far and not yet drained, oldest first.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Hand pending events to a subscriber. Sequence numbers keep counting.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn vault(&self) -> &EscrowVault {
        &self.vault
    }

    #[must_use]
    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn transfer_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    fn emit(&mut self, event: CircleEvent) {
        tracing::debug!(
            sequence = self.next_sequence,
            circle = %event.circle_id(),
            event = event.name(),
            "Event emitted"
        );
        self.events.push(EventRecord {
            id: EventId::new(),
            sequence: self.next_sequence,
            event,
            emitted_at: Utc::now(),
        });
        self.next_sequence += 1;
    }
}

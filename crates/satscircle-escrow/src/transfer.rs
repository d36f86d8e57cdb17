//! Outbound payout transfers.
//!
//! The ledger never moves money itself: it hands the recipient and amount
//! to a [`PayoutTransfer`] implementation supplied by the host (a chain
//! client, a custodial payment rail). [`WalletBook`] is the in-memory
//! implementation used for local hosting and tests.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use satscircle_types::{Address, CircleError, CircleId, Result};
use serde::{Deserialize, Serialize};

/// Sends a released payout to its recipient.
///
/// Implementations must either complete the transfer or return an error;
/// the caller rolls the ledger back on error and never retries.
pub trait PayoutTransfer {
    /// # Errors
    /// Returns [`CircleError::PayoutTransferFailed`] if the recipient could
    /// not be paid.
    fn send(&mut self, circle: CircleId, recipient: Address, amount: Decimal) -> Result<()>;
}

/// Proof that a payout reached a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub circle: CircleId,
    pub recipient: Address,
    pub amount: Decimal,
    pub sent_at: DateTime<Utc>,
}

/// In-memory wallet balances that receive payouts.
///
/// Addresses can be marked as rejecting to simulate a recipient whose
/// wallet refuses incoming funds.
#[derive(Debug, Default)]
pub struct WalletBook {
    balances: HashMap<Address, Decimal>,
    rejecting: HashSet<Address>,
    receipts: Vec<PayoutReceipt>,
}

impl WalletBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future transfer to `address` fail.
    pub fn reject_payouts_to(&mut self, address: Address) {
        self.rejecting.insert(address);
    }

    /// Accept transfers to `address` again.
    pub fn accept_payouts_to(&mut self, address: &Address) {
        self.rejecting.remove(address);
    }

    #[must_use]
    pub fn balance(&self, address: &Address) -> Decimal {
        self.balances.get(address).copied().unwrap_or(Decimal::ZERO)
    }

    /// Every completed payout, oldest first.
    #[must_use]
    pub fn receipts(&self) -> &[PayoutReceipt] {
        &self.receipts
    }

    /// Completed payouts to one address.
    #[must_use]
    pub fn receipts_for(&self, address: &Address) -> Vec<&PayoutReceipt> {
        self.receipts
            .iter()
            .filter(|r| r.recipient == *address)
            .collect()
    }

    /// Sum of all payouts delivered, or `None` if the sum is not
    /// representable.
    #[must_use]
    pub fn total_paid(&self) -> Option<Decimal> {
        self.receipts
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.amount))
    }
}

impl PayoutTransfer for WalletBook {
    fn send(&mut self, circle: CircleId, recipient: Address, amount: Decimal) -> Result<()> {
        if self.rejecting.contains(&recipient) {
            tracing::warn!(
                circle = %circle,
                recipient = %recipient,
                amount = %amount,
                "Recipient wallet rejected payout"
            );
            return Err(CircleError::PayoutTransferFailed {
                reason: format!("{recipient} rejected {amount} from {circle}"),
            });
        }

        let balance = self
            .balance(&recipient)
            .checked_add(amount)
            .ok_or_else(|| CircleError::AmountOverflow {
                context: format!("{recipient} wallet balance"),
            })?;
        self.balances.insert(recipient, balance);
        self.receipts.push(PayoutReceipt {
            circle,
            recipient,
            amount,
            sent_at: Utc::now(),
        });
        Ok(())
    }
}

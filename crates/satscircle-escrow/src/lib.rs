//! # satscircle-escrow
//!
//! **Escrow Plane**: custody of pooled contributions and release of
//! payouts.
//!
//! ## Architecture
//!
//! 1. **EscrowVault**: per-circle pools. Only a payout release moves funds out
//! 2. **PayoutGuard**: each `(circle, round)` pays out at most once
//! 3. **EscrowConservation**: `Σ contributed − Σ paid out == held`, per circle
//! 4. **PayoutTransfer**: the outbound seam to the host's payment rail
//!
//! ## Payout Flow
//!
//! ```text
//! Ledger commits round → EscrowVault.release() → PayoutTransfer.send()
//!                                 ▲                      │ fails
//!                                 └── rollback_release ◀─┘
//! ```

pub mod conservation;
pub mod payout_guard;
pub mod transfer;
pub mod vault;

pub use conservation::EscrowConservation;
pub use payout_guard::PayoutGuard;
pub use transfer::{PayoutReceipt, PayoutTransfer, WalletBook};
pub use vault::EscrowVault;

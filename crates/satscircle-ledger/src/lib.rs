//! # satscircle-ledger
//!
//! The **SatsCircle** state machine: rotating savings circles where every
//! member pays a fixed amount each round and one member, chosen by join
//! order, receives the whole pot.
//!
//! - [`MembershipLedger`]: admission rules and the per-circle member table
//! - [`contribution`]: one payment per member per round, streaks
//! - [`payout`]: round completion, rotation, round advance
//! - [`access`]: owner and open-state gates
//! - [`CircleRegistry`]: owns every circle and composes the above
//! - [`SharedRegistry`]: lock-guarded handle for multi-threaded hosts
//!
//! ## Circle Lifecycle
//!
//! ```text
//! create ──▶ OPEN ──(round N paid out)──▶ COMPLETED
//!             │  ▲
//!  join /     │  │ distribute (round += 1)
//!  contribute └──┘
//!             │
//!             └──(owner deactivates)──▶ DEACTIVATED
//! ```
//!
//! ## Round
//!
//! 1. Every active member pays `contribution_amount` (admission counts)
//! 2. The owner calls `distribute_payout`
//! 3. Ledger commits: round += 1, cursor advances, payment flags clear
//! 4. Escrow releases `contribution_amount × active members`
//! 5. The transfer runs; on failure steps 3–4 are undone

pub mod access;
pub mod contribution;
pub mod membership;
pub mod payout;
pub mod query;
pub mod registry;
pub mod shared;

pub use membership::MembershipLedger;
pub use payout::{Payout, PayoutPlan};
pub use query::{CircleStatus, MemberStats};
pub use registry::CircleRegistry;
pub use shared::SharedRegistry;

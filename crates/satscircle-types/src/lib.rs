//! # satscircle-types
//!
//! Shared types, errors, and configuration for the **SatsCircle** savings
//! circle ledger.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`CircleId`], [`Address`], [`EventId`]
//! - **Circle model**: [`Circle`], [`CircleParams`], [`Frequency`], [`Visibility`], [`CircleState`]
//! - **Member model**: [`Member`], [`InviteGrant`]
//! - **Events**: [`CircleEvent`], [`EventRecord`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`CircleError`] with `SC_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod circle;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod member;

// Re-export all primary types at crate root for ergonomic imports:
//   use satscircle_types::{Circle, Member, CircleId, Address, ...};

pub use circle::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use member::*;

// Constants are accessed via `satscircle_types::constants::FOO`
// (not re-exported to avoid name collisions).

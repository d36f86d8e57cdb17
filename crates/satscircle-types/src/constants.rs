//! System-wide constants for the SatsCircle ledger.

/// The first circle ever created receives this ID.
pub const FIRST_CIRCLE_ID: u64 = 1;

/// Every circle starts in this round.
pub const FIRST_ROUND: u32 = 1;

/// Smallest member limit a circle may be created with.
pub const MIN_MEMBER_LIMIT: u32 = 2;

/// Default upper bound on a circle's member limit.
pub const DEFAULT_MAX_MEMBER_LIMIT: u32 = 100;

/// Default maximum circle name length, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 64;

/// Number of `(circle, round)` payouts the settlement guard remembers.
pub const DEFAULT_PAYOUT_GUARD_CAPACITY: usize = 10_000;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Domain separator for deterministic address derivation.
pub const ADDRESS_DERIVATION_DOMAIN: &[u8] = b"satscircle:address:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ledger name.
pub const LEDGER_NAME: &str = "SatsCircle";

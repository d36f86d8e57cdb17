//! Error types for the SatsCircle ledger.
//!
//! All errors use the `SC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Circle state errors
//! - 3xx: Admission errors
//! - 4xx: Contribution errors
//! - 5xx: Settlement errors
//! - 6xx: Authorization errors
//! - 9xx: General / internal errors
//!
//! Every failed precondition aborts the whole operation: no state changes
//! and no funds move.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, CircleId};

/// Central error enum for all SatsCircle operations.
#[derive(Debug, Error)]
pub enum CircleError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A circle must have a non-empty name.
    #[error("SC_ERR_100: Circle name cannot be empty")]
    NameEmpty,

    /// The contribution amount must be strictly positive.
    #[error("SC_ERR_101: Contribution amount must be greater than 0, got {0}")]
    InvalidContributionAmount(Decimal),

    /// The attached payment does not equal the circle's contribution amount.
    #[error("SC_ERR_102: Contribution mismatch: expected {expected}, got {paid}")]
    ContributionMismatch { expected: Decimal, paid: Decimal },

    /// The member limit is outside the configured bounds.
    #[error("SC_ERR_103: Invalid member limit {limit}: must be between {min} and {max}")]
    InvalidMemberLimit { limit: u32, min: u32, max: u32 },

    /// The circle name exceeds the configured maximum length.
    #[error("SC_ERR_104: Circle name too long: {len} chars, max {max}")]
    NameTooLong { len: usize, max: usize },

    /// An address string could not be parsed.
    #[error("SC_ERR_105: Invalid address: {reason}")]
    InvalidAddress { reason: String },

    /// A running total would exceed the representable amount range.
    #[error("SC_ERR_106: Amount overflow: {context}")]
    AmountOverflow { context: String },

    // =================================================================
    // Circle State Errors (2xx)
    // =================================================================
    /// No circle exists with this ID.
    #[error("SC_ERR_200: Circle not found: {0}")]
    CircleNotFound(CircleId),

    /// The circle's `is_active` flag has been cleared.
    #[error("SC_ERR_201: Circle is inactive: {0}")]
    CircleInactive(CircleId),

    /// Every round has been paid out; the circle accepts no further mutation.
    #[error("SC_ERR_202: Circle {circle} completed after {rounds} rounds")]
    CircleCompleted { circle: CircleId, rounds: u32 },

    // =================================================================
    // Admission Errors (3xx)
    // =================================================================
    /// Active member count already equals the member limit.
    #[error("SC_ERR_300: Circle is full: {circle} has {limit} members")]
    CircleFull { circle: CircleId, limit: u32 },

    /// The address already has an active membership.
    #[error("SC_ERR_301: Already a member: {member} in {circle}")]
    AlreadyMember { circle: CircleId, member: Address },

    /// The circle is private and no matching invite grant was presented.
    #[error("SC_ERR_302: Private circle {circle} requires an invite for {member}")]
    PrivateCircleAccessDenied { circle: CircleId, member: Address },

    /// The address was removed from this circle and cannot rejoin.
    #[error("SC_ERR_303: Member {member} was removed from {circle}")]
    MemberPreviouslyRemoved { circle: CircleId, member: Address },

    // =================================================================
    // Contribution Errors (4xx)
    // =================================================================
    /// The address has no active membership in the circle.
    #[error("SC_ERR_400: Not a member: {member} in {circle}")]
    NotMember { circle: CircleId, member: Address },

    /// The member already paid for the current round.
    #[error("SC_ERR_401: Already contributed for round {round} of {circle}")]
    AlreadyContributedThisRound { circle: CircleId, round: u32 },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Not every active member has paid for the current round.
    #[error("SC_ERR_500: Round {round} of {circle} incomplete: {paid}/{active} members paid")]
    RoundIncomplete {
        circle: CircleId,
        round: u32,
        paid: usize,
        active: usize,
    },

    /// The outbound payout transfer was rejected; the round was not advanced.
    #[error("SC_ERR_501: Payout transfer failed: {reason}")]
    PayoutTransferFailed { reason: String },

    /// Escrow accounting no longer balances.
    #[error("SC_ERR_502: Escrow invariant violation: {reason}")]
    EscrowInvariantViolation { reason: String },

    /// This `(circle, round)` has already been paid out.
    #[error("SC_ERR_503: Round {round} of {circle} already paid out")]
    RoundAlreadyPaid { circle: CircleId, round: u32 },

    // =================================================================
    // Authorization Errors (6xx)
    // =================================================================
    /// Only the circle owner may perform this action.
    #[error("SC_ERR_600: Only circle owner can perform this action on {circle}")]
    NotOwner { circle: CircleId, caller: Address },

    /// The owner can never be removed from their own circle.
    #[error("SC_ERR_601: Cannot remove circle owner from {0}")]
    CannotRemoveOwner(CircleId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SC_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SC_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad bounds, etc.).
    #[error("SC_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CircleError>;

impl From<serde_json::Error> for CircleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = CircleError::CircleNotFound(CircleId(999));
        let msg = format!("{err}");
        assert!(msg.starts_with("SC_ERR_200"), "Got: {msg}");
        assert!(msg.contains("999"));
    }

    #[test]
    fn contribution_mismatch_display() {
        let err = CircleError::ContributionMismatch {
            expected: Decimal::new(1, 3),
            paid: Decimal::new(5, 4),
        };
        let msg = format!("{err}");
        assert!(msg.contains("SC_ERR_102"));
        assert!(msg.contains("0.001"));
        assert!(msg.contains("0.0005"));
    }

    #[test]
    fn round_incomplete_display() {
        let err = CircleError::RoundIncomplete {
            circle: CircleId(3),
            round: 2,
            paid: 1,
            active: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains("SC_ERR_500"));
        assert!(msg.contains("1/3"));
    }

    #[test]
    fn all_errors_have_sc_err_prefix() {
        let member = Address::from_label("m");
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(CircleError::NameEmpty),
            Box::new(CircleError::CircleFull {
                circle: CircleId(1),
                limit: 5,
            }),
            Box::new(CircleError::AlreadyMember {
                circle: CircleId(1),
                member,
            }),
            Box::new(CircleError::CannotRemoveOwner(CircleId(1))),
            Box::new(CircleError::PayoutTransferFailed {
                reason: "rejected".into(),
            }),
            Box::new(CircleError::AmountOverflow {
                context: "circle:1 total_saved".into(),
            }),
            Box::new(CircleError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("SC_ERR_"),
                "Error missing SC_ERR_ prefix: {msg}"
            );
        }
    }
}

//! Identifiers used throughout SatsCircle.
//!
//! Circles are numbered sequentially and never reuse an ID. Accounts are
//! 20-byte wallet addresses authenticated by the host environment. Event
//! records use UUIDv7 for time-ordered sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{constants, CircleError, Result};

// ---------------------------------------------------------------------------
// CircleId
// ---------------------------------------------------------------------------

/// Sequential circle identifier. Assigned at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CircleId(pub u64);

impl CircleId {
    /// The ID handed to the first circle a registry creates.
    #[must_use]
    pub const fn first() -> Self {
        Self(constants::FIRST_CIRCLE_ID)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CircleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circle:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A wallet account identity (20 raw bytes).
///
/// The ledger never verifies signatures: the host authenticates the caller
/// and hands the resulting `Address` to every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; constants::ADDRESS_LEN]);

impl Address {
    #[must_use]
    pub fn from_bytes(bytes: [u8; constants::ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::ADDRESS_LEN] {
        &self.0
    }

    /// Deterministic address derived from a label.
    ///
    /// The same label always yields the same address, which keeps fixtures
    /// and logs stable across runs.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::ADDRESS_DERIVATION_DOMAIN);
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; constants::ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..constants::ADDRESS_LEN]);
        Self(bytes)
    }

    /// Parse a hex address, with or without the `0x` prefix.
    ///
    /// # Errors
    /// Returns [`CircleError::InvalidAddress`] if the text is not exactly
    /// 40 hex digits.
    pub fn parse_hex(text: &str) -> Result<Self> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        let raw = hex::decode(digits).map_err(|e| CircleError::InvalidAddress {
            reason: format!("{text}: {e}"),
        })?;
        let bytes: [u8; constants::ADDRESS_LEN] =
            raw.try_into().map_err(|raw: Vec<u8>| CircleError::InvalidAddress {
                reason: format!(
                    "{text}: expected {} bytes, got {}",
                    constants::ADDRESS_LEN,
                    raw.len()
                ),
            })?;
        Ok(Self(bytes))
    }

    /// First four bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Random address for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    pub fn random() -> Self {
        Self(rand::random::<[u8; constants::ADDRESS_LEN]>())
    }
}

// ---------------------------------------------------------------------------
// EventId
// ---------------------------------------------------------------------------

/// Unique identifier for an emitted event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_id_sequence() {
        let first = CircleId::first();
        assert_eq!(first, CircleId(1));
        assert_eq!(first.next(), CircleId(2));
    }

    #[test]
    fn label_derivation_is_stable() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
    }

    #[test]
    fn address_display_and_parse() {
        let addr = Address::from_label("owner");
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(Address::parse_hex(&text).unwrap(), addr);
        assert_eq!(Address::parse_hex(&text[2..]).unwrap(), addr);
    }

    #[test]
    fn parse_rejects_bad_input() {
        let err = Address::parse_hex("0x1234").unwrap_err();
        assert!(matches!(err, CircleError::InvalidAddress { .. }));
        let err = Address::parse_hex("0xzz").unwrap_err();
        assert!(matches!(err, CircleError::InvalidAddress { .. }));
    }

    #[test]
    fn event_id_ordering() {
        let a = EventId::new();
        let b = EventId::new();
        assert!(a < b);
    }

    #[test]
    fn random_addresses_differ() {
        assert_ne!(Address::random(), Address::random());
    }

    #[test]
    fn serde_roundtrips() {
        let addr = Address::from_label("carol");
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);

        let id = CircleId(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
    }
}

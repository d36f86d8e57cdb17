//! Ledger configuration.

use serde::{Deserialize, Serialize};

use crate::{CircleError, Result, constants};

/// Bounds the registry applies when creating circles, plus sizing for the
/// payout guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Smallest accepted `member_limit`. Never below 2.
    pub min_member_limit: u32,
    /// Largest accepted `member_limit`.
    pub max_member_limit: u32,
    /// Maximum circle name length, in characters.
    pub max_name_len: usize,
    /// How many settled `(circle, round)` pairs the payout guard remembers.
    pub payout_guard_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_member_limit: constants::MIN_MEMBER_LIMIT,
            max_member_limit: constants::DEFAULT_MAX_MEMBER_LIMIT,
            max_name_len: constants::DEFAULT_MAX_NAME_LEN,
            payout_guard_capacity: constants::DEFAULT_PAYOUT_GUARD_CAPACITY,
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns [`CircleError::Serialization`] for malformed JSON and
    /// [`CircleError::Configuration`] for out-of-range values.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns [`CircleError::Configuration`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.min_member_limit < constants::MIN_MEMBER_LIMIT {
            return Err(CircleError::Configuration(format!(
                "min_member_limit {} below {}",
                self.min_member_limit,
                constants::MIN_MEMBER_LIMIT
            )));
        }
        if self.max_member_limit < self.min_member_limit {
            return Err(CircleError::Configuration(format!(
                "max_member_limit {} below min_member_limit {}",
                self.max_member_limit, self.min_member_limit
            )));
        }
        if self.max_name_len == 0 {
            return Err(CircleError::Configuration("max_name_len must be > 0".into()));
        }
        if self.payout_guard_capacity == 0 {
            return Err(CircleError::Configuration(
                "payout_guard_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}

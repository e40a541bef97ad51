//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers LGX passes around. A `MilestoneId`
//! cannot be handed to something expecting a `ShipmentRef`, and neither can
//! be empty.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LgxError;

/// Internal unique identifier of a shipment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentId(pub Uuid);

impl ShipmentId {
    /// Generate a new random shipment identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShipmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shipment:{}", self.0)
    }
}

/// Human-facing shipment reference (e.g. `IMP-2024-0042`).
///
/// Used as a file stem for session files, so it is restricted to ASCII
/// alphanumerics plus `-`, `_` and `.`, must not start with `.`, and is at
/// most 64 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShipmentRef(String);

impl ShipmentRef {
    /// Validate and wrap a shipment reference.
    pub fn new(value: impl Into<String>) -> Result<Self, LgxError> {
        let value = value.into();
        if value.is_empty() || value.len() > 64 {
            return Err(LgxError::InvalidIdentifier(format!(
                "shipment reference must be 1-64 characters, got {value:?}"
            )));
        }
        if value.starts_with('.') {
            return Err(LgxError::InvalidIdentifier(format!(
                "shipment reference must not start with '.', got {value:?}"
            )));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(LgxError::InvalidIdentifier(format!(
                "shipment reference may only contain [A-Za-z0-9._-], got {value:?}"
            )));
        }
        Ok(Self(value))
    }

    /// The reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShipmentRef {
    type Error = LgxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShipmentRef> for String {
    fn from(value: ShipmentRef) -> Self {
        value.0
    }
}

impl std::str::FromStr for ShipmentRef {
    type Err = LgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for ShipmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a milestone, unique within one shipment's sequence.
///
/// Catalog ids are stable across sessions (`customs_clearance`,
/// `vessel_departure`), which is what lets a definition list be reconciled
/// against an existing sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MilestoneId(String);

impl MilestoneId {
    /// Validate and wrap a milestone identifier. Surrounding whitespace is
    /// trimmed; the result must be non-empty.
    pub fn new(value: impl Into<String>) -> Result<Self, LgxError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LgxError::InvalidIdentifier(
                "milestone id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MilestoneId {
    type Error = LgxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MilestoneId> for String {
    fn from(value: MilestoneId) -> Self {
        value.0
    }
}

impl std::str::FromStr for MilestoneId {
    type Err = LgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

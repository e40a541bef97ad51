//! # Shipment Taxonomy
//!
//! The small closed vocabularies every LGX crate shares: which way a shipment
//! moves, how it travels, which category a milestone belongs to, and which
//! department is responsible for that category.
//!
//! Every `match` on these enums is exhaustive. Adding a category forces the
//! department routing, the catalog, and the renderer to handle it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LgxError;

// ─── Shipment Direction ──────────────────────────────────────────────

/// Whether the shipment enters or leaves the operator's country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentDirection {
    /// Inbound shipment.
    Import,
    /// Outbound shipment.
    Export,
}

impl ShipmentDirection {
    /// All directions in canonical order.
    pub fn all() -> &'static [ShipmentDirection] {
        &[Self::Import, Self::Export]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
        }
    }
}

impl std::fmt::Display for ShipmentDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentDirection {
    type Err = LgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import" => Ok(Self::Import),
            "export" => Ok(Self::Export),
            other => Err(LgxError::UnknownVariant {
                kind: "shipment direction",
                value: other.to_string(),
            }),
        }
    }
}

// ─── Transport Mode ──────────────────────────────────────────────────

/// How the shipment travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Air freight.
    Air,
    /// Ocean freight.
    Sea,
}

impl TransportMode {
    /// All transport modes in canonical order.
    pub fn all() -> &'static [TransportMode] {
        &[Self::Air, Self::Sea]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Sea => "sea",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = LgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "air" => Ok(Self::Air),
            "sea" => Ok(Self::Sea),
            other => Err(LgxError::UnknownVariant {
                kind: "transport mode",
                value: other.to_string(),
            }),
        }
    }
}

// ─── Milestone Category ──────────────────────────────────────────────

/// Presentation grouping of a milestone.
///
/// Categories never influence ordering. They drive grouping, colouring and
/// the department a milestone is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneCategory {
    /// Booking, documentation and internal handling.
    Operations,
    /// Declarations, inspections and clearance.
    Customs,
    /// Physical movement between origin and destination.
    Transport,
    /// Warehousing, loading and last-mile delivery.
    Logistics,
    /// Quotes, invoicing and payment.
    Commercial,
}

impl MilestoneCategory {
    /// All categories in canonical order.
    pub fn all() -> &'static [MilestoneCategory] {
        &[
            Self::Operations,
            Self::Customs,
            Self::Transport,
            Self::Logistics,
            Self::Commercial,
        ]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operations => "operations",
            Self::Customs => "customs",
            Self::Transport => "transport",
            Self::Logistics => "logistics",
            Self::Commercial => "commercial",
        }
    }

    /// The department whose agents own milestones of this category.
    pub fn department(&self) -> Department {
        match self {
            Self::Operations | Self::Transport | Self::Logistics => Department::Operations,
            Self::Customs => Department::Customs,
            Self::Commercial => Department::Finance,
        }
    }
}

impl std::fmt::Display for MilestoneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneCategory {
    type Err = LgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operations" => Ok(Self::Operations),
            "customs" => Ok(Self::Customs),
            "transport" => Ok(Self::Transport),
            "logistics" => Ok(Self::Logistics),
            "commercial" => Ok(Self::Commercial),
            other => Err(LgxError::UnknownVariant {
                kind: "milestone category",
                value: other.to_string(),
            }),
        }
    }
}

// ─── Department ──────────────────────────────────────────────────────

/// Agent department responsible for a group of milestones.
///
/// Supervisors and administrators see every department; they are roles,
/// not owners, so they do not appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    /// Operations agents.
    Operations,
    /// Customs brokers.
    Customs,
    /// Finance and billing.
    Finance,
}

impl Department {
    /// All departments in canonical order.
    pub fn all() -> &'static [Department] {
        &[Self::Operations, Self::Customs, Self::Finance]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operations => "operations",
            Self::Customs => "customs",
            Self::Finance => "finance",
        }
    }

    /// Categories routed to this department.
    pub fn categories(&self) -> Vec<MilestoneCategory> {
        MilestoneCategory::all()
            .iter()
            .copied()
            .filter(|c| c.department() == *self)
            .collect()
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = LgxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operations" => Ok(Self::Operations),
            "customs" => Ok(Self::Customs),
            "finance" => Ok(Self::Finance),
            other => Err(LgxError::UnknownVariant {
                kind: "department",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_roundtrip() {
        for d in ShipmentDirection::all() {
            assert_eq!(d.as_str().parse::<ShipmentDirection>().unwrap(), *d);
            assert_eq!(serde_json::to_string(d).unwrap(), format!("\"{d}\""));
        }
        assert!("Import".parse::<ShipmentDirection>().is_err());
    }

    #[test]
    fn mode_roundtrip() {
        for m in TransportMode::all() {
            assert_eq!(m.as_str().parse::<TransportMode>().unwrap(), *m);
        }
        assert!("rail".parse::<TransportMode>().is_err());
    }

    #[test]
    fn category_parse_and_serde_agree() {
        for c in MilestoneCategory::all() {
            let json = serde_json::to_string(c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
            assert_eq!(c.as_str().parse::<MilestoneCategory>().unwrap(), *c);
        }
    }

    #[test]
    fn unknown_category_names_the_taxonomy() {
        let err = "billing".parse::<MilestoneCategory>().unwrap_err();
        assert!(err.to_string().contains("milestone category"));
    }

    #[test]
    fn department_routing() {
        assert_eq!(MilestoneCategory::Customs.department(), Department::Customs);
        assert_eq!(MilestoneCategory::Commercial.department(), Department::Finance);
        assert_eq!(MilestoneCategory::Transport.department(), Department::Operations);
        assert_eq!(MilestoneCategory::Logistics.department(), Department::Operations);
        assert_eq!(MilestoneCategory::Operations.department(), Department::Operations);
    }

    #[test]
    fn every_category_has_exactly_one_department() {
        let total: usize = Department::all().iter().map(|d| d.categories().len()).sum();
        assert_eq!(total, MilestoneCategory::all().len());
    }

    #[test]
    fn department_parse_and_serde_agree() {
        for d in Department::all() {
            assert_eq!(d.as_str().parse::<Department>().unwrap(), *d);
            assert_eq!(serde_json::to_string(d).unwrap(), format!("\"{d}\""));
        }
        assert!("supervisor".parse::<Department>().is_err());
    }
}

//! # Milestone Catalogs
//!
//! A catalog answers one question: which milestones, in which order, apply
//! to a shipment of a given direction and transport mode. The tracker never
//! consults a catalog itself; callers fetch definitions and hand them over.
//!
//! ## YAML format
//!
//! ```yaml
//! templates:
//!   - direction: import
//!     mode: air
//!     milestones:
//!       - id: booking_confirmed
//!         category: operations
//!       - id: customs_clearance
//!         category: customs
//!         name_key: milestone.customs_clearance
//!         description_key: milestone.customs_clearance.description
//! ```
//!
//! `name_key` defaults to `milestone.<id>`.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use lgx_core::{MilestoneCategory, MilestoneId, ShipmentDirection, TransportMode};
use lgx_state::MilestoneDefinition;

use crate::error::CatalogError;

/// Source of ordered milestone definitions.
pub trait MilestoneCatalog {
    /// The ordered definitions for a shipment of this direction and mode.
    fn definitions(
        &self,
        direction: ShipmentDirection,
        mode: TransportMode,
    ) -> Result<Vec<MilestoneDefinition>, CatalogError>;

    /// Combinations this catalog has templates for.
    fn templates(&self) -> Vec<(ShipmentDirection, TransportMode)>;
}

impl<C: MilestoneCatalog + ?Sized> MilestoneCatalog for Box<C> {
    fn definitions(
        &self,
        direction: ShipmentDirection,
        mode: TransportMode,
    ) -> Result<Vec<MilestoneDefinition>, CatalogError> {
        (**self).definitions(direction, mode)
    }

    fn templates(&self) -> Vec<(ShipmentDirection, TransportMode)> {
        (**self).templates()
    }
}

/// Default display key for a milestone id.
pub(crate) fn default_name_key(id: &MilestoneId) -> String {
    format!("milestone.{id}")
}

// ─── YAML catalog ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    templates: Vec<TemplateDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateDocument {
    direction: ShipmentDirection,
    mode: TransportMode,
    milestones: Vec<MilestoneEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MilestoneEntry {
    id: MilestoneId,
    category: MilestoneCategory,
    #[serde(default)]
    name_key: Option<String>,
    #[serde(default)]
    description_key: Option<String>,
}

impl From<MilestoneEntry> for MilestoneDefinition {
    fn from(entry: MilestoneEntry) -> Self {
        let name_key = entry
            .name_key
            .unwrap_or_else(|| default_name_key(&entry.id));
        let definition = MilestoneDefinition::new(entry.id, name_key, entry.category);
        match entry.description_key {
            Some(key) => definition.with_description(key),
            None => definition,
        }
    }
}

/// Catalog loaded from a YAML document.
#[derive(Debug, Clone, Default)]
pub struct YamlCatalog {
    templates: BTreeMap<(ShipmentDirection, TransportMode), Vec<MilestoneDefinition>>,
}

impl YamlCatalog {
    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed YAML, an empty template, a
    /// repeated `(direction, mode)` pair, or a repeated milestone id within
    /// one template. Empty ids are rejected during parsing.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        Self::from_document(doc)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: CatalogDocument =
            serde_yaml::from_str(&content).map_err(|source| CatalogError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_document(doc)?;
        tracing::debug!(
            path = %path.display(),
            templates = catalog.templates.len(),
            "loaded milestone catalog"
        );
        Ok(catalog)
    }

    fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        let mut templates = BTreeMap::new();
        for template in doc.templates {
            let (direction, mode) = (template.direction, template.mode);
            if template.milestones.is_empty() {
                return Err(CatalogError::EmptyTemplate { direction, mode });
            }
            let mut seen = HashSet::new();
            for entry in &template.milestones {
                if !seen.insert(entry.id.as_str()) {
                    return Err(CatalogError::DuplicateMilestone {
                        direction,
                        mode,
                        id: entry.id.to_string(),
                    });
                }
            }
            let definitions = template
                .milestones
                .into_iter()
                .map(MilestoneDefinition::from)
                .collect();
            if templates.insert((direction, mode), definitions).is_some() {
                return Err(CatalogError::DuplicateTemplate { direction, mode });
            }
        }
        Ok(Self { templates })
    }
}

impl MilestoneCatalog for YamlCatalog {
    fn definitions(
        &self,
        direction: ShipmentDirection,
        mode: TransportMode,
    ) -> Result<Vec<MilestoneDefinition>, CatalogError> {
        self.templates
            .get(&(direction, mode))
            .cloned()
            .ok_or(CatalogError::MissingTemplate { direction, mode })
    }

    fn templates(&self) -> Vec<(ShipmentDirection, TransportMode)> {
        self.templates.keys().copied().collect()
    }
}

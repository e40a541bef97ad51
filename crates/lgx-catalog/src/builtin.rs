//! Compiled-in milestone templates for the four shipment kinds.

use lgx_core::{MilestoneCategory, MilestoneId, ShipmentDirection, TransportMode};
use lgx_state::MilestoneDefinition;

use crate::catalog::{default_name_key, MilestoneCatalog};
use crate::error::CatalogError;

use MilestoneCategory::{Commercial, Customs, Logistics, Operations, Transport};

type Template = &'static [(&'static str, MilestoneCategory)];

const IMPORT_AIR: Template = &[
    ("order_received", Commercial),
    ("booking_confirmed", Operations),
    ("documents_received", Logistics),
    ("departure_origin_airport", Transport),
    ("arrival_destination_airport", Transport),
    ("customs_declaration_filed", Customs),
    ("customs_inspection", Customs),
    ("customs_clearance", Customs),
    ("duties_paid", Commercial),
    ("warehouse_receipt", Logistics),
    ("final_delivery", Transport),
    ("invoice_issued", Commercial),
];

const IMPORT_SEA: Template = &[
    ("order_received", Commercial),
    ("booking_confirmed", Operations),
    ("documents_received", Logistics),
    ("container_loaded", Logistics),
    ("vessel_departure", Transport),
    ("vessel_arrival", Transport),
    ("container_discharged", Logistics),
    ("customs_declaration_filed", Customs),
    ("customs_inspection", Customs),
    ("customs_clearance", Customs),
    ("duties_paid", Commercial),
    ("container_released", Operations),
    ("final_delivery", Transport),
    ("empty_container_returned", Logistics),
    ("invoice_issued", Commercial),
];

const EXPORT_AIR: Template = &[
    ("order_received", Commercial),
    ("booking_confirmed", Operations),
    ("cargo_pickup", Transport),
    ("warehouse_receipt", Logistics),
    ("export_declaration_filed", Customs),
    ("export_clearance", Customs),
    ("airway_bill_issued", Operations),
    ("departure_origin_airport", Transport),
    ("arrival_destination_airport", Transport),
    ("proof_of_delivery", Logistics),
    ("invoice_issued", Commercial),
];

const EXPORT_SEA: Template = &[
    ("order_received", Commercial),
    ("booking_confirmed", Operations),
    ("empty_container_pickup", Logistics),
    ("container_loaded", Logistics),
    ("cargo_gate_in", Transport),
    ("export_declaration_filed", Customs),
    ("export_clearance", Customs),
    ("bill_of_lading_issued", Operations),
    ("vessel_departure", Transport),
    ("vessel_arrival", Transport),
    ("proof_of_delivery", Logistics),
    ("invoice_issued", Commercial),
];

/// The default catalog shipped with LGX.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    fn template(direction: ShipmentDirection, mode: TransportMode) -> Template {
        match (direction, mode) {
            (ShipmentDirection::Import, TransportMode::Air) => IMPORT_AIR,
            (ShipmentDirection::Import, TransportMode::Sea) => IMPORT_SEA,
            (ShipmentDirection::Export, TransportMode::Air) => EXPORT_AIR,
            (ShipmentDirection::Export, TransportMode::Sea) => EXPORT_SEA,
        }
    }

    /// Every distinct milestone id across all templates, first-seen order.
    pub fn milestone_ids() -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = Vec::new();
        for template in [IMPORT_AIR, IMPORT_SEA, EXPORT_AIR, EXPORT_SEA] {
            for (id, _) in template {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
        ids
    }
}

impl MilestoneCatalog for BuiltinCatalog {
    fn definitions(
        &self,
        direction: ShipmentDirection,
        mode: TransportMode,
    ) -> Result<Vec<MilestoneDefinition>, CatalogError> {
        Self::template(direction, mode)
            .iter()
            .map(|(raw, category)| {
                let id = MilestoneId::new(*raw)?;
                let name_key = default_name_key(&id);
                Ok::<_, CatalogError>(MilestoneDefinition::new(id, name_key, *category))
            })
            .collect()
    }

    fn templates(&self) -> Vec<(ShipmentDirection, TransportMode)> {
        ShipmentDirection::all()
            .iter()
            .flat_map(|d| TransportMode::all().iter().map(move |m| (*d, *m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgx_state::MilestoneSequence;

    #[test]
    fn every_combination_has_a_valid_template() {
        let catalog = BuiltinCatalog;
        assert_eq!(catalog.templates().len(), 4);
        for (direction, mode) in catalog.templates() {
            let defs = catalog.definitions(direction, mode).unwrap();
            assert!(!defs.is_empty());
            MilestoneSequence::from_definitions(defs).unwrap();
        }
    }

    #[test]
    fn import_sea_starts_with_order_and_ends_with_invoice() {
        let defs = BuiltinCatalog
            .definitions(ShipmentDirection::Import, TransportMode::Sea)
            .unwrap();
        assert_eq!(defs.first().unwrap().id.as_str(), "order_received");
        assert_eq!(defs.last().unwrap().id.as_str(), "invoice_issued");
        assert_eq!(defs[0].name_key, "milestone.order_received");
    }

    #[test]
    fn customs_comes_after_arrival_on_imports() {
        let defs = BuiltinCatalog
            .definitions(ShipmentDirection::Import, TransportMode::Air)
            .unwrap();
        let pos = |id: &str| defs.iter().position(|d| d.id.as_str() == id).unwrap();
        assert!(pos("arrival_destination_airport") < pos("customs_clearance"));
    }

    #[test]
    fn every_template_touches_three_departments() {
        use lgx_core::Department;
        for (direction, mode) in BuiltinCatalog.templates() {
            let defs = BuiltinCatalog.definitions(direction, mode).unwrap();
            for dept in Department::all() {
                assert!(
                    defs.iter().any(|d| d.category.department() == *dept),
                    "{direction} {mode} has no {dept} milestone"
                );
            }
        }
    }

    #[test]
    fn milestone_ids_are_distinct() {
        let ids = BuiltinCatalog::milestone_ids();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.contains(&"bill_of_lading_issued"));
    }
}

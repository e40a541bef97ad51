//! # Localisation
//!
//! Display text is looked up through a [`Localizer`] value passed to the
//! renderer. Keys are opaque strings; a missing key renders as the key
//! itself so an incomplete table degrades visibly instead of failing.
//!
//! Key families:
//!
//! | Prefix        | Example                          |
//! |---------------|----------------------------------|
//! | `milestone.`  | `milestone.customs_clearance`    |
//! | `status.`     | `status.completed_locked`        |
//! | `category.`   | `category.transport`             |
//! | `department.` | `department.finance`             |
//! | `label.`      | `label.progress`                 |

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lgx_core::{Department, MilestoneCategory};
use lgx_state::MilestoneStatus;

use crate::error::CatalogError;

// ─── Localizer ───────────────────────────────────────────────────────

/// Key-to-text lookup.
pub trait Localizer {
    /// The text for `key`, if the table has one.
    fn text(&self, key: &str) -> Option<&str>;

    /// The text for `key`, or `key` itself when missing.
    fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.text(key).unwrap_or(key)
    }
}

/// Message key for a derived status, e.g. `status.not_reached`.
pub fn status_key(status: MilestoneStatus) -> String {
    format!("status.{}", status.name().to_ascii_lowercase())
}

/// Message key for a category, e.g. `category.customs`.
pub fn category_key(category: MilestoneCategory) -> String {
    format!("category.{}", category.as_str())
}

/// Message key for a department, e.g. `department.finance`.
pub fn department_key(department: Department) -> String {
    format!("department.{}", department.as_str())
}

// ─── Locale ──────────────────────────────────────────────────────────

/// Languages with a built-in message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Spanish.
    Es,
}

impl Locale {
    /// All built-in locales.
    pub fn all() -> &'static [Locale] {
        &[Self::En, Self::Es]
    }

    /// Returns the lowercase language tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            _ => Err(CatalogError::UnknownLocale(s.to_string())),
        }
    }
}

// ─── Message table ───────────────────────────────────────────────────

/// Flat key-to-text map for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTable {
    /// Language of the table.
    pub locale: Locale,
    /// Key to display text.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

impl MessageTable {
    /// An empty table; every lookup falls back to the key.
    pub fn empty(locale: Locale) -> Self {
        Self {
            locale,
            messages: BTreeMap::new(),
        }
    }

    /// The compiled-in table for `locale`.
    pub fn builtin(locale: Locale) -> Self {
        let entries = match locale {
            Locale::En => EN,
            Locale::Es => ES,
        };
        Self {
            locale,
            messages: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Load a table file and lay it over the built-in table of its locale.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay: MessageTable =
            serde_yaml::from_str(&content).map_err(|source| CatalogError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;
        let mut table = Self::builtin(overlay.locale);
        let overridden = overlay.messages.len();
        table.extend(overlay);
        tracing::debug!(path = %path.display(), locale = %table.locale, overridden, "loaded message table");
        Ok(table)
    }

    /// Add or replace every message of `other`. The locale stays as is.
    pub fn extend(&mut self, other: MessageTable) {
        self.messages.extend(other.messages);
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the table has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Localizer for MessageTable {
    fn text(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

// ─── Built-in tables ─────────────────────────────────────────────────

const EN: &[(&str, &str)] = &[
    ("milestone.order_received", "Order received"),
    ("milestone.booking_confirmed", "Booking confirmed"),
    ("milestone.documents_received", "Documents received"),
    ("milestone.departure_origin_airport", "Departure from origin airport"),
    ("milestone.arrival_destination_airport", "Arrival at destination airport"),
    ("milestone.customs_declaration_filed", "Customs declaration filed"),
    ("milestone.customs_inspection", "Customs inspection"),
    ("milestone.customs_clearance", "Customs clearance"),
    ("milestone.duties_paid", "Duties and taxes paid"),
    ("milestone.warehouse_receipt", "Warehouse receipt"),
    ("milestone.final_delivery", "Final delivery"),
    ("milestone.invoice_issued", "Invoice issued"),
    ("milestone.container_loaded", "Container loaded"),
    ("milestone.vessel_departure", "Vessel departure"),
    ("milestone.vessel_arrival", "Vessel arrival"),
    ("milestone.container_discharged", "Container discharged"),
    ("milestone.container_released", "Container released"),
    ("milestone.empty_container_returned", "Empty container returned"),
    ("milestone.cargo_pickup", "Cargo pickup"),
    ("milestone.export_declaration_filed", "Export declaration filed"),
    ("milestone.export_clearance", "Export clearance"),
    ("milestone.airway_bill_issued", "Air waybill issued"),
    ("milestone.proof_of_delivery", "Proof of delivery"),
    ("milestone.empty_container_pickup", "Empty container pickup"),
    ("milestone.cargo_gate_in", "Cargo gate-in at terminal"),
    ("milestone.bill_of_lading_issued", "Bill of lading issued"),
    ("status.not_reached", "Not reached"),
    ("status.available", "Available"),
    ("status.completed_final", "Completed"),
    ("status.completed_locked", "Completed (locked)"),
    ("status.excluded", "Not applicable"),
    ("category.operations", "Operations"),
    ("category.customs", "Customs"),
    ("category.transport", "Transport"),
    ("category.logistics", "Logistics"),
    ("category.commercial", "Commercial"),
    ("department.operations", "Operations"),
    ("department.customs", "Customs"),
    ("department.finance", "Finance"),
    ("label.progress", "Progress"),
    ("label.next_actionable", "Next step"),
    ("label.nothing_actionable", "Nothing to do"),
    ("label.date", "Date"),
    ("label.details", "Details"),
    ("label.agent", "Agent"),
    ("label.milestone", "Milestone"),
    ("label.status", "Status"),
    ("label.category", "Category"),
    ("label.department", "Department"),
    ("label.pending", "Pending"),
];

const ES: &[(&str, &str)] = &[
    ("milestone.order_received", "Pedido recibido"),
    ("milestone.booking_confirmed", "Reserva confirmada"),
    ("milestone.documents_received", "Documentos recibidos"),
    ("milestone.departure_origin_airport", "Salida del aeropuerto de origen"),
    ("milestone.arrival_destination_airport", "Llegada al aeropuerto de destino"),
    ("milestone.customs_declaration_filed", "Declaración aduanera presentada"),
    ("milestone.customs_inspection", "Inspección aduanera"),
    ("milestone.customs_clearance", "Despacho aduanero"),
    ("milestone.duties_paid", "Aranceles e impuestos pagados"),
    ("milestone.warehouse_receipt", "Recepción en almacén"),
    ("milestone.final_delivery", "Entrega final"),
    ("milestone.invoice_issued", "Factura emitida"),
    ("milestone.container_loaded", "Contenedor cargado"),
    ("milestone.vessel_departure", "Salida del buque"),
    ("milestone.vessel_arrival", "Llegada del buque"),
    ("milestone.container_discharged", "Contenedor descargado"),
    ("milestone.container_released", "Contenedor liberado"),
    ("milestone.empty_container_returned", "Contenedor vacío devuelto"),
    ("milestone.cargo_pickup", "Recogida de la carga"),
    ("milestone.export_declaration_filed", "Declaración de exportación presentada"),
    ("milestone.export_clearance", "Despacho de exportación"),
    ("milestone.airway_bill_issued", "Guía aérea emitida"),
    ("milestone.proof_of_delivery", "Prueba de entrega"),
    ("milestone.empty_container_pickup", "Retiro de contenedor vacío"),
    ("milestone.cargo_gate_in", "Ingreso de la carga a terminal"),
    ("milestone.bill_of_lading_issued", "Conocimiento de embarque emitido"),
    ("status.not_reached", "Pendiente"),
    ("status.available", "Disponible"),
    ("status.completed_final", "Completado"),
    ("status.completed_locked", "Completado (bloqueado)"),
    ("status.excluded", "No aplica"),
    ("category.operations", "Operaciones"),
    ("category.customs", "Aduanas"),
    ("category.transport", "Transporte"),
    ("category.logistics", "Logística"),
    ("category.commercial", "Comercial"),
    ("department.operations", "Operaciones"),
    ("department.customs", "Aduanas"),
    ("department.finance", "Finanzas"),
    ("label.progress", "Progreso"),
    ("label.next_actionable", "Siguiente paso"),
    ("label.nothing_actionable", "Nada pendiente"),
    ("label.date", "Fecha"),
    ("label.details", "Detalles"),
    ("label.agent", "Agente"),
    ("label.milestone", "Hito"),
    ("label.status", "Estado"),
    ("label.category", "Categoría"),
    ("label.department", "Departamento"),
    ("label.pending", "Pendiente"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinCatalog;

    #[test]
    fn missing_keys_resolve_to_themselves() {
        let table = MessageTable::empty(Locale::En);
        assert_eq!(table.text("milestone.unknown"), None);
        assert_eq!(table.resolve("milestone.unknown"), "milestone.unknown");
    }

    #[test]
    fn builtin_tables_cover_the_same_keys() {
        let en = MessageTable::builtin(Locale::En);
        let es = MessageTable::builtin(Locale::Es);
        assert_eq!(
            en.messages.keys().collect::<Vec<_>>(),
            es.messages.keys().collect::<Vec<_>>()
        );
        assert_eq!(en.len(), EN.len());
    }

    #[test]
    fn builtin_tables_name_every_builtin_milestone() {
        for locale in Locale::all() {
            let table = MessageTable::builtin(*locale);
            for id in BuiltinCatalog::milestone_ids() {
                let key = format!("milestone.{id}");
                assert!(table.text(&key).is_some(), "{locale} lacks {key}");
            }
        }
    }

    #[test]
    fn status_category_and_department_keys_resolve() {
        let es = MessageTable::builtin(Locale::Es);
        for status in MilestoneStatus::all() {
            assert!(es.text(&status_key(*status)).is_some());
        }
        for category in MilestoneCategory::all() {
            assert!(es.text(&category_key(*category)).is_some());
        }
        for dept in Department::all() {
            assert!(es.text(&department_key(*dept)).is_some());
        }
        assert_eq!(es.resolve(&status_key(MilestoneStatus::Available)), "Disponible");
    }

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert_eq!(" en ".parse::<Locale>().unwrap(), Locale::En);
        assert!(matches!(
            "fr".parse::<Locale>().unwrap_err(),
            CatalogError::UnknownLocale(_)
        ));
    }

    #[test]
    fn yaml_table_parses() {
        let table: MessageTable =
            serde_yaml::from_str("locale: es\nmessages:\n  milestone.custom: Hito propio\n").unwrap();
        assert_eq!(table.locale, Locale::Es);
        assert_eq!(table.resolve("milestone.custom"), "Hito propio");
    }

    #[test]
    fn load_overlays_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.yaml");
        std::fs::write(
            &path,
            "locale: en\nmessages:\n  milestone.duties_paid: Duties settled\n  milestone.extra: Extra\n",
        )
        .unwrap();
        let table = MessageTable::load(&path).unwrap();
        assert_eq!(table.resolve("milestone.duties_paid"), "Duties settled");
        assert_eq!(table.resolve("milestone.extra"), "Extra");
        assert_eq!(table.resolve("milestone.final_delivery"), "Final delivery");
        assert_eq!(table.len(), EN.len() + 1);
    }
}

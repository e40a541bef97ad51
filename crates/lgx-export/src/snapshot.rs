//! # Snapshots
//!
//! A [`Snapshot`] is a read-only, localized copy of a milestone sequence at
//! one instant. Rows carry the resolved display name next to the raw id and
//! the derived status, so a consumer needs neither the catalog nor the
//! state crate to interpret an export.

use serde::{Deserialize, Serialize};

use lgx_catalog::Localizer;
use lgx_core::{
    sha256_digest, CanonicalBytes, ContentDigest, Department, MilestoneCategory, MilestoneId,
    ShipmentRef, Timestamp,
};
use lgx_state::{compute_row_state, progress, MilestoneSequence, MilestoneStatus, Progress};

use crate::error::ExportError;

/// Text formats a snapshot can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON document.
    Json,
    /// YAML document.
    Yaml,
    /// One header record plus one record per milestone.
    Csv,
}

impl ExportFormat {
    /// Returns the lowercase format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// One milestone in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// 1-based position in the sequence.
    pub position: usize,
    pub id: MilestoneId,
    /// Localized display name.
    pub name: String,
    pub category: MilestoneCategory,
    pub department: Department,
    pub selected: bool,
    pub completed: bool,
    pub status: MilestoneStatus,
    pub date: Option<String>,
    pub details: Option<String>,
    pub agent: Option<String>,
}

/// Localized copy of a shipment's milestones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub shipment: ShipmentRef,
    pub exported_at: Timestamp,
    pub progress: Progress,
    pub rows: Vec<SnapshotRow>,
}

/// Digest input: the snapshot minus its capture time.
#[derive(Serialize)]
struct SnapshotContent<'a> {
    shipment: &'a ShipmentRef,
    progress: &'a Progress,
    rows: &'a [SnapshotRow],
}

const CSV_HEADER: [&str; 11] = [
    "position",
    "id",
    "name",
    "category",
    "department",
    "selected",
    "completed",
    "status",
    "date",
    "details",
    "agent",
];

impl Snapshot {
    /// Capture the current state of `sequence`, resolving names through
    /// `localizer`.
    pub fn capture(
        shipment: &ShipmentRef,
        sequence: &MilestoneSequence,
        localizer: &dyn Localizer,
    ) -> Self {
        let rows = sequence
            .iter()
            .enumerate()
            .map(|(index, m)| {
                let status = compute_row_state(sequence, &m.id)
                    .map_or(MilestoneStatus::Excluded, |rs| rs.status(m.selected));
                SnapshotRow {
                    position: index + 1,
                    id: m.id.clone(),
                    name: localizer.resolve(&m.name_key).to_string(),
                    category: m.category,
                    department: m.category.department(),
                    selected: m.selected,
                    completed: m.completed,
                    status,
                    date: m.date.clone(),
                    details: m.details.clone(),
                    agent: m.agent_name.clone(),
                }
            })
            .collect();
        Self {
            shipment: shipment.clone(),
            exported_at: Timestamp::now(),
            progress: progress(sequence),
            rows,
        }
    }

    /// SHA-256 over the canonical bytes of everything but `exported_at`.
    pub fn content_digest(&self) -> Result<ContentDigest, ExportError> {
        let content = SnapshotContent {
            shipment: &self.shipment,
            progress: &self.progress,
            rows: &self.rows,
        };
        Ok(sha256_digest(&CanonicalBytes::new(&content)?))
    }

    /// RFC 4180 text: header record first, CRLF terminators, fields quoted
    /// only when they contain a delimiter, quote or line break.
    fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for row in &self.rows {
            writer.write_record([
                row.position.to_string(),
                row.id.to_string(),
                row.name.clone(),
                row.category.to_string(),
                row.department.to_string(),
                row.selected.to_string(),
                row.completed.to_string(),
                row.status.to_string(),
                row.date.clone().unwrap_or_default(),
                row.details.clone().unwrap_or_default(),
                row.agent.clone().unwrap_or_default(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Render `snapshot` in `format`.
pub fn render(snapshot: &Snapshot, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => {
            let mut text = serde_json::to_string_pretty(snapshot)?;
            text.push('\n');
            Ok(text)
        }
        ExportFormat::Yaml => Ok(serde_yaml::to_string(snapshot)?),
        ExportFormat::Csv => snapshot.to_csv(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgx_catalog::{BuiltinCatalog, Locale, MessageTable, MilestoneCatalog};
    use lgx_core::{ShipmentDirection, TransportMode};
    use lgx_state::MilestoneTracker;
    use proptest::prelude::*;

    fn tracker() -> MilestoneTracker {
        let defs = BuiltinCatalog
            .definitions(ShipmentDirection::Import, TransportMode::Air)
            .unwrap();
        let mut t = MilestoneTracker::from_definitions(defs).unwrap();
        for id in ["order_received", "booking_confirmed", "documents_received"] {
            t.toggle_selected(&MilestoneId::new(id).unwrap()).unwrap();
        }
        t.complete(&MilestoneId::new("order_received").unwrap()).unwrap();
        t.set_details(
            &MilestoneId::new("booking_confirmed").unwrap(),
            "Carrier \"AeroCargo\", flight 812",
        )
        .unwrap();
        t
    }

    fn shipment() -> ShipmentRef {
        ShipmentRef::new("SHP-2024-001").unwrap()
    }

    #[test]
    fn capture_localizes_and_derives_status() {
        let t = tracker();
        let snap = Snapshot::capture(&shipment(), t.sequence(), &MessageTable::builtin(Locale::Es));
        assert_eq!(snap.rows.len(), t.sequence().len());
        let first = &snap.rows[0];
        assert_eq!(first.position, 1);
        assert_eq!(first.name, "Pedido recibido");
        assert_eq!(first.status, MilestoneStatus::CompletedFinal);
        assert_eq!(first.department, Department::Finance);
        assert_eq!(snap.rows[1].status, MilestoneStatus::Available);
        assert_eq!(snap.rows[2].status, MilestoneStatus::NotReached);
        assert_eq!(snap.rows[3].status, MilestoneStatus::Excluded);
        assert_eq!(snap.progress.completed_count, 1);
        assert_eq!(snap.progress.selected_count, 3);
    }

    #[test]
    fn missing_translation_falls_back_to_key() {
        let t = tracker();
        let snap = Snapshot::capture(&shipment(), t.sequence(), &MessageTable::empty(Locale::En));
        assert_eq!(snap.rows[0].name, "milestone.order_received");
    }

    #[test]
    fn digest_ignores_capture_time() {
        let t = tracker();
        let table = MessageTable::builtin(Locale::En);
        let a = Snapshot::capture(&shipment(), t.sequence(), &table);
        let mut b = a.clone();
        b.exported_at = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(a.content_digest().unwrap(), b.content_digest().unwrap());

        b.rows[1].details = None;
        assert_ne!(a.content_digest().unwrap(), b.content_digest().unwrap());
    }

    #[test]
    fn json_export_is_parseable() {
        let t = tracker();
        let snap = Snapshot::capture(&shipment(), t.sequence(), &MessageTable::builtin(Locale::En));
        let text = render(&snap, ExportFormat::Json).unwrap();
        let back: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snap);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rows"][0]["status"], "COMPLETED_FINAL");
        assert_eq!(value["shipment"], "SHP-2024-001");
    }

    #[test]
    fn yaml_export_mentions_rows() {
        let t = tracker();
        let snap = Snapshot::capture(&shipment(), t.sequence(), &MessageTable::builtin(Locale::En));
        let text = render(&snap, ExportFormat::Yaml).unwrap();
        assert!(text.contains("order_received"));
        assert!(text.contains("COMPLETED_FINAL"));
    }

    fn read_csv(text: &str) -> Vec<csv::StringRecord> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn csv_export_quotes_details() {
        let t = tracker();
        let snap = Snapshot::capture(&shipment(), t.sequence(), &MessageTable::builtin(Locale::En));
        let text = render(&snap, ExportFormat::Csv).unwrap();
        let records = read_csv(&text);
        assert_eq!(records.len(), snap.rows.len() + 1);
        assert_eq!(records[0].iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());
        assert_eq!(&records[2][1], "booking_confirmed");
        assert_eq!(&records[2][9], "Carrier \"AeroCargo\", flight 812");
        assert!(text.contains("\"Carrier \"\"AeroCargo\"\", flight 812\""));
        assert!(text.contains("\r\n2,booking_confirmed,"));
        assert!(text.ends_with("\r\n"));
    }

    proptest! {
        /// Free-text details come back unchanged whatever punctuation they hold.
        #[test]
        fn csv_details_survive_quoting(details in "[a-z][a-z ,\"\n]{0,24}") {
            let mut t = tracker();
            t.set_details(&MilestoneId::new("booking_confirmed").unwrap(), details.as_str()).unwrap();
            let snap = Snapshot::capture(&shipment(), t.sequence(), &MessageTable::builtin(Locale::En));
            let records = read_csv(&render(&snap, ExportFormat::Csv).unwrap());
            let stored = snap.rows[1].details.clone().unwrap_or_default();
            prop_assert_eq!(&records[2][9], stored.as_str());
        }
    }

    #[test]
    fn format_parses() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("yml".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!(matches!(
            "pdf".parse::<ExportFormat>().unwrap_err(),
            ExportError::UnknownFormat(_)
        ));
    }
}

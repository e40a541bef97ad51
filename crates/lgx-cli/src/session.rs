//! # Session Files
//!
//! One JSON file per shipment under the state directory:
//!
//! ```json
//! {
//!   "id": "1b4e28ba-2fa1-41d2-883f-0016d3cca427",
//!   "shipment": "SHP-1",
//!   "direction": "import",
//!   "mode": "sea",
//!   "created_at": "2024-05-01T09:30:00Z",
//!   "updated_at": "2024-05-02T14:05:11Z",
//!   "sequence": [ { "id": "order_received", "selected": true, "completed": true, ... } ],
//!   "transition_log": [ { "milestone_id": "order_received", "action": "COMPLETED", ... } ]
//! }
//! ```
//!
//! Loading re-checks prefix closure, so a hand-edited file that breaks the
//! ordering rule is refused instead of silently repaired.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use lgx_core::{ShipmentDirection, ShipmentId, ShipmentRef, Timestamp, TransportMode};
use lgx_state::{MilestoneSequence, MilestoneTracker, TransitionRecord};

/// Persisted state of one shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Record id, fixed at `init`.
    pub id: ShipmentId,
    pub shipment: ShipmentRef,
    pub direction: ShipmentDirection,
    pub mode: TransportMode,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub sequence: MilestoneSequence,
    #[serde(default)]
    pub transition_log: Vec<TransitionRecord>,
}

impl Session {
    /// A new session holding the tracker's current state.
    pub fn new(
        shipment: ShipmentRef,
        direction: ShipmentDirection,
        mode: TransportMode,
        tracker: MilestoneTracker,
    ) -> Self {
        let now = Timestamp::now();
        let (sequence, transition_log) = tracker.into_parts();
        Self {
            id: ShipmentId::new(),
            shipment,
            direction,
            mode,
            created_at: now,
            updated_at: now,
            sequence,
            transition_log,
        }
    }

    /// A tracker over a copy of this session's sequence and log.
    pub fn tracker(&self) -> Result<MilestoneTracker> {
        MilestoneTracker::restore(self.sequence.clone(), self.transition_log.clone())
            .with_context(|| format!("session {} is inconsistent", self.shipment))
    }

    /// Take over the tracker's state and bump `updated_at`.
    pub fn absorb(&mut self, tracker: MilestoneTracker) {
        let (sequence, transition_log) = tracker.into_parts();
        self.sequence = sequence;
        self.transition_log = transition_log;
        self.updated_at = Timestamp::now();
    }
}

/// Directory of session files.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `shipment`.
    pub fn path_for(&self, shipment: &ShipmentRef) -> PathBuf {
        self.dir.join(format!("{shipment}.json"))
    }

    pub fn exists(&self, shipment: &ShipmentRef) -> bool {
        self.path_for(shipment).is_file()
    }

    /// Write a brand-new session. Fails if one already exists.
    pub fn create(&self, session: &Session) -> Result<()> {
        if self.exists(&session.shipment) {
            bail!("shipment already exists: {}", session.shipment);
        }
        self.save(session)
    }

    /// Read and validate a session.
    pub fn load(&self, shipment: &ShipmentRef) -> Result<Session> {
        let path = self.path_for(shipment);
        if !path.is_file() {
            bail!("shipment not found: {shipment} (no session at {})", path.display());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let session: Session = serde_json::from_str(&content)
            .with_context(|| format!("invalid session file {}", path.display()))?;
        if &session.shipment != shipment {
            bail!(
                "session file {} belongs to shipment {}",
                path.display(),
                session.shipment
            );
        }
        session
            .sequence
            .check_prefix_closed()
            .with_context(|| format!("session {shipment} is inconsistent"))?;
        Ok(session)
    }

    /// Overwrite the session file.
    pub fn save(&self, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create state directory {}", self.dir.display()))?;
        let path = self.path_for(&session.shipment);
        let mut json = serde_json::to_string_pretty(session)?;
        json.push('\n');
        std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "session written");
        Ok(())
    }

    /// Every readable session, sorted by shipment. Unreadable files are
    /// skipped with a warning.
    pub fn list(&self) -> Result<Vec<Session>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut sessions = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list {}", self.dir.display()))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| Ok(serde_json::from_str::<Session>(&content)?));
            match parsed {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable session"),
            }
        }
        sessions.sort_by(|a, b| a.shipment.cmp(&b.shipment));
        Ok(sessions)
    }
}

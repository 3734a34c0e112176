//! Case records
//!
//! A [`Record`] is a [`RecordState`] plus its history. History entries are
//! themselves `RecordState` values, which have no history field, so a
//! snapshot can never contain nested snapshots.

use crate::entropy::{hash_token, Entropy};
use crate::types::{
    Decision, Industry, Layer, Pattern, Priority, RecordId, RecordKind, Severity, Status,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Policy version stamped into every record's business data
pub const POLICY_VERSION: &str = "v3.3.1";

/// One line of a record's audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub agent: Option<String>,
    pub pattern: Option<Pattern>,
}

impl LogEntry {
    /// Create an unattributed entry stamped now
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            severity,
            agent: None,
            pattern: None,
        }
    }

    /// Attribute the entry to an acting agent
    #[must_use]
    pub fn by(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Tag the entry with a pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Pattern-tagged token appended to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEntry {
    pub step: Pattern,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-record audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: Uuid,
    pub record_id: RecordId,
    /// Bill of materials, fixed at creation
    pub bom: IndexMap<String, String>,
    /// Append-only between rollbacks
    pub hashes: Vec<HashEntry>,
}

impl Manifest {
    /// Manifest with the standard bill of materials and no hashes
    #[must_use]
    pub fn sealed_for(id: Uuid, record_id: RecordId) -> Self {
        let bom = [
            ("policy_engine", "OPA v0.61"),
            ("ai_model", "Gemini 1.5 Pro"),
            ("orchestrator", "Temporal v1.24"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            id,
            record_id,
            bom,
            hashes: Vec::new(),
        }
    }
}

/// Business payload
///
/// The common fields are typed; industry-specific ones live in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessData {
    pub amount: i64,
    pub confidence: f64,
    pub pii_redacted: bool,
    pub policy_version: String,
    pub ai_proposal: Option<String>,
    pub decision: Option<Decision>,
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,
}

impl BusinessData {
    #[must_use]
    pub fn new(amount: i64) -> Self {
        Self {
            amount,
            confidence: 0.0,
            pii_redacted: false,
            policy_version: POLICY_VERSION.to_string(),
            ai_proposal: None,
            decision: None,
            fields: IndexMap::new(),
        }
    }

    /// Append an industry-specific field
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Every field of a record except its history.
///
/// Also the snapshot type stored in [`Record::history`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordState {
    pub id: RecordId,
    pub kind: RecordKind,
    pub industry: Industry,
    /// Descriptive label, e.g. "Invoice Reconciliation Gap"
    #[serde(rename = "type")]
    pub case_type: String,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub layer: Layer,
    pub priority: Priority,
    pub tenant_id: String,
    pub source_system: String,
    /// Acting entity of the latest transition
    pub agent: Option<String>,
    #[serde(rename = "data")]
    pub business: BusinessData,
    pub manifest: Manifest,
    pub active_pattern: Option<Pattern>,
    pub logs: Vec<LogEntry>,
}

/// Snapshot of a record captured before a transition
pub type Snapshot = RecordState;

impl RecordState {
    /// Move to `status`, keeping `layer` in lockstep
    #[inline]
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.layer = status.layer();
    }

    /// Append a log entry; pattern-tagged entries also extend the manifest
    pub fn append_log<E: Entropy + ?Sized>(&mut self, entry: LogEntry, entropy: &mut E) {
        if let Some(step) = entry.pattern {
            self.manifest.hashes.push(HashEntry {
                step,
                hash: hash_token(entropy),
                timestamp: entry.timestamp,
            });
        }
        self.logs.push(entry);
    }
}

/// A case record with its snapshot history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub state: RecordState,
    pub history: Vec<Snapshot>,
}

impl Record {
    /// Fresh record with empty history
    #[must_use]
    pub fn new(state: RecordState) -> Self {
        Self {
            state,
            history: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.state.id
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        self.state.status
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.state.layer
    }

    #[inline]
    #[must_use]
    pub fn decision(&self) -> Option<Decision> {
        self.state.business.decision
    }

    /// Copy of every field except history
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blank_state(rng: &mut StdRng) -> RecordState {
        let id = RecordId::generate(rng);
        RecordState {
            id,
            kind: RecordKind::Exception,
            industry: Industry::Finance,
            case_type: "Month-End Close Delay".to_string(),
            created_at: Utc::now(),
            status: Status::Detect,
            layer: Layer::Sources,
            priority: Priority::Medium,
            tenant_id: "tenant".to_string(),
            source_system: "Coupa".to_string(),
            agent: None,
            business: BusinessData::new(1200).with_field("invoice_id", "INV-1"),
            manifest: Manifest::sealed_for(Uuid::nil(), id),
            active_pattern: None,
            logs: Vec::new(),
        }
    }

    #[test]
    fn tagged_logs_extend_manifest() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = blank_state(&mut rng);

        state.append_log(LogEntry::new(Severity::Info, "untagged"), &mut rng);
        assert_eq!(state.logs.len(), 1);
        assert!(state.manifest.hashes.is_empty());

        let tagged = LogEntry::new(Severity::System, "tagged")
            .by("Ingestion Bot")
            .with_pattern(Pattern::P1);
        state.append_log(tagged, &mut rng);
        assert_eq!(state.logs.len(), 2);
        assert_eq!(state.manifest.hashes.len(), 1);
        assert_eq!(state.manifest.hashes[0].step, Pattern::P1);
        assert_eq!(state.manifest.hashes[0].timestamp, state.logs[1].timestamp);
    }

    #[test]
    fn set_status_moves_layer() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut state = blank_state(&mut rng);
        state.set_status(Status::ManualHold);
        assert_eq!(state.layer, Layer::Orchestration);
    }

    #[test]
    fn bom_is_fixed() {
        let manifest = Manifest::sealed_for(Uuid::nil(), RecordId(Uuid::nil()));
        let keys: Vec<_> = manifest.bom.keys().map(String::as_str).collect();
        assert_eq!(keys, ["policy_engine", "ai_model", "orchestrator"]);
        assert_eq!(manifest.bom["ai_model"], "Gemini 1.5 Pro");
    }

    #[test]
    fn record_json_has_flattened_state_and_history() {
        let mut rng = StdRng::seed_from_u64(13);
        let record = Record::new(blank_state(&mut rng));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "DETECT");
        assert_eq!(json["layer"], "L0: Sources");
        assert_eq!(json["type"], "Month-End Close Delay");
        assert_eq!(json["data"]["invoice_id"], "INV-1");
        assert_eq!(json["data"]["amount"], 1200);
        assert!(json["history"].as_array().unwrap().is_empty());
    }
}

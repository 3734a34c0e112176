//! Pipeline vocabulary
//!
//! Identifiers and the closed enumerations a record is described with:
//! industries, lifecycle statuses, pipeline layers, priorities, patterns,
//! log severities and decisions.

use crate::entropy::{uuid_v4, Entropy};
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Draw a fresh id
    #[must_use]
    pub fn generate<E: Entropy + ?Sized>(entropy: &mut E) -> Self {
        Self(uuid_v4(entropy))
    }

    /// First segment of the hyphenated form
    #[must_use]
    pub fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(8);
        simple
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ParseError::new("record id", s))
    }
}

/// Industry vertical a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Industry {
    Insurance,
    Manufacturing,
    Healthcare,
    Finance,
    Retail,
}

impl Industry {
    /// Every industry, in display order
    pub const ALL: [Industry; 5] = [
        Industry::Insurance,
        Industry::Manufacturing,
        Industry::Healthcare,
        Industry::Finance,
        Industry::Retail,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Industry::Insurance => "Insurance",
            Industry::Manufacturing => "Manufacturing",
            Industry::Healthcare => "Healthcare",
            Industry::Finance => "Finance",
            Industry::Retail => "Retail",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|industry| industry.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("industry", s))
    }
}

/// Which factory produced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Pre-dispute signal picked up by the radar
    Signal,
    /// Full case running through the pipeline
    Exception,
}

/// Lifecycle state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    PreDispute,
    Detect,
    Perceive,
    Reason,
    Decide,
    Act,
    Assure,
    Completed,
    ManualHold,
}

impl Status {
    /// Every status, in lifecycle order
    pub const ALL: [Status; 9] = [
        Status::PreDispute,
        Status::Detect,
        Status::Perceive,
        Status::Reason,
        Status::Decide,
        Status::Act,
        Status::Assure,
        Status::Completed,
        Status::ManualHold,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::PreDispute => "PRE_DISPUTE",
            Status::Detect => "DETECT",
            Status::Perceive => "PERCEIVE",
            Status::Reason => "REASON",
            Status::Decide => "DECIDE",
            Status::Act => "ACT",
            Status::Assure => "ASSURE",
            Status::Completed => "COMPLETED",
            Status::ManualHold => "MANUAL_HOLD",
        }
    }

    /// The pipeline layer a record in this status sits in.
    ///
    /// `Completed` reuses the sources label as the archive slot.
    #[must_use]
    pub const fn layer(self) -> Layer {
        match self {
            Status::PreDispute => Layer::PreDisputeRadar,
            Status::Detect | Status::Completed => Layer::Sources,
            Status::Perceive => Layer::Ingestion,
            Status::Reason => Layer::CognitivePlane,
            Status::Decide => Layer::ControlPlane,
            Status::Act => Layer::Connectivity,
            Status::Assure => Layer::Assurance,
            Status::ManualHold => Layer::Orchestration,
        }
    }

    /// Terminal records are eligible for pruning
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Status::Completed)
    }

    /// Counted as resolved by the statistics
    #[inline]
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Status::Completed | Status::Act | Status::Assure)
    }

    /// Whether the orchestration loop keeps advancing records in this status
    #[inline]
    #[must_use]
    pub const fn auto_advances(self) -> bool {
        !matches!(self, Status::Completed | Status::ManualHold)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("status", s))
    }
}

/// Cosmetic pipeline stage label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "L-1: Pre-Dispute Radar")]
    PreDisputeRadar,
    #[serde(rename = "L0: Sources")]
    Sources,
    #[serde(rename = "L1: Ingestion")]
    Ingestion,
    #[serde(rename = "L1.5: Data Minimization")]
    DataMinimization,
    #[serde(rename = "L2: Orchestration")]
    Orchestration,
    #[serde(rename = "L3.a: Cognitive Plane")]
    CognitivePlane,
    #[serde(rename = "L3.b: Control Plane")]
    ControlPlane,
    #[serde(rename = "L6: Connectivity")]
    Connectivity,
    #[serde(rename = "L5: Assurance")]
    Assurance,
}

impl Layer {
    /// Every layer, in pipeline order
    pub const ALL: [Layer; 9] = [
        Layer::PreDisputeRadar,
        Layer::Sources,
        Layer::Ingestion,
        Layer::DataMinimization,
        Layer::Orchestration,
        Layer::CognitivePlane,
        Layer::ControlPlane,
        Layer::Connectivity,
        Layer::Assurance,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Layer::PreDisputeRadar => "L-1: Pre-Dispute Radar",
            Layer::Sources => "L0: Sources",
            Layer::Ingestion => "L1: Ingestion",
            Layer::DataMinimization => "L1.5: Data Minimization",
            Layer::Orchestration => "L2: Orchestration",
            Layer::CognitivePlane => "L3.a: Cognitive Plane",
            Layer::ControlPlane => "L3.b: Control Plane",
            Layer::Connectivity => "L6: Connectivity",
            Layer::Assurance => "L5: Assurance",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case priority, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Priority::Low, Priority::Medium, Priority::High]
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("priority", s))
    }
}

/// Pipeline technique referenced by log and manifest entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
    P9,
    P10,
}

impl Pattern {
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Pattern::P1 => "P1",
            Pattern::P2 => "P2",
            Pattern::P3 => "P3",
            Pattern::P4 => "P4",
            Pattern::P5 => "P5",
            Pattern::P6 => "P6",
            Pattern::P7 => "P7",
            Pattern::P8 => "P8",
            Pattern::P9 => "P9",
            Pattern::P10 => "P10",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Pattern::P1 => "Ingest",
            Pattern::P2 => "Secure",
            Pattern::P3 => "Context",
            Pattern::P4 => "Match",
            Pattern::P5 => "Synthesize",
            Pattern::P6 => "Policy",
            Pattern::P7 => "Decide",
            Pattern::P8 => "Sign",
            Pattern::P9 => "Act",
            Pattern::P10 => "Audit",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Pattern::P1 => "Normalize & Validate",
            Pattern::P2 => "Redact & Tokenize",
            Pattern::P3 => "Enrich & Retrieve",
            Pattern::P4 => "Fuzzy Logic & Rules",
            Pattern::P5 => "GenAI Reasoning",
            Pattern::P6 => "OPA Guardrails",
            Pattern::P7 => "Deterministic Choice",
            Pattern::P8 => "Crypto Manifest",
            Pattern::P9 => "Write-Back",
            Pattern::P10 => "Immutable Log",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id(), self.name())
    }
}

/// Severity tag on a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    System,
    Warning,
    Security,
    Ai,
    Control,
    Success,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::System => "system",
            Severity::Warning => "warning",
            Severity::Security => "security",
            Severity::Ai => "ai",
            Severity::Control => "control",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome written into a record's business data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "APPROVED (AUTO)")]
    ApprovedAuto,
    #[serde(rename = "APPROVED (MANUAL)")]
    ApprovedManual,
    #[serde(rename = "MANUAL_REVIEW")]
    ManualReview,
    #[serde(rename = "REJECTED (MANUAL)")]
    RejectedManual,
    #[serde(rename = "AVOIDED_UPSTREAM")]
    AvoidedUpstream,
}

/// How a decision is costed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionClass {
    Automated,
    Manual,
    Avoided,
}

impl Decision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Approved => "APPROVED",
            Decision::ApprovedAuto => "APPROVED (AUTO)",
            Decision::ApprovedManual => "APPROVED (MANUAL)",
            Decision::ManualReview => "MANUAL_REVIEW",
            Decision::RejectedManual => "REJECTED (MANUAL)",
            Decision::AvoidedUpstream => "AVOIDED_UPSTREAM",
        }
    }

    #[must_use]
    pub const fn class(self) -> DecisionClass {
        match self {
            Decision::Approved | Decision::ApprovedAuto => DecisionClass::Automated,
            Decision::ManualReview | Decision::ApprovedManual | Decision::RejectedManual => {
                DecisionClass::Manual
            }
            Decision::AvoidedUpstream => DecisionClass::Avoided,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Error types for ADR Core
//!
//! Domain operations (advance, rollback, statistics) are total and never
//! fail. Errors only arise at the edges: parsing user input, loading
//! configuration, and checking a transition against the table.

use crate::types::Status;
use std::path::PathBuf;

/// Unrecognised textual value for one of the closed enumerations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseError {
    /// What was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl ParseError {
    #[inline]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A probability lies outside `[0, 1]`
    #[error("{field} must be within [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    /// Tick interval of zero
    #[error("tick interval must be greater than zero")]
    InvalidInterval,
}

/// Transition outside the advancement table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("illegal transition {from} -> {to}")]
    Illegal { from: Status, to: Status },
}

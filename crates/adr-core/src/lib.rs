//! ADR Core - mock dispute pipeline
//!
//! Client-side simulation of an autonomous dispute resolution pipeline:
//! - Record Factory: randomized signal and exception records
//! - State Machine: one-step advancement with policy and kill-switch branching
//! - History: snapshot-before-mutate and rollback
//! - Statistics: cost, time and automation figures
//!
//! All operations are pure functions returning new values. Randomness is
//! injected through [`Entropy`], so a seeded RNG makes runs reproducible.
//!
//! # Example
//!
//! ```rust
//! use adr_core::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let policy = PolicyConfig::new(10_000);
//!
//! let mut record = create_exception(Industry::Finance, None, &mut rng);
//! record.state.business.amount = 3_000;
//! while record.status().auto_advances() {
//!     record = advance(&record, false, &policy, &mut rng);
//! }
//! assert_eq!(record.status(), Status::Completed);
//! assert_eq!(record.history.len(), 6);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod entropy;
pub mod error;
pub mod factory;
pub mod history;
pub mod record;
pub mod state_machine;
pub mod stats;
pub mod types;
pub mod view;

pub use config::{PolicyConfig, RiskLevel, SimulationConfig};
pub use entropy::Entropy;
pub use error::{ConfigError, ParseError, TransitionError};
pub use factory::{create_exception, create_signal};
pub use history::{rollback, rollback_signed};
pub use record::{BusinessData, HashEntry, LogEntry, Manifest, Record, RecordState, Snapshot};
pub use state_machine::{advance, approve, reject, successors, validate_transition};
pub use stats::{calculate_stats, Stats};
pub use types::{
    Decision, DecisionClass, Industry, Layer, Pattern, Priority, RecordId, RecordKind, Severity,
    Status,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ADR Core
    pub use crate::{
        advance, approve, calculate_stats, create_exception, create_signal, reject, rollback,
        Decision, Entropy, Industry, Layer, PolicyConfig, Priority, Record, RecordId, Stats,
        Status,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

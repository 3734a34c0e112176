//! ADR Simulator - seeded batch runs of the orchestration loop
//!
//! Drives a [`Session`] tick by tick without a timer, plays a simple
//! operator that works the manual review queue, and checks pipeline
//! invariants after every change:
//! - Each advance appends exactly one snapshot equal to the prior state
//! - Manifest hashes never shrink across an advance
//! - Layer always matches status
//! - Every status change is a legal transition
//! - Rollback truncates history to the restored index

use crate::session::{Intent, Session};
use adr_core::view::{counts, group_by_layer, group_by_status, manual_review_queue};
use adr_core::{
    validate_transition, Entropy, Industry, Layer, Record, RecordId, SimulationConfig, Stats,
    Status,
};
use im::Vector;
use indexmap::IndexMap;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

/// Per-tick chance the operator decides one held case
pub const OPERATOR_PROBABILITY: f64 = 0.2;
/// Share of operator decisions that approve
pub const OPERATOR_APPROVAL_RATE: f64 = 0.7;
/// Per-tick chance the operator rolls a record back
pub const ROLLBACK_PROBABILITY: f64 = 0.02;

/// Simulator configuration
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub ticks: u64,
    /// Exceptions spawned before the first tick
    pub initial_exceptions: usize,
    pub stop_on_first_violation: bool,
    pub simulation: SimulationConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1000,
            initial_exceptions: 10,
            stop_on_first_violation: false,
            simulation: SimulationConfig::default(),
        }
    }
}

/// A violation detected during simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// History did not grow by exactly one entry
    HistoryLength {
        tick: u64,
        record: RecordId,
        before: usize,
        after: usize,
    },
    /// Newest snapshot differs from the state before the advance
    SnapshotMismatch { tick: u64, record: RecordId },
    /// Manifest lost hash entries
    ManifestShrank {
        tick: u64,
        record: RecordId,
        before: usize,
        after: usize,
    },
    LayerMismatch {
        tick: u64,
        record: RecordId,
        status: Status,
        layer: Layer,
    },
    IllegalTransition {
        tick: u64,
        record: RecordId,
        from: Status,
        to: Status,
    },
    /// Rollback left the wrong history length or status
    RollbackMismatch {
        tick: u64,
        record: RecordId,
        step: usize,
    },
}

/// Statistics for simulation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulatorStats {
    pub ticks_run: u64,
    pub spawned: u64,
    pub advanced: u64,
    pub pruned: u64,
    pub approved: u64,
    pub rejected: u64,
    pub rolled_back: u64,
}

/// Final report from simulator
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: SimulatorStats,
    pub pipeline: Stats,
    pub by_status: IndexMap<Status, usize>,
    pub by_layer: IndexMap<Layer, usize>,
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    /// Check if simulation passed all criteria
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        let _ = writeln!(report, "=== ADR Simulator Report ===\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Ticks Run: {}", self.stats.ticks_run);
        let _ = writeln!(
            report,
            "Approval Threshold: {}",
            self.config.simulation.policy.approval_threshold
        );
        let _ = writeln!(report, "Kill Switch: {}", self.config.simulation.kill_switch);
        let _ = writeln!(report, "Spawned: {}", self.stats.spawned);
        let _ = writeln!(report, "Advanced: {}", self.stats.advanced);
        let _ = writeln!(report, "Pruned: {}", self.stats.pruned);
        let _ = writeln!(report, "Approved (manual): {}", self.stats.approved);
        let _ = writeln!(report, "Rejected (manual): {}", self.stats.rejected);
        let _ = writeln!(report, "Rolled Back: {}", self.stats.rolled_back);

        let _ = writeln!(report, "\n=== Pipeline ===");
        let _ = writeln!(report, "Total Volume: {}", self.pipeline.total_volume);
        let _ = writeln!(report, "Resolved: {}", self.pipeline.resolved_count);
        let _ = writeln!(report, "Avoided Upstream: {}", self.pipeline.avoided_count);
        let _ = writeln!(report, "Automation Rate: {}%", self.pipeline.automation_rate);
        let _ = writeln!(report, "Cost Savings: ${}", self.pipeline.cost_savings);
        let _ = writeln!(report, "Time Saved: {:.1}h", self.pipeline.time_saved_hours);

        let _ = writeln!(report, "\n=== By Status ===");
        for (status, count) in &self.by_status {
            let _ = writeln!(report, "{status}: {count}");
        }
        let _ = writeln!(report, "\n=== By Layer ===");
        for (layer, count) in &self.by_layer {
            let _ = writeln!(report, "{}: {count}", layer.label());
        }

        let _ = writeln!(report, "\nViolations: {}", self.violations.len());
        if !self.violations.is_empty() {
            let _ = writeln!(report, "\n=== Violations ===");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {:?}", i + 1, v);
            }
        }

        let _ = writeln!(
            report,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Run the ADR Simulator
#[must_use]
pub fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut session = Session::new(config.simulation.clone());
    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();

    for i in 0..config.initial_exceptions {
        let industry = Industry::ALL[i % Industry::ALL.len()];
        session.apply(
            Intent::Spawn {
                industry,
                priority: None,
            },
            &mut rng,
        );
        stats.spawned += 1;
    }

    for _ in 0..config.ticks {
        let before = session.records().clone();
        let report = session.tick(&mut rng);
        stats.ticks_run += 1;
        stats.advanced += report.advanced.len() as u64;
        stats.pruned += report.pruned.len() as u64;
        stats.spawned += u64::from(report.spawned.is_some());

        for id in &report.advanced {
            let (Some(prior), Some(next)) = (find(&before, *id), session.get(*id)) else {
                // Completed and pruned in the same tick
                continue;
            };
            check_advance(report.tick, prior, next, &mut violations);
        }

        operate(&mut session, &mut rng, &mut stats, &mut violations);

        if config.stop_on_first_violation && !violations.is_empty() {
            tracing::warn!(tick = session.ticks(), "stopping on first violation");
            break;
        }
    }

    let records = session.records();
    let by_status = counts(&group_by_status(records));
    let by_layer = counts(&group_by_layer(records));

    tracing::info!(
        seed = config.seed,
        ticks = stats.ticks_run,
        violations = violations.len(),
        "simulation finished"
    );
    SimulatorReport {
        pipeline: session.stats(),
        config,
        stats,
        by_status,
        by_layer,
        violations,
    }
}

fn find(records: &Vector<Record>, id: RecordId) -> Option<&Record> {
    records.iter().find(|record| record.id() == id)
}

/// Invariants that must hold across a single advance
fn check_advance(tick: u64, prior: &Record, next: &Record, violations: &mut Vec<Violation>) {
    let record = prior.id();

    if next.history.len() != prior.history.len() + 1 {
        violations.push(Violation::HistoryLength {
            tick,
            record,
            before: prior.history.len(),
            after: next.history.len(),
        });
    } else if next.history.last() != Some(&prior.state) {
        violations.push(Violation::SnapshotMismatch { tick, record });
    }

    let (before, after) = (
        prior.state.manifest.hashes.len(),
        next.state.manifest.hashes.len(),
    );
    if after < before {
        violations.push(Violation::ManifestShrank {
            tick,
            record,
            before,
            after,
        });
    }

    if next.layer() != next.status().layer() {
        violations.push(Violation::LayerMismatch {
            tick,
            record,
            status: next.status(),
            layer: next.layer(),
        });
    }

    if validate_transition(prior.status(), next.status()).is_err() {
        violations.push(Violation::IllegalTransition {
            tick,
            record,
            from: prior.status(),
            to: next.status(),
        });
    }
}

/// Simulated human operator: decides held cases and occasionally rolls back
fn operate(
    session: &mut Session,
    rng: &mut StdRng,
    stats: &mut SimulatorStats,
    violations: &mut Vec<Violation>,
) {
    if rng.chance(OPERATOR_PROBABILITY) {
        let held = manual_review_queue(session.records())
            .first()
            .map(|record| record.id());
        if let Some(id) = held {
            if rng.chance(OPERATOR_APPROVAL_RATE) {
                session.apply(Intent::Approve(id), rng);
                stats.approved += 1;
            } else {
                session.apply(Intent::Reject(id), rng);
                stats.rejected += 1;
            }
        }
    }

    if !rng.chance(ROLLBACK_PROBABILITY) || session.records().is_empty() {
        return;
    }
    let records = session.records();
    let Ok(index) = usize::try_from(rng.below(records.len() as u64)) else {
        return;
    };
    let target = records[index].clone();
    if target.history.is_empty() {
        return;
    }
    let Ok(step) = usize::try_from(rng.below(target.history.len() as u64)) else {
        return;
    };
    let Ok(signed) = i64::try_from(step) else {
        return;
    };

    session.apply(
        Intent::Rollback {
            id: target.id(),
            step: signed,
        },
        rng,
    );
    stats.rolled_back += 1;

    let restored = session.get(target.id());
    let consistent = restored.is_some_and(|record| {
        record.history.len() == step
            && record.history[..] == target.history[..step]
            && record.status() == target.history[step].status
    });
    if !consistent {
        violations.push(Violation::RollbackMismatch {
            tick: session.ticks(),
            record: target.id(),
            step,
        });
    }
}

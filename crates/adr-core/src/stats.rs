//! Statistics Aggregator
//!
//! Reduces a record collection into the business-impact figures shown on
//! the dashboard.

use crate::record::Record;
use crate::types::DecisionClass;
use serde::{Deserialize, Serialize};

/// Cost of a case handled by a person
pub const MANUAL_CASE_COST: f64 = 50.0;
/// Cost of a case decided automatically
pub const AUTO_CASE_COST: f64 = 0.5;
/// Minutes a person spends on a case
pub const MANUAL_CASE_MINUTES: f64 = 20.0;
/// Minutes the pipeline spends on an automated case
pub const AUTO_CASE_MINUTES: f64 = 1.0 / 60.0;

/// Aggregated view metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Every record, resolved or not
    pub total_volume: usize,
    pub resolved_count: usize,
    /// Percentage of resolved cases that needed no human, 0 when none resolved
    pub automation_rate: u32,
    pub cost_savings: i64,
    pub time_saved_hours: f64,
    pub avoided_count: usize,
}

/// Reduce records into [`Stats`]
#[must_use]
pub fn calculate_stats<'a, I>(records: I) -> Stats
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut total_volume = 0usize;
    let mut resolved = 0usize;
    let mut automated = 0usize;
    let mut manual = 0usize;
    let mut avoided = 0usize;

    for record in records {
        total_volume += 1;
        if !record.status().is_resolved() {
            continue;
        }
        resolved += 1;
        match record.decision().map(|decision| decision.class()) {
            Some(DecisionClass::Automated) => automated += 1,
            Some(DecisionClass::Manual) => manual += 1,
            Some(DecisionClass::Avoided) => avoided += 1,
            None => {}
        }
    }

    let resolved_f = count(resolved);
    let manual_f = count(manual);
    let automated_f = count(automated);

    let baseline_cost = resolved_f * MANUAL_CASE_COST;
    let actual_cost = manual_f * MANUAL_CASE_COST + automated_f * AUTO_CASE_COST;

    let baseline_minutes = resolved_f * MANUAL_CASE_MINUTES;
    let actual_minutes = manual_f * MANUAL_CASE_MINUTES + automated_f * AUTO_CASE_MINUTES;
    let hours = (baseline_minutes - actual_minutes) / 60.0;

    let automation_rate = if resolved == 0 {
        0
    } else {
        percent(count(automated + avoided) * 100.0 / resolved_f)
    };

    Stats {
        total_volume,
        resolved_count: resolved,
        automation_rate,
        cost_savings: round_i64(baseline_cost - actual_cost),
        time_saved_hours: (hours * 10.0).round() / 10.0,
        avoided_count: avoided,
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_possible_truncation)]
fn round_i64(value: f64) -> i64 {
    value.round() as i64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

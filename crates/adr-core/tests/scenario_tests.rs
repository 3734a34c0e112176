//! End-to-end pipeline scenarios and aggregate statistics

use adr_core::prelude::*;
use adr_core::view::{group_by_layer, manual_review_queue};
use adr_core::{Decision, Pattern};
use adr_test_utils::{exception_on_hold, exception_with_amount, seeded, walk_to, ScriptedEntropy};
use pretty_assertions::assert_eq;

#[test]
fn finance_case_under_threshold_completes() {
    let mut rng = seeded(2024);
    let policy = PolicyConfig::new(10_000);
    let mut record = exception_with_amount(Industry::Finance, 3_000, &mut rng);

    let mut statuses = vec![record.status()];
    while record.status() != Status::Act {
        record = advance(&record, false, &policy, &mut rng);
        statuses.push(record.status());
    }
    assert_eq!(
        statuses,
        [Status::Detect, Status::Perceive, Status::Reason, Status::Decide, Status::Act]
    );
    assert_eq!(record.decision(), Some(Decision::Approved));

    record = advance(&record, false, &policy, &mut rng);
    assert_eq!(record.status(), Status::Assure);
    record = advance(&record, false, &policy, &mut rng);
    assert_eq!(record.status(), Status::Completed);

    assert_eq!(record.history.len(), 6);
    assert!(record.state.logs.len() >= 6);
    assert_eq!(record.state.active_pattern, Some(Pattern::P10));
    assert!(record.state.business.pii_redacted);
    assert!((0.85..0.99).contains(&record.state.business.confidence));
    assert_eq!(
        record.state.manifest.hashes.len(),
        record.state.logs.iter().filter(|l| l.pattern.is_some()).count()
    );
}

#[test]
fn finance_case_over_threshold_holds() {
    let mut rng = seeded(2025);
    let policy = PolicyConfig::new(10_000);
    let mut record = exception_with_amount(Industry::Finance, 15_000, &mut rng);

    while record.status().auto_advances() {
        record = advance(&record, false, &policy, &mut rng);
    }
    assert_eq!(record.status(), Status::ManualHold);
    assert_eq!(record.decision(), Some(Decision::ManualReview));
    assert_eq!(record.history.len(), 4);

    let queue = [record.clone()];
    assert_eq!(manual_review_queue(&queue).len(), 1);
    let layers = group_by_layer(&queue);
    assert_eq!(layers[&Layer::Orchestration].len(), 1);
}

#[test]
fn stats_partition_resolved_cases() {
    let policy = PolicyConfig::default();
    let mut rng = seeded(77);

    let automated: Vec<Record> = (0..2)
        .map(|_| {
            let record = exception_with_amount(Industry::Retail, 1_000, &mut rng);
            walk_to(record, Status::Completed, &policy, &mut rng).expect("auto path completes")
        })
        .collect();
    let manual = approve(&exception_on_hold(78), &mut rng);
    let avoided = {
        let mut entropy = ScriptedEntropy::always(true);
        let signal = create_signal(Industry::Insurance, &mut entropy);
        advance(&signal, false, &policy, &mut entropy)
    };
    let open = exception_with_amount(Industry::Healthcare, 500, &mut rng);

    let mut records = automated;
    records.extend([manual, avoided, open]);

    let stats = calculate_stats(&records);
    assert_eq!(stats.total_volume, 5);
    assert_eq!(stats.resolved_count, 4);
    assert_eq!(stats.avoided_count, 1);
    assert_eq!(stats.automation_rate, 75);
    assert_eq!(stats.cost_savings, 149);
    assert!((stats.time_saved_hours - 1.0).abs() < f64::EPSILON);
}

#[test]
fn held_cases_are_not_resolved() {
    let records = [exception_on_hold(90), exception_on_hold(91)];
    let stats = calculate_stats(&records);
    assert_eq!(stats.resolved_count, 0);
    assert_eq!(stats.automation_rate, 0);
    assert_eq!(stats.cost_savings, 0);
}

#[test]
fn records_serialize_with_wire_names() {
    let record = exception_with_amount(Industry::Finance, 3_000, &mut seeded(5));
    let json = serde_json::to_value(&record).expect("record serializes");

    assert_eq!(json["status"], "DETECT");
    assert_eq!(json["layer"], "L0: Sources");
    assert_eq!(json["data"]["amount"], 3_000);
    assert!(json["history"].as_array().is_some_and(Vec::is_empty));

    let back: Record = serde_json::from_value(json).expect("record deserializes");
    assert_eq!(back, record);
}

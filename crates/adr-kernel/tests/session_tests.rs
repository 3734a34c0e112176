//! Session Tests
//!
//! Intents, tick phases and selection tracking.
//!
use adr_core::{Decision, SimulationConfig, Status};
use adr_kernel::prelude::*;
use adr_test_utils::seeded;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Write;

fn certain_advance() -> SimulationConfig {
    SimulationConfig {
        advance_probability: 1.0,
        prune_probability: 0.0,
        spawn_probability: 0.0,
        ..SimulationConfig::default()
    }
}

fn spawn_one(session: &mut Session, rng: &mut rand::rngs::StdRng) -> RecordId {
    session.apply(
        Intent::Spawn {
            industry: Industry::Finance,
            priority: None,
        },
        rng,
    );
    session.records().back().expect("just spawned").id()
}

#[test]
fn test_rollback_refreshes_selection() {
    let mut rng = seeded(1);
    let mut session = Session::new(certain_advance());
    let id = spawn_one(&mut session, &mut rng);
    assert!(session.apply(Intent::Select(Some(id)), &mut rng));

    for _ in 0..3 {
        session.tick(&mut rng);
    }
    assert_eq!(session.selected().map(|r| r.status()), Some(Status::Decide));

    assert!(session.apply(Intent::Rollback { id, step: 1 }, &mut rng));
    let selected = session.selected().expect("still selected");
    assert_eq!(selected.status(), Status::Perceive);
    assert_eq!(selected.history.len(), 1);
    assert_eq!(session.view().selected_record().map(|r| r.status()), Some(Status::Perceive));
}

#[test]
fn test_rollback_out_of_range_is_ignored() {
    let mut rng = seeded(2);
    let mut session = Session::new(certain_advance());
    let id = spawn_one(&mut session, &mut rng);
    session.tick(&mut rng);
    let before = session.get(id).cloned();

    assert!(!session.apply(Intent::Rollback { id, step: -1 }, &mut rng));
    assert!(!session.apply(Intent::Rollback { id, step: 1 }, &mut rng));
    assert_eq!(session.get(id).cloned(), before);
}

#[test]
fn test_pruned_record_drops_selection() {
    let mut rng = seeded(3);
    let mut session = Session::new(SimulationConfig {
        prune_probability: 1.0,
        ..certain_advance()
    });
    // Factory amounts are always below the default threshold
    let id = spawn_one(&mut session, &mut rng);
    session.apply(Intent::Select(Some(id)), &mut rng);

    let mut pruned = Vec::new();
    for _ in 0..6 {
        pruned.extend(session.tick(&mut rng).pruned);
    }
    assert_eq!(pruned, [id]);
    assert!(session.records().is_empty());
    assert!(session.selected().is_none());
    assert_eq!(session.view().selected, None);
}

#[test]
fn test_kill_switch_holds_then_operator_approves() {
    let mut rng = seeded(4);
    let mut session = Session::new(certain_advance());
    session.apply(Intent::ToggleKillSwitch, &mut rng);
    let id = spawn_one(&mut session, &mut rng);

    for _ in 0..10 {
        session.tick(&mut rng);
    }
    let held = session.get(id).expect("held records are never pruned");
    assert_eq!(held.status(), Status::ManualHold);
    assert_eq!(held.history.len(), 4);

    assert!(session.apply(Intent::Approve(id), &mut rng));
    let approved = session.get(id).expect("approved");
    assert_eq!(approved.status(), Status::Act);
    assert_eq!(approved.decision(), Some(Decision::ApprovedManual));

    let stats = session.stats();
    assert_eq!(stats.resolved_count, 1);
    assert_eq!(stats.automation_rate, 0);
}

#[test]
fn test_threshold_change_applies_to_next_decision() {
    let mut rng = seeded(5);
    let mut session = Session::new(certain_advance());
    let id = spawn_one(&mut session, &mut rng);
    session.apply(Intent::SetPolicyThreshold(0), &mut rng);

    for _ in 0..4 {
        session.tick(&mut rng);
    }
    assert_eq!(session.get(id).map(|r| r.status()), Some(Status::ManualHold));
    assert_eq!(session.view().policy.approval_threshold, 0);

    assert!(session.apply(Intent::Reject(id), &mut rng));
    assert_eq!(session.get(id).map(|r| r.status()), Some(Status::Completed));
}

#[test]
fn test_session_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "kill_switch = true\nseed = 11\n\n[policy]\napprovalThreshold = 500").unwrap();

    let config = SimulationConfig::from_file(file.path()).unwrap();
    let session = Session::new(config);
    assert!(session.kill_switch());
    assert_eq!(session.policy().approval_threshold, 500);
    assert_eq!(session.config().seed, Some(11));
}

proptest! {
    #[test]
    fn prop_ticks_keep_records_consistent(
        seed in any::<u64>(),
        ticks in 1usize..60,
        spawns in 0usize..6,
    ) {
        let mut rng = seeded(seed);
        let mut session = Session::new(SimulationConfig {
            spawn_probability: 0.5,
            ..SimulationConfig::default()
        });
        for i in 0..spawns {
            session.apply(
                Intent::Spawn { industry: Industry::ALL[i % Industry::ALL.len()], priority: None },
                &mut rng,
            );
        }

        let mut expected = spawns;
        for tick in 1..=ticks {
            let report = session.tick(&mut rng);
            prop_assert_eq!(report.tick, tick as u64);
            expected = expected - report.pruned.len() + usize::from(report.spawned.is_some());
        }

        prop_assert_eq!(session.records().len(), expected);
        for record in session.records() {
            prop_assert_eq!(record.layer(), record.status().layer());
        }
    }
}

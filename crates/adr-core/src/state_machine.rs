//! Lifecycle state machine
//!
//! [`advance`] moves a record exactly one step through the pipeline:
//!
//! | From | To |
//! |---|---|
//! | `PRE_DISPUTE` | `COMPLETED` (70%, avoided upstream) or `DETECT` (30%) |
//! | `DETECT` | `PERCEIVE` |
//! | `PERCEIVE` | `REASON` |
//! | `REASON` | `DECIDE` |
//! | `DECIDE` | `ACT` below the approval threshold, `MANUAL_HOLD` otherwise |
//! | `ACT` | `ASSURE` |
//! | `ASSURE` | `COMPLETED` |
//!
//! With the kill switch engaged, `DECIDE` always goes to `MANUAL_HOLD`.
//! Every call, including the kill-switch interception and calls on records
//! with no outgoing transition, first appends a snapshot of the input.
//!
//! [`approve`] and [`reject`] are the human overrides used on records held
//! for manual review.

use crate::config::PolicyConfig;
use crate::entropy::Entropy;
use crate::error::TransitionError;
use crate::record::{LogEntry, Record, RecordState};
use crate::types::{Decision, Industry, Pattern, Severity, Status};

/// Probability a pre-dispute signal fades out upstream instead of escalating
pub const UPSTREAM_RESOLUTION_PROBABILITY: f64 = 0.7;

/// AI proposal written in the reasoning stage
pub const AI_PROPOSAL: &str = "Approve with Conditions";

const HUMAN_OPERATOR: &str = "Human Operator";
const POLICY_ENFORCER: &str = "Policy Enforcer";
const RADAR_AGENT: &str = "Radar Sentinel";

/// Statuses [`advance`] may produce from `from`
#[must_use]
pub fn successors(from: Status) -> &'static [Status] {
    use Status::*;
    match from {
        PreDispute => &[Completed, Detect],
        Detect => &[Perceive],
        Perceive => &[Reason],
        Reason => &[Decide],
        Decide => &[Act, ManualHold],
        Act => &[Assure],
        Assure => &[Completed],
        Completed | ManualHold => &[],
    }
}

/// Check a status change against the advancement table.
///
/// Staying put is legal only for statuses without successors.
pub fn validate_transition(from: Status, to: Status) -> Result<(), TransitionError> {
    let table = successors(from);
    let legal = if table.is_empty() {
        from == to
    } else {
        table.contains(&to)
    };
    if legal {
        Ok(())
    } else {
        Err(TransitionError::Illegal { from, to })
    }
}

/// Reasoning agent for an industry
#[must_use]
pub const fn reasoning_agent(industry: Industry) -> &'static str {
    match industry {
        Industry::Healthcare => "Clinical Reviewer",
        Industry::Finance => "AP Specialist",
        Industry::Retail => "Compliance Officer",
        Industry::Insurance | Industry::Manufacturing => "General Analyst",
    }
}

/// Accumulates the effects of one transition on a copy of the state
struct Step<'e, E: ?Sized> {
    state: RecordState,
    entropy: &'e mut E,
}

impl<E: Entropy + ?Sized> Step<'_, E> {
    fn enter(&mut self, status: Status, agent: &str, pattern: Pattern) {
        self.state.set_status(status);
        self.state.agent = Some(agent.to_string());
        self.state.active_pattern = Some(pattern);
    }

    fn log(&mut self, severity: Severity, agent: &str, pattern: Pattern, message: String) {
        let entry = LogEntry::new(severity, message)
            .by(agent)
            .with_pattern(pattern);
        self.state.append_log(entry, &mut *self.entropy);
    }
}

/// Advance a record one step.
///
/// Never mutates `record`; the returned record carries one more history
/// entry than the input, equal to the input's state.
#[must_use]
pub fn advance<E: Entropy + ?Sized>(
    record: &Record,
    kill_switch_active: bool,
    policy: &PolicyConfig,
    entropy: &mut E,
) -> Record {
    let mut history = Vec::with_capacity(record.history.len() + 1);
    history.extend_from_slice(&record.history);
    history.push(record.snapshot());

    let from = record.status();
    let mut step = Step {
        state: record.snapshot(),
        entropy,
    };

    if kill_switch_active && from == Status::Decide {
        tracing::warn!(id = %record.id(), "kill switch engaged, holding for human review");
        step.state.set_status(Status::ManualHold);
        step.state.business.decision = Some(Decision::ManualReview);
        step.state.active_pattern = Some(Pattern::P6);
        step.log(
            Severity::Security,
            "System Override",
            Pattern::P6,
            "[L3.b] GLOBAL KILL SWITCH ACTIVE. Routing to Human Review.".to_string(),
        );
        return Record {
            state: step.state,
            history,
        };
    }

    match from {
        Status::PreDispute => pre_dispute(&mut step),
        Status::Detect => detect(&mut step),
        Status::Perceive => perceive(&mut step),
        Status::Reason => reason(&mut step),
        Status::Decide => decide(&mut step, policy),
        Status::Act => act(&mut step),
        Status::Assure => assure(&mut step),
        Status::Completed | Status::ManualHold => {}
    }

    tracing::debug!(id = %record.id(), %from, to = %step.state.status, "advanced");
    Record {
        state: step.state,
        history,
    }
}

fn pre_dispute<E: Entropy + ?Sized>(step: &mut Step<'_, E>) {
    if step.entropy.chance(UPSTREAM_RESOLUTION_PROBABILITY) {
        step.enter(Status::Completed, RADAR_AGENT, Pattern::P4);
        step.state.business.decision = Some(Decision::AvoidedUpstream);
        step.log(
            Severity::Success,
            RADAR_AGENT,
            Pattern::P4,
            format!(
                "[L-1] Early intervention resolved \"{}\" upstream. Dispute avoided.",
                step.state.case_type
            ),
        );
    } else {
        step.enter(Status::Detect, RADAR_AGENT, Pattern::P1);
        step.log(
            Severity::Warning,
            RADAR_AGENT,
            Pattern::P1,
            format!(
                "[L-1] Signal \"{}\" escalated. Opening exception from {}.",
                step.state.case_type, step.state.source_system
            ),
        );
    }
}

fn detect<E: Entropy + ?Sized>(step: &mut Step<'_, E>) {
    const AGENT: &str = "Ingestion Bot";
    step.enter(Status::Perceive, AGENT, Pattern::P1);
    let source = step.state.source_system.clone();
    step.log(
        Severity::System,
        AGENT,
        Pattern::P1,
        format!("[L1] Ingested signal from {source} (Kafka)."),
    );
    step.log(
        Severity::System,
        AGENT,
        Pattern::P1,
        "[L1] Normalized to Canonical Schema v3.3.".to_string(),
    );
}

fn perceive<E: Entropy + ?Sized>(step: &mut Step<'_, E>) {
    const AGENT: &str = "Privacy Guardian";
    step.state.business.pii_redacted = true;
    step.enter(Status::Reason, AGENT, Pattern::P2);
    step.log(
        Severity::Warning,
        AGENT,
        Pattern::P6,
        "[L1.5] OPA Policy Check: PII Detected (Patient Name).".to_string(),
    );
    step.log(
        Severity::Security,
        AGENT,
        Pattern::P2,
        "[L1.5] Presidio Redaction applied. Data safe for L3.".to_string(),
    );
}

fn reason<E: Entropy + ?Sized>(step: &mut Step<'_, E>) {
    let agent = reasoning_agent(step.state.industry);
    let confidence = 0.85 + step.entropy.unit() * 0.14;
    step.state.business.confidence = confidence;
    step.state.business.ai_proposal = Some(AI_PROPOSAL.to_string());
    step.enter(Status::Decide, agent, Pattern::P5);

    let playbook = step.state.case_type.clone();
    step.log(
        Severity::System,
        "Orchestrator",
        Pattern::P3,
        format!("[L2] Temporal Workflow: Executing \"Standard {playbook} Playbook\""),
    );
    step.log(
        Severity::Ai,
        agent,
        Pattern::P3,
        format!("[L3.a] LangGraph Agent \"{agent}\" analyzing context..."),
    );
    step.log(
        Severity::Ai,
        agent,
        Pattern::P4,
        format!(
            "[L3.a] RAG Retrieval: Found matching policy docs. Confidence: {:.1}%",
            confidence * 100.0
        ),
    );
    step.log(
        Severity::Ai,
        agent,
        Pattern::P5,
        format!("[L3.a] PROPOSAL: {AI_PROPOSAL}"),
    );
}

fn decide<E: Entropy + ?Sized>(step: &mut Step<'_, E>, policy: &PolicyConfig) {
    let amount = step.state.business.amount;
    let threshold = policy.approval_threshold;

    step.log(
        Severity::Control,
        POLICY_ENFORCER,
        Pattern::P6,
        "[L3.b] Control Plane received proposal.".to_string(),
    );

    if policy.auto_approves(amount) {
        step.state.business.decision = Some(Decision::Approved);
        step.enter(Status::Act, POLICY_ENFORCER, Pattern::P7);
        step.log(
            Severity::Control,
            POLICY_ENFORCER,
            Pattern::P6,
            format!("[L3.b] OPA Guardrail: Amount ${amount} < ${threshold} (PASS)"),
        );
        step.log(
            Severity::Success,
            POLICY_ENFORCER,
            Pattern::P7,
            "[L3.b] DECISION: APPROVED. Signing Manifest.".to_string(),
        );
        step.log(
            Severity::Success,
            POLICY_ENFORCER,
            Pattern::P8,
            "[L3.b] Cryptographic Signature Generated.".to_string(),
        );
    } else {
        step.state.business.decision = Some(Decision::ManualReview);
        step.enter(Status::ManualHold, POLICY_ENFORCER, Pattern::P6);
        step.log(
            Severity::Warning,
            POLICY_ENFORCER,
            Pattern::P6,
            format!("[L3.b] OPA Guardrail: Amount ${amount} >= ${threshold} (FAIL)"),
        );
        step.log(
            Severity::Control,
            POLICY_ENFORCER,
            Pattern::P6,
            "[L3.b] DECISION: MANUAL_REVIEW. Escalating to human queue.".to_string(),
        );
    }
}

fn act<E: Entropy + ?Sized>(step: &mut Step<'_, E>) {
    const AGENT: &str = "System Connector";
    step.enter(Status::Assure, AGENT, Pattern::P9);
    let source = step.state.source_system.clone();
    step.log(
        Severity::System,
        AGENT,
        Pattern::P9,
        format!("[L6] MuleSoft: Executing write-back to {source}."),
    );
}

fn assure<E: Entropy + ?Sized>(step: &mut Step<'_, E>) {
    const AGENT: &str = "Auditor";
    step.enter(Status::Completed, AGENT, Pattern::P10);
    step.log(
        Severity::System,
        AGENT,
        Pattern::P10,
        "[L5] QLDB: Sealed Manifest archived. Audit trail complete.".to_string(),
    );
}

fn human_decision<E: Entropy + ?Sized>(
    record: &Record,
    status: Status,
    decision: Decision,
    severity: Severity,
    message: &str,
    entropy: &mut E,
) -> Record {
    let mut history = record.history.clone();
    history.push(record.snapshot());

    let mut step = Step {
        state: record.snapshot(),
        entropy,
    };
    step.state.business.decision = Some(decision);
    step.enter(status, HUMAN_OPERATOR, Pattern::P7);
    step.log(severity, HUMAN_OPERATOR, Pattern::P7, message.to_string());

    tracing::info!(id = %record.id(), %decision, "human decision recorded");
    Record {
        state: step.state,
        history,
    }
}

/// Manual approval: forces `ACT` with decision `APPROVED (MANUAL)`
#[must_use]
pub fn approve<E: Entropy + ?Sized>(record: &Record, entropy: &mut E) -> Record {
    human_decision(
        record,
        Status::Act,
        Decision::ApprovedManual,
        Severity::Success,
        "Manual Approval by Human Operator.",
        entropy,
    )
}

/// Manual rejection: forces `COMPLETED` with decision `REJECTED (MANUAL)`
#[must_use]
pub fn reject<E: Entropy + ?Sized>(record: &Record, entropy: &mut E) -> Record {
    human_decision(
        record,
        Status::Completed,
        Decision::RejectedManual,
        Severity::Error,
        "Manual Rejection by Human Operator.",
        entropy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::create_exception;
    use crate::types::Layer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at_decide(amount: i64, rng: &mut StdRng) -> Record {
        let mut record = create_exception(Industry::Finance, None, rng);
        record.state.business.amount = amount;
        let policy = PolicyConfig::default();
        for _ in 0..3 {
            record = advance(&record, false, &policy, rng);
        }
        assert_eq!(record.status(), Status::Decide);
        record
    }

    #[test]
    fn successors_cover_every_status() {
        for status in Status::ALL {
            for next in successors(status) {
                assert!(validate_transition(status, *next).is_ok());
            }
        }
        assert!(validate_transition(Status::Completed, Status::Completed).is_ok());
        assert!(validate_transition(Status::Detect, Status::Detect).is_err());
        assert!(validate_transition(Status::Detect, Status::Act).is_err());
    }

    #[test]
    fn reasoning_sets_confidence_and_agent() {
        let mut rng = StdRng::seed_from_u64(21);
        let record = at_decide(100, &mut rng);
        let confidence = record.state.business.confidence;
        assert!((0.85..0.99).contains(&confidence), "{confidence}");
        assert_eq!(record.state.business.ai_proposal.as_deref(), Some(AI_PROPOSAL));
        assert_eq!(record.state.agent.as_deref(), Some("AP Specialist"));
        assert!(record.state.business.pii_redacted);
    }

    #[test]
    fn kill_switch_logs_security_entry() {
        let mut rng = StdRng::seed_from_u64(22);
        let record = at_decide(100, &mut rng);
        let held = advance(&record, true, &PolicyConfig::default(), &mut rng);

        assert_eq!(held.status(), Status::ManualHold);
        assert_eq!(held.layer(), Layer::Orchestration);
        assert_eq!(held.decision(), Some(Decision::ManualReview));
        let last = held.state.logs.last().unwrap();
        assert_eq!(last.severity, Severity::Security);
        assert_eq!(last.agent.as_deref(), Some("System Override"));
        assert_eq!(held.history.len(), record.history.len() + 1);
        assert_eq!(
            held.state.manifest.hashes.len(),
            record.state.manifest.hashes.len() + 1
        );
    }

    #[test]
    fn kill_switch_only_intercepts_decide() {
        let mut rng = StdRng::seed_from_u64(23);
        let record = create_exception(Industry::Retail, None, &mut rng);
        let next = advance(&record, true, &PolicyConfig::default(), &mut rng);
        assert_eq!(next.status(), Status::Perceive);
    }

    #[test]
    fn every_tagged_log_has_a_hash() {
        let mut rng = StdRng::seed_from_u64(24);
        let mut record = create_exception(Industry::Healthcare, None, &mut rng);
        record.state.business.amount = 10;
        let policy = PolicyConfig::default();
        while record.status().auto_advances() {
            record = advance(&record, false, &policy, &mut rng);
        }
        let tagged = record
            .state
            .logs
            .iter()
            .filter(|entry| entry.pattern.is_some())
            .count();
        assert_eq!(tagged, record.state.manifest.hashes.len());
        assert_eq!(record.state.active_pattern, Some(Pattern::P10));
        assert_eq!(record.state.agent.as_deref(), Some("Auditor"));
    }

    #[test]
    fn approve_and_reject_override_hold() {
        let mut rng = StdRng::seed_from_u64(25);
        let record = at_decide(50_000, &mut rng);
        let held = advance(&record, false, &PolicyConfig::default(), &mut rng);
        assert_eq!(held.status(), Status::ManualHold);

        let approved = approve(&held, &mut rng);
        assert_eq!(approved.status(), Status::Act);
        assert_eq!(approved.layer(), Layer::Connectivity);
        assert_eq!(approved.decision(), Some(Decision::ApprovedManual));
        assert_eq!(approved.state.agent.as_deref(), Some(HUMAN_OPERATOR));
        assert_eq!(approved.history.len(), held.history.len() + 1);
        let entry = approved.state.logs.last().unwrap();
        assert_eq!(entry.pattern, Some(Pattern::P7));
        assert_eq!(entry.severity, Severity::Success);

        let rejected = reject(&held, &mut rng);
        assert_eq!(rejected.status(), Status::Completed);
        assert_eq!(rejected.layer(), Layer::Sources);
        assert_eq!(rejected.decision(), Some(Decision::RejectedManual));
        assert_eq!(rejected.state.logs.last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn manual_hold_does_not_advance() {
        let mut rng = StdRng::seed_from_u64(26);
        let record = at_decide(20_000, &mut rng);
        let held = advance(&record, false, &PolicyConfig::default(), &mut rng);
        let again = advance(&held, false, &PolicyConfig::default(), &mut rng);
        assert_eq!(again.status(), Status::ManualHold);
        assert_eq!(again.state, held.state);
        assert_eq!(again.history.len(), held.history.len() + 1);
    }
}

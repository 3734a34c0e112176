//! Record Factory
//!
//! Builds new signal and exception records with randomized but
//! schema-valid mock fields. Nothing outside the returned value is touched.

use crate::entropy::{below_i64, pick, uuid_v4, Entropy};
use crate::record::{BusinessData, LogEntry, Manifest, Record, RecordState};
use crate::types::{Industry, Priority, RecordId, RecordKind, Severity, Status};
use chrono::{Duration, Utc};

/// Upper bound (exclusive) of the mock dispute amount
pub const MAX_AMOUNT: u64 = 10_000;

/// Probability an exception without forced priority is HIGH
pub const HIGH_PRIORITY_PROBABILITY: f64 = 0.2;

const FALLBACK_SOURCE: &str = "Legacy System";
const FALLBACK_EXCEPTION: &str = "Generic Exception";
const FALLBACK_ANOMALY: &str = "Operational Anomaly";
const RADAR_AGENT: &str = "Radar Sentinel";

fn exception_types(industry: Industry) -> &'static [&'static str] {
    match industry {
        Industry::Healthcare => &["Prior Authorization Denial", "Provider Credentialing Delay"],
        Industry::Finance => &["Invoice Reconciliation Gap", "Month-End Close Delay"],
        Industry::Retail => &["Tariff Compliance Leak", "Vendor Deduction Dispute"],
        Industry::Insurance | Industry::Manufacturing => &[FALLBACK_EXCEPTION],
    }
}

fn signal_types(industry: Industry) -> &'static [&'static str] {
    match industry {
        Industry::Healthcare => &["Eligibility Drift", "Claim Coding Anomaly"],
        Industry::Finance => &["Duplicate Invoice Pattern", "Payment Term Drift"],
        Industry::Retail => &["Chargeback Spike", "Shipment Delay Cluster"],
        Industry::Insurance | Industry::Manufacturing => &[FALLBACK_ANOMALY],
    }
}

fn source_systems(industry: Industry) -> &'static [&'static str] {
    match industry {
        Industry::Healthcare => &["Epic EHR", "Cerner", "Allscripts", "Workday HCM"],
        Industry::Finance => &["SAP S/4HANA", "Oracle NetSuite", "Coupa", "Workday Finance"],
        Industry::Retail => &["Salesforce Commerce", "Shopify Plus", "Manhattan WMS", "SAP ERP"],
        Industry::Insurance | Industry::Manufacturing => &[FALLBACK_SOURCE],
    }
}

fn pick_label<E: Entropy + ?Sized>(
    entropy: &mut E,
    items: &'static [&'static str],
    fallback: &'static str,
) -> &'static str {
    pick(entropy, items).copied().unwrap_or(fallback)
}

/// Industry-specific business fields
fn business_data<E: Entropy + ?Sized>(industry: Industry, entropy: &mut E) -> BusinessData {
    let data = BusinessData::new(below_i64(entropy, MAX_AMOUNT));

    match industry {
        Industry::Healthcare => {
            let days_back = below_i64(entropy, 1_000_000_000);
            let service_date = (Utc::now() - Duration::milliseconds(days_back))
                .format("%Y-%m-%d")
                .to_string();
            data.with_field("patient_id", format!("PT-{}", entropy.below(100_000)))
                .with_field(
                    "diagnosis_code",
                    pick_label(entropy, &["E11.9", "I10", "J45.909", "M54.5"], "I10"),
                )
                .with_field("provider_npi", format!("NPI-{}", entropy.below(1_000_000_000)))
                .with_field("claim_amount", format!("${:.2}", entropy.unit() * 5000.0))
                .with_field("service_date", service_date)
        }
        Industry::Finance => data
            .with_field("invoice_id", format!("INV-{}", entropy.below(100_000)))
            .with_field("vendor_id", format!("VEND-{}", entropy.below(1000)))
            .with_field(
                "gl_code",
                format!("GL-{}-{}", entropy.below(900), entropy.below(90)),
            )
            .with_field(
                "po_match_status",
                pick_label(
                    entropy,
                    &["Partial Match", "No Match", "Price Variance"],
                    "No Match",
                ),
            )
            .with_field("payment_terms", "Net 30"),
        Industry::Retail => {
            let region = pick_label(entropy, &["NA", "EU", "APAC"], "NA");
            data.with_field("sku", format!("SKU-{}", entropy.below(100_000)))
                .with_field("location_id", format!("WH-{region}-{}", entropy.below(100)))
                .with_field(
                    "carrier",
                    pick_label(entropy, &["FedEx", "UPS", "DHL", "Maersk"], "UPS"),
                )
                .with_field("manifest_id", format!("MAN-{}", entropy.below(100_000)))
                .with_field("compliance_check", "Pending")
        }
        Industry::Insurance | Industry::Manufacturing => data
            .with_field("reference_id", format!("REF-{}", entropy.below(100_000)))
            .with_field("category", industry.as_str()),
    }
}

/// Fields shared by both record kinds
fn base_state<E: Entropy + ?Sized>(
    kind: RecordKind,
    industry: Industry,
    case_type: &str,
    status: Status,
    priority: Priority,
    business: BusinessData,
    entropy: &mut E,
) -> RecordState {
    let id = RecordId::generate(entropy);
    let source_system = pick_label(entropy, source_systems(industry), FALLBACK_SOURCE);
    let tenant_id = RecordId::generate(entropy).short();
    let manifest = Manifest::sealed_for(uuid_v4(entropy), id);

    RecordState {
        id,
        kind,
        industry,
        case_type: case_type.to_string(),
        created_at: Utc::now(),
        status,
        layer: status.layer(),
        priority,
        tenant_id,
        source_system: source_system.to_string(),
        agent: None,
        business,
        manifest,
        active_pattern: None,
        logs: Vec::new(),
    }
}

/// Create a pre-dispute signal.
///
/// Starts in `PRE_DISPUTE` at LOW priority with a single seed log naming
/// the anomaly and its risk score.
#[must_use]
pub fn create_signal<E: Entropy + ?Sized>(industry: Industry, entropy: &mut E) -> Record {
    let anomaly = pick_label(entropy, signal_types(industry), FALLBACK_ANOMALY);
    let risk_score = 0.40 + entropy.unit() * 0.55;
    let business = BusinessData::new(below_i64(entropy, MAX_AMOUNT))
        .with_field("risk_score", format!("{risk_score:.2}"));

    let mut state = base_state(
        RecordKind::Signal,
        industry,
        anomaly,
        Status::PreDispute,
        Priority::Low,
        business,
        entropy,
    );
    state.agent = Some(RADAR_AGENT.to_string());
    let seed = LogEntry::new(
        Severity::Warning,
        format!(
            "[L-1] Anomaly detected in {}: {anomaly}. Risk score: {risk_score:.2}",
            state.source_system
        ),
    )
    .by(RADAR_AGENT);
    state.append_log(seed, entropy);

    tracing::debug!(id = %state.id, %industry, anomaly, "signal created");
    Record::new(state)
}

/// Create a full exception record in `DETECT`.
///
/// Priority is `forced_priority` when given, otherwise HIGH with 20%
/// probability and MEDIUM the rest of the time.
#[must_use]
pub fn create_exception<E: Entropy + ?Sized>(
    industry: Industry,
    forced_priority: Option<Priority>,
    entropy: &mut E,
) -> Record {
    let case_type = pick_label(entropy, exception_types(industry), FALLBACK_EXCEPTION);
    let priority = match forced_priority {
        Some(priority) => priority,
        None if entropy.chance(HIGH_PRIORITY_PROBABILITY) => Priority::High,
        None => Priority::Medium,
    };
    let business = business_data(industry, entropy);

    let state = base_state(
        RecordKind::Exception,
        industry,
        case_type,
        Status::Detect,
        priority,
        business,
        entropy,
    );

    tracing::debug!(id = %state.id, %industry, %priority, "exception created");
    Record::new(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn signal_starts_on_the_radar() {
        let mut rng = StdRng::seed_from_u64(1);
        let signal = create_signal(Industry::Retail, &mut rng);

        assert_eq!(signal.state.kind, RecordKind::Signal);
        assert_eq!(signal.status(), Status::PreDispute);
        assert_eq!(signal.layer(), Layer::PreDisputeRadar);
        assert_eq!(signal.state.priority, Priority::Low);
        assert!(signal.history.is_empty());
        assert_eq!(signal.state.logs.len(), 1);
        assert!(signal.state.logs[0].message.contains("Risk score"));
        assert!(signal.state.manifest.hashes.is_empty());
        assert!(signal.state.business.fields.contains_key("risk_score"));
    }

    #[test]
    fn signal_without_source_list_uses_fallback() {
        let mut rng = StdRng::seed_from_u64(2);
        let signal = create_signal(Industry::Manufacturing, &mut rng);
        assert_eq!(signal.state.source_system, FALLBACK_SOURCE);
        assert_eq!(signal.state.case_type, FALLBACK_ANOMALY);
    }

    #[test]
    fn exception_starts_at_detect() {
        let mut rng = StdRng::seed_from_u64(3);
        let exception = create_exception(Industry::Finance, None, &mut rng);

        assert_eq!(exception.state.kind, RecordKind::Exception);
        assert_eq!(exception.status(), Status::Detect);
        assert_eq!(exception.layer(), Layer::Sources);
        assert!(matches!(
            exception.state.priority,
            Priority::High | Priority::Medium
        ));
        assert!(exception.state.logs.is_empty());
        assert!(exception.history.is_empty());
        assert_eq!(exception.state.manifest.record_id, exception.id());
        assert_eq!(exception.state.manifest.bom.len(), 3);
        assert!((0..10_000).contains(&exception.state.business.amount));
        assert!(exception_types(Industry::Finance).contains(&exception.state.case_type.as_str()));
    }

    #[test]
    fn forced_priority_wins() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let exception = create_exception(Industry::Healthcare, Some(Priority::Low), &mut rng);
            assert_eq!(exception.state.priority, Priority::Low);
        }
    }

    #[test]
    fn industry_fields_differ_by_vertical() {
        let mut rng = StdRng::seed_from_u64(5);
        let keys = |industry| {
            create_exception(industry, None, &mut StdRng::seed_from_u64(5))
                .state
                .business
                .fields
                .keys()
                .cloned()
                .collect::<Vec<_>>()
        };
        assert_eq!(
            keys(Industry::Healthcare),
            ["patient_id", "diagnosis_code", "provider_npi", "claim_amount", "service_date"]
        );
        assert_eq!(
            keys(Industry::Finance),
            ["invoice_id", "vendor_id", "gl_code", "po_match_status", "payment_terms"]
        );
        assert_eq!(
            keys(Industry::Retail),
            ["sku", "location_id", "carrier", "manifest_id", "compliance_check"]
        );
        assert_eq!(keys(Industry::Insurance), ["reference_id", "category"]);

        let generic = create_exception(Industry::Insurance, None, &mut rng);
        assert_eq!(generic.state.case_type, FALLBACK_EXCEPTION);
    }

    #[test]
    fn same_seed_same_record_ids() {
        let a = create_exception(Industry::Retail, None, &mut StdRng::seed_from_u64(9));
        let b = create_exception(Industry::Retail, None, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.id(), b.id());
        assert_eq!(a.state.business.fields, b.state.business.fields);
    }

    #[test]
    fn priority_distribution_is_mostly_medium() {
        let mut rng = StdRng::seed_from_u64(6);
        let high = (0..1000)
            .filter(|_| {
                create_exception(Industry::Finance, None, &mut rng).state.priority
                    == Priority::High
            })
            .count();
        assert!((100..300).contains(&high), "high = {high}");
    }
}

//! Test harness: batch simulator and certification sweep

pub mod simulator;

pub use simulator::{run_simulator, SimulatorConfig, SimulatorReport, SimulatorStats, Violation};

use adr_core::SimulationConfig;
use serde::Serialize;

/// Outcome of a multi-seed certification sweep
#[derive(Debug, Clone, Serialize)]
pub struct CertificationReport {
    pub seeds_tested: u64,
    pub ticks_per_seed: u64,
    pub total_violations: usize,
    /// Seeds that produced at least one violation
    pub failing_seeds: Vec<u64>,
    pub passed: bool,
}

/// Entry points for whole-pipeline checks
pub struct TestHarness;

impl TestHarness {
    /// Run the simulator over seeds `0..seeds`, once with the default policy
    /// and once with the kill switch engaged.
    #[must_use]
    pub fn run_certification(seeds: u64, ticks: u64) -> CertificationReport {
        let mut total_violations = 0;
        let mut failing_seeds = Vec::new();

        for seed in 0..seeds {
            for kill_switch in [false, true] {
                let report = run_simulator(SimulatorConfig {
                    seed,
                    ticks,
                    simulation: SimulationConfig::default().with_kill_switch(kill_switch),
                    ..SimulatorConfig::default()
                });
                if !report.passed() {
                    total_violations += report.violations.len();
                    if failing_seeds.last() != Some(&seed) {
                        failing_seeds.push(seed);
                    }
                }
            }
        }

        tracing::info!(seeds, total_violations, "certification finished");
        CertificationReport {
            seeds_tested: seeds,
            ticks_per_seed: ticks,
            total_violations,
            passed: total_violations == 0,
            failing_seeds,
        }
    }
}

//! `adr-kernel` command line: batch simulation, live sessions, scenarios, certification

use adr_core::{advance, create_exception, Industry, PolicyConfig, Record, SimulationConfig};
use adr_kernel::driver;
use adr_kernel::session::{Intent, Session};
use adr_kernel::test_harness::{run_simulator, SimulatorConfig, TestHarness};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("adr-kernel")
        .version(adr_kernel::VERSION)
        .about("Autonomous dispute resolution pipeline simulator")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .help("Log filter when RUST_LOG is unset"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run a seeded batch simulation")
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .default_value("1000")
                        .value_parser(value_parser!(u64))
                        .help("Number of ticks to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed, overrides the config file [default: 42]"),
                )
                .arg(
                    Arg::new("exceptions")
                        .long("exceptions")
                        .default_value("10")
                        .value_parser(value_parser!(usize))
                        .help("Exceptions spawned before the first tick"),
                )
                .arg(threshold_arg())
                .arg(kill_switch_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop simulation on first violation"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Run a live timer-driven session")
                .arg(config_arg())
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .default_value("30")
                        .value_parser(value_parser!(u64))
                        .help("Stop after this many ticks"),
                )
                .arg(
                    Arg::new("exceptions")
                        .long("exceptions")
                        .default_value("5")
                        .value_parser(value_parser!(usize))
                        .help("Exceptions spawned at start"),
                ),
        )
        .subcommand(
            Command::new("scenario")
                .about("Walk one exception through the pipeline")
                .arg(
                    Arg::new("industry")
                        .long("industry")
                        .default_value("Finance")
                        .value_parser(|s: &str| s.parse::<Industry>())
                        .help("Industry vertical"),
                )
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("Dispute amount"),
                )
                .arg(threshold_arg())
                .arg(kill_switch_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                ),
        )
        .subcommand(
            Command::new("certify")
                .about("Run the simulator across many seeds")
                .arg(
                    Arg::new("seeds")
                        .long("seeds")
                        .default_value("50")
                        .value_parser(value_parser!(u64))
                        .help("Number of seeds to test"),
                )
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .default_value("500")
                        .value_parser(value_parser!(u64))
                        .help("Ticks per seed"),
                ),
        )
}

fn threshold_arg() -> Arg {
    Arg::new("threshold")
        .long("threshold")
        .allow_negative_numbers(true)
        .value_parser(value_parser!(i64))
        .help("Auto-approval threshold (amounts strictly below approve)")
}

fn kill_switch_arg() -> Arg {
    Arg::new("kill-switch")
        .long("kill-switch")
        .action(ArgAction::SetTrue)
        .help("Engage the global kill switch")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Simulation config file (TOML)")
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Config file if given, defaults otherwise, then CLI overrides
fn load_config(args: &ArgMatches) -> anyhow::Result<SimulationConfig> {
    let mut config = match args.try_get_one::<PathBuf>("config").ok().flatten() {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Ok(Some(threshold)) = args.try_get_one::<i64>("threshold") {
        config = config.with_threshold(*threshold);
    }
    if args.try_get_one::<bool>("kill-switch").ok().flatten() == Some(&true) {
        config = config.with_kill_switch(true);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    if let Some(level) = matches.get_one::<String>("log-level") {
        init_logging(level);
    }

    match matches.subcommand() {
        Some(("simulate", args)) => simulate(args),
        Some(("run", args)) => run(args).await,
        Some(("scenario", args)) => scenario(args),
        Some(("certify", args)) => Ok(certify(args)),
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn simulate(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let simulation = load_config(args)?;
    let seed = args
        .get_one::<u64>("seed")
        .copied()
        .or(simulation.seed)
        .unwrap_or(42);
    let config = SimulatorConfig {
        seed,
        ticks: args.get_one::<u64>("ticks").copied().unwrap_or(1000),
        initial_exceptions: args.get_one::<usize>("exceptions").copied().unwrap_or(10),
        stop_on_first_violation: args.get_flag("stop-on-violation"),
        simulation,
    };

    let report = run_simulator(config);
    if args.get_flag("json") {
        println!("{}", report.to_json().context("serializing report")?);
    } else {
        println!("{}", report.generate_text());
    }
    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;
    let ticks = args.get_one::<u64>("ticks").copied().unwrap_or(30);
    let exceptions = args.get_one::<usize>("exceptions").copied().unwrap_or(5);
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!(
        "Running live session: {} ticks every {}ms, threshold ${} ({})",
        ticks,
        config.tick_interval_ms,
        config.policy.approval_threshold,
        config.policy.risk_level()
    );

    let handle = driver::spawn(Session::new(config), rng);
    for i in 0..exceptions {
        handle
            .send(Intent::Spawn {
                industry: Industry::ALL[i % Industry::ALL.len()],
                priority: None,
            })
            .await?;
    }
    handle.send(Intent::TogglePlay).await?;

    let mut views = handle.subscribe();
    loop {
        views.changed().await.context("driver stopped unexpectedly")?;
        let view = views.borrow_and_update().clone();
        if view.tick == 0 {
            continue;
        }
        println!(
            "tick {:>4}  records {:>3}  resolved {:>3}  held {:>3}  automation {:>3}%",
            view.tick,
            view.records.len(),
            view.stats.resolved_count,
            adr_core::view::manual_review_queue(&view.records).len(),
            view.stats.automation_rate
        );
        if view.tick >= ticks {
            break;
        }
    }

    let session = handle.shutdown().await?;
    let stats = session.stats();
    println!();
    println!("Session finished after {} ticks", session.ticks());
    println!("  Total Volume: {}", stats.total_volume);
    println!("  Resolved: {}", stats.resolved_count);
    println!("  Automation Rate: {}%", stats.automation_rate);
    println!("  Cost Savings: ${}", stats.cost_savings);
    println!("  Time Saved: {:.1}h", stats.time_saved_hours);
    Ok(ExitCode::SUCCESS)
}

fn scenario(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let industry = args
        .get_one::<Industry>("industry")
        .copied()
        .unwrap_or(Industry::Finance);
    let amount = args
        .get_one::<i64>("amount")
        .copied()
        .context("--amount is required")?;
    let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);
    let config = load_config(args)?;
    let policy: PolicyConfig = config.policy;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut record = create_exception(industry, None, &mut rng);
    record.state.business.amount = amount;
    println!(
        "{} {} ({}) amount ${} threshold ${}{}",
        record.state.case_type,
        record.id().short(),
        record.state.industry,
        amount,
        policy.approval_threshold,
        if config.kill_switch { " [KILL SWITCH]" } else { "" }
    );

    while record.status().auto_advances() {
        let from = record.status();
        record = advance(&record, config.kill_switch, &policy, &mut rng);
        println!("\n{from} -> {}", record.status());
    }

    print_record(&record);
    Ok(ExitCode::SUCCESS)
}

fn print_record(record: &Record) {
    println!("\n=== Logs ===");
    for entry in &record.state.logs {
        let pattern = entry.pattern.map(|p| p.id()).unwrap_or("-");
        println!(
            "[{}] {:<8} {:<4} {:<18} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.severity.as_str(),
            pattern,
            entry.agent.as_deref().unwrap_or("-"),
            entry.message
        );
    }

    println!("\n=== History ===");
    for (i, snapshot) in record.history.iter().enumerate() {
        println!("#{i} {} ({})", snapshot.status, snapshot.layer.label());
    }
    println!(
        "\nFinal: {} ({}) decision {}",
        record.status(),
        record.layer().label(),
        record
            .decision()
            .map_or_else(|| "-".to_string(), |d| d.to_string())
    );
}

fn certify(args: &ArgMatches) -> ExitCode {
    let seeds = args.get_one::<u64>("seeds").copied().unwrap_or(50);
    let ticks = args.get_one::<u64>("ticks").copied().unwrap_or(500);

    println!("Running certification suite...");
    println!();

    let report = TestHarness::run_certification(seeds, ticks);

    println!("Certification Report:");
    println!("  Seeds Tested: {}", report.seeds_tested);
    println!("  Ticks per Seed: {}", report.ticks_per_seed);
    println!("  Total Violations: {}", report.total_violations);
    if !report.failing_seeds.is_empty() {
        println!("  Failing Seeds: {:?}", report.failing_seeds);
    }
    println!("  Status: {}", if report.passed { "PASSED" } else { "FAILED" });

    if report.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

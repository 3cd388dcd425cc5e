//! Tiering Simulation Engine CLI
//!
//! ```bash
//! # Size and cost the primary architecture against a competitor
//! tiering-sim --pricing pricing-config.json compare --capacity-pb 10 --fast-tier-percent 20 --throughput 200
//!
//! # Run the checkpoint simulation headless for 600 ticks
//! tiering-sim simulate --competitor comp_v_ebox --ticks 600
//!
//! # Run it on the wall clock (500ms frames) until it halts or Ctrl+C
//! tiering-sim simulate --realtime --policy restart
//!
//! # Faster frames: 100ms ticks, one checkpoint interval every 3 seconds
//! tiering-sim simulate --realtime --frame-ms 100
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiering_simulation_engine::{
    compute_comparison,
    simulation::{EngineSnapshot, SimulationState},
    Architecture, Comparison, ComparisonSimulation, CostBreakdown, EngineConfig, Feasibility,
    PricingCatalog, SimulationClock, SizedConfiguration, TerminalPolicy, WorkflowParameters, WorkloadRequest,
};

#[derive(Parser)]
#[command(name = "tiering-sim")]
#[command(about = "Size tiered checkpoint storage and simulate checkpoint migration", long_about = None)]
struct Cli {
    /// Engine config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pricing document (JSON); without one costs are skipped
    #[arg(long, global = true)]
    pricing: Option<PathBuf>,

    /// Pricing period to use (e.g. Q2_2026)
    #[arg(long, global = true)]
    period: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size, cost and evaluate both architectures
    Compare {
        #[command(flatten)]
        workload: WorkloadArgs,

        /// Write the comparison as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Simulate checkpoints flowing through both architectures
    Simulate {
        #[command(flatten)]
        workload: WorkloadArgs,

        /// Maximum ticks to run
        #[arg(long, default_value_t = 500)]
        ticks: u64,

        /// Tick on the wall clock instead of as fast as possible
        #[arg(long)]
        realtime: bool,

        /// What to do when the tiers fill up (halt, restart)
        #[arg(long)]
        policy: Option<TerminalPolicy>,

        /// Real time between ticks (ms)
        #[arg(long)]
        frame_ms: Option<u64>,

        /// Write the final state as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct WorkloadArgs {
    /// Total capacity (PB)
    #[arg(long, default_value_t = 10.0)]
    capacity_pb: f64,

    /// Share of capacity in the fast tier (%)
    #[arg(long, default_value_t = 20.0)]
    fast_tier_percent: f64,

    /// Required throughput (GB/s)
    #[arg(long, default_value_t = 200.0)]
    throughput: f64,

    /// Competitor architecture (weka_nitro, weka_prime, comp_v_ebox, comp_v_cbox_dbox)
    #[arg(long, default_value = "weka_nitro", value_parser = parse_competitor)]
    competitor: Architecture,

    /// Competitor object-store bandwidth (GB/s)
    #[arg(long)]
    object_store_bandwidth: Option<f64>,

    /// Checkpoint size (GB)
    #[arg(long, default_value_t = 100.0)]
    checkpoint_size: f64,

    /// Checkpoint interval (minutes)
    #[arg(long, default_value_t = 60.0)]
    interval: f64,

    /// Checkpoints kept in the fast tier before migrating
    #[arg(long, default_value_t = 5)]
    retention: u32,
}

fn parse_competitor(value: &str) -> Result<Architecture, String> {
    match Architecture::from_key(value) {
        Some(architecture) if architecture.is_competitor() => Ok(architecture),
        Some(_) => Err(format!("{} is the primary architecture", value)),
        None => Err(format!("unknown architecture {:?}", value)),
    }
}

impl WorkloadArgs {
    fn request(&self, config: &EngineConfig) -> WorkloadRequest {
        WorkloadRequest::new(self.capacity_pb, self.fast_tier_percent, self.throughput)
            .with_competitor(self.competitor)
            .with_object_store_bandwidth(
                self.object_store_bandwidth
                    .unwrap_or(config.object_store_bandwidth_gbs),
            )
    }

    fn workflow(&self) -> WorkflowParameters {
        WorkflowParameters::new(self.checkpoint_size, self.interval, self.retention)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiering_sim=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(path) = cli.pricing {
        config = config.with_pricing_path(path);
    }
    if let Some(period) = cli.period {
        config = config.with_pricing_period(period);
    }

    let catalog = match &config.pricing_path {
        Some(path) => match PricingCatalog::from_path(path) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!("Pricing document {} unavailable ({}), skipping costs", path.display(), e);
                None
            }
        },
        None => None,
    };

    match cli.command {
        Commands::Compare { workload, output } => {
            let comparison = compare(&workload, &config, catalog.as_ref())?;
            print_comparison(&comparison);
            if let Some(path) = output {
                write_json(&path, &comparison)?;
            }
        }
        Commands::Simulate { workload, ticks, realtime, policy, frame_ms, output } => {
            if let Some(policy) = policy {
                config = config.with_terminal_policy(policy);
            }
            if let Some(frame_interval_ms) = frame_ms {
                let clock = SimulationClock { frame_interval_ms, ..config.clock };
                config = config.with_clock(clock);
            }
            config.clock.validate()?;
            let comparison = compare(&workload, &config, catalog.as_ref())?;
            print_comparison(&comparison);

            let simulation = ComparisonSimulation::new(&comparison, config.terminal_policy);
            let state = if realtime {
                run_realtime(simulation, &config, ticks)?
            } else {
                run_headless(simulation, &config, ticks)
            };

            print_state(&state);
            if let Some(path) = output {
                write_json(&path, &state)?;
            }
        }
    }

    Ok(())
}

fn compare(
    workload: &WorkloadArgs,
    config: &EngineConfig,
    catalog: Option<&PricingCatalog>,
) -> anyhow::Result<Comparison> {
    let comparison = compute_comparison(
        &workload.request(config),
        &workload.workflow(),
        catalog,
        &config.pricing_period,
    )?;
    Ok(comparison)
}

fn run_headless(mut simulation: ComparisonSimulation, config: &EngineConfig, ticks: u64) -> SimulationState {
    let delta = config.clock.delta_minutes(simulation.checkpoint_interval_min());
    info!("Running {} ticks of {:.2} simulated minutes", ticks, delta);

    for _ in 0..ticks {
        if !simulation.tick(delta) {
            break;
        }
    }
    simulation.snapshot()
}

#[cfg(feature = "async")]
fn run_realtime(simulation: ComparisonSimulation, config: &EngineConfig, ticks: u64) -> anyhow::Result<SimulationState> {
    use std::time::Duration;
    use tiering_simulation_engine::start_simulation;

    let clock = config.clock;
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let mut handle = start_simulation(simulation, clock)?;
        let mut report = tokio::time::interval(Duration::from_secs(5));

        loop {
            tokio::select! {
                _ = report.tick() => {
                    let state = handle.state().await;
                    for engine in [&state.primary, &state.competitor] {
                        println!("  {}", status_line(engine));
                    }
                    if state.halted || state.ticks >= ticks {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping simulation");
                    break;
                }
            }
        }

        handle.stop();
        Ok(handle.state().await)
    })
}

#[cfg(not(feature = "async"))]
fn run_realtime(simulation: ComparisonSimulation, config: &EngineConfig, ticks: u64) -> anyhow::Result<SimulationState> {
    warn!("Built without the async feature, running headless");
    Ok(run_headless(simulation, config, ticks))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    println!("\nResults saved to {}", path.display());
    Ok(())
}

fn print_comparison(comparison: &Comparison) {
    let request = &comparison.request;
    let workflow = &comparison.workflow;

    println!("Workload:");
    println!(
        "  {} PB total, {}% fast tier, {} GB/s",
        request.total_capacity_pb, request.fast_tier_percent, request.throughput_gbs
    );
    println!(
        "  {} GB checkpoints every {} min, keep {} in the fast tier\n",
        workflow.checkpoint_size_gb, workflow.checkpoint_interval_min, workflow.target_retention
    );

    print_architecture(
        &comparison.primary,
        comparison.primary_cost.as_ref(),
        &comparison.primary_feasibility,
    );
    print_architecture(
        &comparison.competitor,
        comparison.competitor_cost.as_ref(),
        &comparison.competitor_feasibility,
    );

    if let Some(speedup) = comparison.migration_speedup {
        println!("Migration bandwidth advantage: {:.1}x", speedup);
    }
    println!();
}

fn print_architecture(config: &SizedConfiguration, cost: Option<&CostBreakdown>, feasibility: &Feasibility) {
    println!("{}", config.architecture);
    println!("  Components:      {:?}", config.components);
    println!("  Media:           {} TB", config.media_size_tb);
    println!(
        "  Fast tier:       {:.0} TB @ {:.0} GB/s",
        config.fast_tier.capacity_tb, config.fast_tier.bandwidth_gbs
    );
    println!(
        "  {:<16} {:.0} TB @ {:.1} GB/s",
        format!("{}:", config.architecture.capacity_tier_name()),
        config.capacity_tier.capacity_tb,
        config.migration_bandwidth_gbs
    );
    match feasibility.migration_minutes {
        Some(minutes) => println!(
            "  Migration:       {:.1} min per checkpoint ({})",
            minutes,
            if feasibility.keeps_up { "keeps up" } else { "falls behind" }
        ),
        None => println!("  Migration:       none (no capacity tier)"),
    }
    println!("  Write:           {:.2} min per checkpoint", feasibility.write_minutes);
    println!("  Utilization:     {:.1}%", feasibility.fast_tier_utilization_percent);
    match cost {
        Some(cost) => println!(
            "  Cost:            ${:.2}M (hardware ${:.2}M, software ${:.2}M)",
            cost.total / 1e6,
            cost.hardware / 1e6,
            cost.software_support / 1e6
        ),
        None => println!("  Cost:            n/a"),
    }
    println!();
}

fn status_line(engine: &EngineSnapshot) -> String {
    let status = &engine.status;
    let migrating = match (status.migrating_id, status.migration_progress) {
        (Some(id), Some(progress)) => format!("#{} {:.0}%", id, progress),
        _ => "none".to_string(),
    };
    format!(
        "{:<18} {:>7} {:>5.0}%  active {:>4}  migrating {:<10} archived {:>5}{}",
        engine.architecture.to_string(),
        status.phase.to_string(),
        status.progress_percent,
        engine.tally.active,
        migrating,
        engine.tally.archived,
        if status.fast_tier_full { "  FAST TIER FULL" } else { "" }
    )
}

fn print_state(state: &SimulationState) {
    println!(
        "Simulation after {} ticks ({} restarts{}):",
        state.ticks,
        state.restarts,
        if state.halted { ", halted" } else { "" }
    );
    for engine in [&state.primary, &state.competitor] {
        println!(
            "  {} ({:.0} simulated min, {} fast-tier / {} capacity-tier slots)",
            status_line(engine),
            engine.elapsed_minutes,
            engine.fast_tier_slots,
            engine.capacity_tier_slots
        );
    }
}

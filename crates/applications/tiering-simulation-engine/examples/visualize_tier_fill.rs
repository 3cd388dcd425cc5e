//! Visualize fast-tier and capacity-tier fill over simulated time
//!
//! Runs the reference workload (10PB, 20% fast tier, 200 GB/s, 100GB
//! checkpoints every 60 min) and plots, for both architectures:
//! - Checkpoints resident in the fast tier
//! - Checkpoints archived in the capacity tier
//!
//! Usage:
//!   cargo run --example visualize_tier_fill
//!   Open visualizations/tier_fill.html in browser

use plotly::{
    color::NamedColor,
    common::{DashType, Line, Mode},
    layout::{Axis, Layout},
    Plot, Scatter,
};
use tiering_simulation_engine::{
    compute_comparison, ComparisonSimulation, PricingCatalog, SimulationClock, TerminalPolicy,
    WorkflowParameters, WorkloadRequest, DEFAULT_PRICING_PERIOD,
};

const TICKS: usize = 2_000;

fn main() {
    println!("Simulating checkpoint flow for the reference workload...");

    let catalog = PricingCatalog::from_json_str(include_str!("../pricing-config.json"))
        .expect("bundled pricing document parses");
    let comparison = compute_comparison(
        &WorkloadRequest::new(10.0, 20.0, 200.0),
        &WorkflowParameters::default(),
        Some(&catalog),
        DEFAULT_PRICING_PERIOD,
    )
    .expect("reference workload is valid");

    let mut simulation = ComparisonSimulation::new(&comparison, TerminalPolicy::Halt);
    let delta = SimulationClock::default().delta_minutes(simulation.checkpoint_interval_min());

    let mut hours = Vec::with_capacity(TICKS);
    let mut primary_fast = Vec::with_capacity(TICKS);
    let mut primary_archived = Vec::with_capacity(TICKS);
    let mut competitor_fast = Vec::with_capacity(TICKS);
    let mut competitor_archived = Vec::with_capacity(TICKS);

    for _ in 0..TICKS {
        let running = simulation.tick(delta);

        let primary = simulation.primary().tally();
        let competitor = simulation.competitor().tally();
        hours.push(simulation.primary().elapsed_minutes() / 60.0);
        primary_fast.push(primary.in_fast_tier());
        primary_archived.push(primary.archived);
        competitor_fast.push(competitor.in_fast_tier());
        competitor_archived.push(competitor.archived);

        if !running {
            break;
        }
    }

    let primary_name = comparison.primary.architecture.to_string();
    let competitor_name = comparison.competitor.architecture.to_string();

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(hours.clone(), primary_fast.clone())
            .name(&format!("{} fast tier", primary_name))
            .mode(Mode::Lines)
            .line(Line::new().color("rgba(34, 139, 34, 1.0)").width(2.0)),
    );
    plot.add_trace(
        Scatter::new(hours.clone(), primary_archived.clone())
            .name(&format!("{} JBOD", primary_name))
            .mode(Mode::Lines)
            .line(Line::new().color("rgba(34, 139, 34, 1.0)").dash(DashType::Dash)),
    );
    plot.add_trace(
        Scatter::new(hours.clone(), competitor_fast.clone())
            .name(&format!("{} fast tier", competitor_name))
            .mode(Mode::Lines)
            .line(Line::new().color("rgba(255, 140, 0, 1.0)").width(2.0)),
    );
    plot.add_trace(
        Scatter::new(hours.clone(), competitor_archived.clone())
            .name(&format!("{} S3", competitor_name))
            .mode(Mode::Lines)
            .line(Line::new().color("rgba(255, 140, 0, 1.0)").dash(DashType::Dash)),
    );

    let layout = Layout::new()
        .title("Checkpoint Tier Fill (100GB every 60 min)")
        .x_axis(
            Axis::new()
                .title("Simulated time (hours)")
                .grid_color(NamedColor::LightGray),
        )
        .y_axis(
            Axis::new()
                .title("Checkpoints")
                .grid_color(NamedColor::LightGray),
        )
        .hover_mode(plotly::layout::HoverMode::X);
    plot.set_layout(layout);

    std::fs::create_dir_all("visualizations").expect("create visualizations directory");
    let output_path = "visualizations/tier_fill.html";
    plot.write_html(output_path);

    let state = simulation.snapshot();
    println!("Visualization saved to {}", output_path);
    println!("\nAfter {} ticks ({:.0} simulated hours):", state.ticks, hours.last().copied().unwrap_or(0.0));
    for engine in [&state.primary, &state.competitor] {
        println!(
            "   - {}: {} active, {} migrating, {} archived{}",
            engine.architecture,
            engine.tally.active,
            engine.tally.migrating,
            engine.tally.archived,
            if engine.status.fast_tier_full { " (fast tier full)" } else { "" }
        );
    }
}

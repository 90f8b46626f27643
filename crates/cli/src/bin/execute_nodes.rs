use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use autopilot_cli::{init_logging, load_autopilot_config, report_stream, stdout_carries_data};
use clap::Parser;
use orbital_autopilot::autopilot::Autopilot;
use orbital_autopilot::executor::ExecutionMode;
use orbital_autopilot::export::{summary, trace};
use orbital_autopilot::harness::{NodeRunOptions, run_nodes};
use orbital_autopilot::primitives::format::to_si;
use orbital_autopilot::scenario::load_scenario;
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Execute a scenario's maneuver nodes on a simulated vessel"
)]
struct Cli {
    /// Scenario YAML describing the vessel and its maneuver nodes
    #[arg(long)]
    scenario: PathBuf,

    /// Autopilot config (TOML or YAML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Execute every node instead of only the next one
    #[arg(long, default_value_t = false)]
    all: bool,

    /// Disable automatic time warp
    #[arg(long, default_value_t = false)]
    no_warp: bool,

    /// Write a per-tick CSV trace to this path (`-` for stdout)
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Write a JSON run summary to this path (`-` for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Give up after this many fixed updates
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// Debug-level logging on stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_autopilot_config(cli.config.as_deref())?;
    if cli.no_warp {
        config.autowarp = false;
    }
    let scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    let mut vessel = scenario.build_vessel()?;
    info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        nodes = scenario.nodes.len(),
        "scenario loaded"
    );
    let mut autopilot = Autopilot::new(config);
    let mut report = report_stream(stdout_carries_data(
        cli.trace.as_deref(),
        cli.summary.as_deref(),
    ));

    writeln!(
        report,
        "Next node burn time: {}",
        autopilot
            .executor()
            .next_node_burn_time(&vessel.telemetry, &vessel.nodes)
    )?;

    let options = NodeRunOptions {
        mode: if cli.all {
            ExecutionMode::All
        } else {
            ExecutionMode::Single
        },
        max_ticks: cli.max_ticks,
    };
    let mut trace_writer = match &cli.trace {
        Some(path) => Some(trace::writer_for_path(path)?),
        None => None,
    };
    let result = run_nodes(
        &mut autopilot,
        &mut vessel,
        &options,
        trace_writer.as_mut().map(|w| &mut **w as &mut dyn std::io::Write),
    )?;

    writeln!(report, "Status: {}", result.status)?;
    writeln!(report, "Final phase: {}", result.final_phase)?;
    writeln!(
        report,
        "Ticks: {}  elapsed: {}s",
        result.ticks,
        to_si(result.elapsed_s, 4)
    )?;
    writeln!(
        report,
        "Nodes completed: {:?}  removed: {}  remaining: {}",
        result.nodes_completed, result.nodes_removed, result.nodes_remaining
    )?;
    report.flush()?;

    if let Some(path) = &cli.summary {
        summary::write_json(path, &result)?;
    }
    Ok(())
}

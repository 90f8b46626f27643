use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use autopilot_cli::{init_logging, load_autopilot_config, report_stream, stdout_carries_data};
use clap::{Parser, ValueEnum};
use orbital_autopilot::autopilot::Autopilot;
use orbital_autopilot::export::{summary, trace};
use orbital_autopilot::harness::{CountdownKind, LaunchRunOptions, run_launch};
use orbital_autopilot::primitives::format::to_si;
use orbital_autopilot::scenario::load_scenario;
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Count down to a launch window for a scenario's target"
)]
struct Cli {
    /// Scenario YAML describing the pad, the target orbit, and the window instants
    #[arg(long)]
    scenario: PathBuf,

    /// Autopilot config (TOML or YAML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window to wait for
    #[arg(long, value_enum, default_value_t = LaunchMode::Plane)]
    mode: LaunchMode,

    /// Stage at T-0 and allow time warp during the countdown
    #[arg(long, default_value_t = false)]
    arm: bool,

    /// Disable automatic time warp
    #[arg(long, default_value_t = false)]
    no_warp: bool,

    /// Phase angle (deg) for rendezvous launches; overrides the config
    #[arg(long)]
    phase_angle: Option<f64>,

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

#[derive(Copy, Clone, ValueEnum, Debug)]
enum LaunchMode {
    Plane,
    Rendezvous,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_autopilot_config(cli.config.as_deref())?;
    if cli.no_warp {
        config.autowarp = false;
    }
    if let Some(angle) = cli.phase_angle {
        config.ascent.launch_phase_angle = angle;
    }
    let scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    let mut vessel = scenario.build_vessel()?;
    info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        "scenario loaded"
    );
    let mut autopilot = Autopilot::new(config);

    let options = LaunchRunOptions {
        kind: match cli.mode {
            LaunchMode::Plane => CountdownKind::Plane,
            LaunchMode::Rendezvous => CountdownKind::Rendezvous,
        },
        armed: cli.arm,
        max_ticks: cli.max_ticks,
    };
    let mut trace_writer = match &cli.trace {
        Some(path) => Some(trace::writer_for_path(path)?),
        None => None,
    };
    let result = run_launch(
        &mut autopilot,
        &mut vessel,
        &options,
        trace_writer.as_mut().map(|w| &mut **w as &mut dyn std::io::Write),
    )?;

    let mut report = report_stream(stdout_carries_data(
        cli.trace.as_deref(),
        cli.summary.as_deref(),
    ));
    writeln!(report, "Status: {}", result.status)?;
    match result.launch_time_s {
        Some(time) => writeln!(report, "Launch at t = {}s", to_si(time, 6))?,
        None => writeln!(report, "No launch")?,
    }
    writeln!(
        report,
        "Desired inclination: {:.3} deg  stages fired: {}  ticks: {}",
        result.desired_inclination_deg, result.stages_fired, result.ticks
    )?;
    report.flush()?;

    if let Some(path) = &cli.summary {
        summary::write_json(path, &result)?;
    }
    Ok(())
}

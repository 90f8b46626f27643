//! Plumbing shared by the autopilot command-line tools.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use orbital_autopilot::config::{AutopilotConfig, load_config};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose` when set.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the autopilot config, or fall back to defaults when no path is given.
pub fn load_autopilot_config(path: Option<&Path>) -> anyhow::Result<AutopilotConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AutopilotConfig::default()),
    }
}

/// True when `--trace` or `--summary` writes its data to stdout.
pub fn stdout_carries_data(trace: Option<&Path>, summary: Option<&Path>) -> bool {
    let is_stdout = |path: Option<&Path>| path.is_some_and(|p| p == Path::new("-"));
    is_stdout(trace) || is_stdout(summary)
}

/// Stream for the human-readable report: stderr when stdout already carries CSV or JSON.
pub fn report_stream(stdout_taken: bool) -> Box<dyn Write> {
    if stdout_taken {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    }
}

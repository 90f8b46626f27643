//! Export helpers for CSV tick traces and JSON run summaries.

pub mod trace {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    const HEADER: &str = "tick,time_s,physics_running,phase,throttle,attitude_error_deg,nodes_pending,head_delta_v_m_s,warp_target_s,countdown,time_to_launch_s,stages_fired";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write the standard trace CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One row per fixed update.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub tick: u64,
        pub time_s: f64,
        pub physics_running: bool,
        pub phase: &'a str,
        pub throttle: f64,
        pub attitude_error_deg: f64,
        pub nodes_pending: usize,
        pub head_delta_v_m_s: Option<f64>,
        pub warp_target_s: Option<f64>,
        pub countdown: &'a str,
        pub time_to_launch_s: Option<f64>,
        pub stages_fired: usize,
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the standard header ordering.
        /// Absent optional values are written as empty fields.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{:.3},{},{},{:.4},{:.3},{},{},{},{},{},{}",
                self.tick,
                self.time_s,
                if self.physics_running { "true" } else { "false" },
                self.phase,
                self.throttle,
                self.attitude_error_deg,
                self.nodes_pending,
                optional(self.head_delta_v_m_s),
                optional(self.warp_target_s),
                self.countdown,
                optional(self.time_to_launch_s),
                self.stages_fired,
            )
        }
    }

    fn optional(value: Option<f64>) -> String {
        value.map(|v| format!("{:.4}", v)).unwrap_or_default()
    }
}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io::{self, Write};
    use std::path::Path;

    /// Outcome of a maneuver execution run.
    #[derive(Debug, Clone, Serialize)]
    pub struct NodeRunSummary {
        pub mode: String,
        pub final_phase: String,
        pub status: String,
        pub ticks: u64,
        pub elapsed_s: f64,
        pub nodes_completed: Vec<u64>,
        pub nodes_removed: usize,
        pub nodes_remaining: usize,
        pub residual_delta_v_m_s: Option<f64>,
    }

    /// Outcome of a launch countdown run.
    #[derive(Debug, Clone, Serialize)]
    pub struct LaunchRunSummary {
        pub mode: String,
        pub armed: bool,
        pub status: String,
        pub ticks: u64,
        pub launch_time_s: Option<f64>,
        pub desired_inclination_deg: f64,
        pub stages_fired: usize,
    }

    /// Write `summary` as pretty JSON, creating parent directories as needed.
    /// `-` writes to stdout.
    pub fn write_json<T: Serialize>(output: &Path, summary: &T) -> io::Result<()> {
        if output == Path::new("-") {
            let mut stdout = io::stdout().lock();
            to_writer_pretty(&mut stdout, summary)?;
            return writeln!(stdout);
        }
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(output)?, summary)?;
        Ok(())
    }
}

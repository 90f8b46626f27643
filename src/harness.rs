//! Closed-loop runs of the autopilot against the stand-in vessel.
//!
//! Each tick runs the fixed update, then one control step, then advances the world. The CLI
//! binaries and the integration tests share these loops.

use std::io::{self, Write};

use autopilot_ascent::GuidanceError;
use autopilot_executor::ExecutionMode;
use autopilot_export::summary::{LaunchRunSummary, NodeRunSummary};
use autopilot_export::trace::{self, Record};
use autopilot_sim::SimVessel;
use autopilot_vehicle::{AttitudeControl, ManeuverQueue};
use thiserror::Error;
use tracing::{debug, info};

use crate::autopilot::Autopilot;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to write trace: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Guidance(#[from] GuidanceError),
}

/// Which launch window a countdown run waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownKind {
    Plane,
    Rendezvous,
}

#[derive(Debug, Clone, Copy)]
pub struct NodeRunOptions {
    pub mode: ExecutionMode,
    pub max_ticks: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct LaunchRunOptions {
    pub kind: CountdownKind,
    pub armed: bool,
    pub max_ticks: u64,
}

/// Execute the vessel's maneuver nodes until the executor turns itself off or `max_ticks` pass.
pub fn run_nodes(
    autopilot: &mut Autopilot,
    vessel: &mut SimVessel,
    options: &NodeRunOptions,
    trace_out: Option<&mut dyn Write>,
) -> Result<NodeRunSummary, HarnessError> {
    let mut trace_out = trace_out;
    if let Some(writer) = trace_out.as_deref_mut() {
        trace::write_header(writer)?;
    }

    let start = vessel.now();
    autopilot.executor_mut().start(options.mode);
    info!(mode = ?options.mode, nodes = vessel.nodes.len(), "node run started");

    let mut ticks = 0;
    while ticks < options.max_ticks {
        tick(autopilot, vessel);
        if let Some(writer) = trace_out.as_deref_mut() {
            write_record(writer, ticks, autopilot, vessel)?;
        }
        ticks += 1;
        if !autopilot.executor().is_enabled() {
            break;
        }
        vessel.step();
    }
    if let Some(writer) = trace_out.as_deref_mut() {
        writer.flush()?;
    }

    let executor = autopilot.executor();
    let summary = NodeRunSummary {
        mode: format!("{:?}", options.mode),
        final_phase: format!("{:?}", executor.phase()),
        status: executor.status().to_string(),
        ticks,
        elapsed_s: vessel.now() - start,
        nodes_completed: executor.completed_nodes().iter().map(|id| id.0).collect(),
        nodes_removed: executor.removed_count(),
        nodes_remaining: vessel.nodes.len(),
        residual_delta_v_m_s: vessel.nodes.peek_earliest().map(|node| node.delta_v()),
    };
    info!(ticks, status = %summary.status, "node run finished");
    Ok(summary)
}

/// Count down to a launch window until the countdown ends or `max_ticks` pass.
pub fn run_launch(
    autopilot: &mut Autopilot,
    vessel: &mut SimVessel,
    options: &LaunchRunOptions,
    trace_out: Option<&mut dyn Write>,
) -> Result<LaunchRunSummary, HarnessError> {
    let mut trace_out = trace_out;
    if let Some(writer) = trace_out.as_deref_mut() {
        trace::write_header(writer)?;
    }

    let guidance = autopilot.guidance_mut();
    if options.armed {
        guidance.arm();
    } else {
        guidance.disarm();
    }
    match options.kind {
        CountdownKind::Plane => guidance.launch_to_plane(&vessel.target)?,
        CountdownKind::Rendezvous => guidance.launch_to_rendezvous(&vessel.target)?,
    }

    let mut launch_time = None;
    let mut ticks = 0;
    while ticks < options.max_ticks {
        let stages_before = vessel.staging.activations;
        let now = vessel.now();
        tick(autopilot, vessel);
        if vessel.staging.activations > stages_before && launch_time.is_none() {
            launch_time = Some(now);
        }
        if let Some(writer) = trace_out.as_deref_mut() {
            write_record(writer, ticks, autopilot, vessel)?;
        }
        ticks += 1;
        if autopilot.guidance().state() == autopilot_ascent::LaunchGuidanceState::Idle {
            break;
        }
        vessel.step();
    }
    if let Some(writer) = trace_out.as_deref_mut() {
        writer.flush()?;
    }

    let guidance = autopilot.guidance();
    let summary = LaunchRunSummary {
        mode: format!("{:?}", options.kind),
        armed: guidance.is_armed(),
        status: guidance.status().to_string(),
        ticks,
        launch_time_s: launch_time,
        desired_inclination_deg: guidance.desired_inclination(),
        stages_fired: vessel.staging.activations,
    };
    info!(ticks, status = %summary.status, "launch run finished");
    Ok(summary)
}

/// One fixed update followed by one control step. Returns the executor's throttle command.
pub fn tick(autopilot: &mut Autopilot, vessel: &mut SimVessel) -> f64 {
    let mut link = vessel.link();
    autopilot.fixed_update(&mut link);
    let throttle = autopilot.drive(&mut link);
    debug!(time = vessel.now(), throttle, "tick");
    throttle
}

fn write_record(
    writer: &mut dyn Write,
    tick: u64,
    autopilot: &Autopilot,
    vessel: &SimVessel,
) -> io::Result<()> {
    let phase = format!("{:?}", autopilot.executor().phase());
    let countdown = format!("{:?}", autopilot.guidance().state());
    Record {
        tick,
        time_s: vessel.now(),
        physics_running: vessel.telemetry.physics_running,
        phase: &phase,
        throttle: vessel.throttle.throttle,
        attitude_error_deg: vessel.attitude.angle_error_to_target(),
        nodes_pending: vessel.nodes.len(),
        head_delta_v_m_s: vessel.nodes.peek_earliest().map(|node| node.delta_v()),
        warp_target_s: vessel.warp.target,
        countdown: &countdown,
        time_to_launch_s: autopilot.guidance().time_to_launch(),
        stages_fired: vessel.staging.activations,
    }
    .write_to(writer)
}

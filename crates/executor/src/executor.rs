//! Node executor state machine.
//!
//! [`BurnExecutor::fixed_update`] runs once per fixed simulation step: it retires finished nodes,
//! points the vessel along the active node, decides when the burn starts, and manages time warp.
//! [`BurnExecutor::drive`] runs on the control-authority step and only turns the state written by
//! the last fixed update into a throttle value; it never starts a burn on its own.

use autopilot_config::NodeExecutorConfig;
use autopilot_core::format::to_si;
use autopilot_vehicle::{
    AttitudeControl, AttitudeReference, ManeuverNode, ManeuverQueue, NodeId, Requester, Telemetry,
    VesselLink,
};
use tracing::{debug, info, warn};

use crate::burn::{estimate_burn, throttle_for};

/// Forward axis of the maneuver-node frame.
const NODE_FORWARD: [f64; 3] = [0.0, 0.0, 1.0];

/// How many nodes one run consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Stop after the first completed node.
    Single,
    /// Keep going until the queue is empty.
    All,
}

/// Observable phase of the executor, derived from its state after the last fixed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnPhase {
    Idle,
    /// Pointing at the node, waiting for alignment or for the burn window.
    Targeting,
    /// Aligned and warping toward the burn window.
    WarpApproach,
    /// Burn window open but attitude error too large to throttle up.
    AlignForBurn,
    Burning,
    /// The run finished: the node(s) completed or the queue ran dry.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RunStage {
    Targeting,
    WarpApproach,
    Triggered { aligned: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExecutorState {
    Idle,
    Running { mode: ExecutionMode, stage: RunStage },
    Done,
}

/// Executes maneuver nodes from the host's queue.
#[derive(Debug)]
pub struct BurnExecutor {
    config: NodeExecutorConfig,
    autowarp: bool,
    state: ExecutorState,
    /// Nodes retired during the current run; never selected again.
    completed: Vec<NodeId>,
    removed: usize,
    /// Throttle and attitude still need releasing after `stop()`.
    shutdown_pending: bool,
    status: String,
}

impl BurnExecutor {
    pub fn new(config: NodeExecutorConfig, autowarp: bool) -> Self {
        Self {
            config,
            autowarp,
            state: ExecutorState::Idle,
            completed: Vec::new(),
            removed: 0,
            shutdown_pending: false,
            status: "Idle".to_string(),
        }
    }

    pub fn config(&self) -> &NodeExecutorConfig {
        &self.config
    }

    pub fn autowarp(&self) -> bool {
        self.autowarp
    }

    pub fn set_autowarp(&mut self, autowarp: bool) {
        self.autowarp = autowarp;
    }

    /// Arm against the current queue. Repeating the call with the running mode is a no-op.
    pub fn start(&mut self, mode: ExecutionMode) {
        if let ExecutorState::Running { mode: current, .. } = self.state {
            if current == mode {
                return;
            }
        }
        info!(?mode, "node executor armed");
        self.state = ExecutorState::Running {
            mode,
            stage: RunStage::Targeting,
        };
        self.completed.clear();
        self.removed = 0;
        self.shutdown_pending = false;
        self.status = "Armed".to_string();
    }

    /// Cancel the run. The next fixed update or throttle step zeroes the throttle first thing.
    pub fn stop(&mut self) {
        if matches!(self.state, ExecutorState::Running { .. }) {
            info!("node executor stopped");
            self.shutdown_pending = true;
        }
        self.state = ExecutorState::Idle;
        self.status = "Idle".to_string();
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, ExecutorState::Running { .. })
    }

    pub fn mode(&self) -> Option<ExecutionMode> {
        match self.state {
            ExecutorState::Running { mode, .. } => Some(mode),
            _ => None,
        }
    }

    pub fn phase(&self) -> BurnPhase {
        match self.state {
            ExecutorState::Idle => BurnPhase::Idle,
            ExecutorState::Done => BurnPhase::Done,
            ExecutorState::Running { stage, .. } => match stage {
                RunStage::Targeting => BurnPhase::Targeting,
                RunStage::WarpApproach => BurnPhase::WarpApproach,
                RunStage::Triggered { aligned: false } => BurnPhase::AlignForBurn,
                RunStage::Triggered { aligned: true } => BurnPhase::Burning,
            },
        }
    }

    pub fn is_burn_triggered(&self) -> bool {
        matches!(
            self.state,
            ExecutorState::Running {
                stage: RunStage::Triggered { .. },
                ..
            }
        )
    }

    /// Nodes retired during the current (or last) run, in completion order.
    pub fn completed_nodes(&self) -> &[NodeId] {
        &self.completed
    }

    /// Nodes this run asked the queue to delete.
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Burn time of the next pending node at full throttle, e.g. `"12.3 s"`, or `"N/A"`.
    pub fn next_node_burn_time(&self, telemetry: &dyn Telemetry, nodes: &dyn ManeuverQueue) -> String {
        let Some(node) = self.first_pending(nodes) else {
            return "N/A".to_string();
        };
        match estimate_burn(node.delta_v(), telemetry.max_thrust_accel()).burn_time {
            Some(time) => format!("{}s", to_si(time, 3)),
            None => "∞ s".to_string(),
        }
    }

    /// Advance the state machine by one fixed simulation step.
    pub fn fixed_update(&mut self, link: &mut VesselLink<'_>) {
        let ExecutorState::Running { mode, stage } = self.state else {
            if self.shutdown_pending {
                self.release(link);
            }
            return;
        };
        let Some(node) = self.active_node(mode, link) else {
            return;
        };

        link.attitude.set_target(
            NODE_FORWARD,
            AttitudeReference::ManeuverNode(node.id),
            Requester::NodeExecutor,
        );

        let telemetry = link.telemetry;
        let now = telemetry.now();
        let estimate = estimate_burn(node.delta_v(), telemetry.max_thrust_accel());
        let time_to_node = node.scheduled_time - now;
        let physics_running = telemetry.is_physics_running();
        let error = link.attitude.angle_error_to_target();

        let Some(burn_time) = estimate.burn_time else {
            if self.status != "No thrust available" {
                warn!(node = node.id.0, "no thrust available, burn cannot be scheduled");
            }
            self.status = "No thrust available".to_string();
            if !physics_running {
                link.warp.minimum_rate();
            }
            self.state = ExecutorState::Running {
                mode,
                stage: RunStage::Targeting,
            };
            return;
        };
        let lead = burn_time * self.config.lead_fraction;
        debug!(
            node = node.id.0,
            delta_v = estimate.delta_v,
            burn_time,
            time_to_node,
            error,
            "node executor tick"
        );

        let mut triggered = matches!(stage, RunStage::Triggered { .. });
        if time_to_node < lead {
            if !triggered {
                info!(node = node.id.0, time_to_node, burn_time, "triggering burn");
            }
            triggered = true;
            if !physics_running {
                link.warp.minimum_rate();
            }
        }

        let next = if triggered {
            RunStage::Triggered {
                aligned: error < self.config.burn_alignment_deg,
            }
        } else if self.autowarp {
            self.warp_policy(link, &node, lead, error, physics_running)
        } else {
            RunStage::Targeting
        };
        self.state = ExecutorState::Running { mode, stage: next };
        self.status = format!(
            "Node {}: Δv {}m/s, burn {}s, T{}{}s",
            node.id.0,
            to_si(estimate.delta_v, 3),
            to_si(burn_time, 3),
            if time_to_node >= 0.0 { "-" } else { "+" },
            to_si(time_to_node.abs(), 3),
        );
    }

    /// Write the throttle for this control step and return it.
    ///
    /// Only reads what the last fixed update decided. While the executor is not running the
    /// throttle belongs to someone else and is left untouched (0 is returned), except for the
    /// single zero write owed after `stop()`.
    pub fn drive(&self, link: &mut VesselLink<'_>) -> f64 {
        if !self.is_enabled() {
            if self.shutdown_pending {
                link.throttle.set_main_throttle(0.0);
            }
            return 0.0;
        }
        let throttle = self.throttle_command(link.telemetry, &*link.attitude, &*link.nodes);
        link.throttle.set_main_throttle(throttle);
        throttle
    }

    fn throttle_command(
        &self,
        telemetry: &dyn Telemetry,
        attitude: &dyn AttitudeControl,
        nodes: &dyn ManeuverQueue,
    ) -> f64 {
        if !self.is_burn_triggered() {
            return 0.0;
        }
        let error = attitude.angle_error_to_target();
        if !(error < self.config.burn_alignment_deg) {
            return 0.0;
        }
        let Some(node) = self.first_pending(nodes) else {
            return 0.0;
        };
        let accel = telemetry.max_thrust_accel();
        let estimate = estimate_burn(node.delta_v(), accel);
        let throttle = throttle_for(estimate.delta_v, accel);
        debug!(
            delta_v = estimate.delta_v,
            time_constant = estimate.time_constant,
            throttle_estimate = ?estimate.throttle_estimate,
            throttle,
            "burning"
        );
        throttle
    }

    fn warp_policy(
        &self,
        link: &mut VesselLink<'_>,
        node: &ManeuverNode,
        lead: f64,
        error: f64,
        physics_running: bool,
    ) -> RunStage {
        let tight = self.config.warp_alignment_deg;
        let loose = self.config.warp_alignment_loose_deg;
        if error < tight || (error < loose && !physics_running) {
            let instant = node.scheduled_time - lead - self.config.lead_time;
            debug!(node = node.id.0, instant, "warping to node");
            link.warp.warp_to(instant);
            RunStage::WarpApproach
        } else {
            if !physics_running && error > loose {
                info!(node = node.id.0, error, "misaligned, dropping out of warp");
                link.warp.minimum_rate();
            }
            RunStage::Targeting
        }
    }

    /// Earliest queued node not yet retired by this run.
    fn first_pending(&self, nodes: &dyn ManeuverQueue) -> Option<ManeuverNode> {
        nodes
            .nodes()
            .into_iter()
            .find(|node| !self.completed.contains(&node.id))
    }

    /// Retire every finished node at the head of the queue and return the node to work on.
    /// Returns `None` once the run is over; the executor is then disabled with throttle zeroed.
    fn active_node(
        &mut self,
        mode: ExecutionMode,
        link: &mut VesselLink<'_>,
    ) -> Option<ManeuverNode> {
        loop {
            let Some(node) = self.first_pending(&*link.nodes) else {
                info!("maneuver queue empty, node executor turning off");
                self.finish(link, "No maneuver nodes");
                return None;
            };
            if node.delta_v() >= self.config.precision {
                return Some(node);
            }

            info!(node = node.id.0, delta_v = node.delta_v(), "node complete");
            self.completed.push(node.id);
            if self.config.remove_nodes {
                link.nodes.remove(node.id);
                self.removed += 1;
            }
            self.state = ExecutorState::Running {
                mode,
                stage: RunStage::Targeting,
            };

            match mode {
                ExecutionMode::Single => {
                    info!("node executor turning off after executing one node");
                    self.finish(link, "Node executed");
                    return None;
                }
                ExecutionMode::All => {
                    if self.first_pending(&*link.nodes).is_none() {
                        info!("node executor turning off after executing all nodes");
                        self.finish(link, "All nodes executed");
                        return None;
                    }
                    info!("node executor moving on to next node");
                }
            }
        }
    }

    fn finish(&mut self, link: &mut VesselLink<'_>, status: &str) {
        self.state = ExecutorState::Done;
        self.status = status.to_string();
        self.release(link);
    }

    fn release(&mut self, link: &mut VesselLink<'_>) {
        link.throttle.set_main_throttle(0.0);
        link.attitude.release(Requester::NodeExecutor);
        self.shutdown_pending = false;
    }
}

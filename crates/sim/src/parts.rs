//! Stand-in collaborators. Each one is a plain struct with public state so tests can inspect
//! what the controllers asked for and nudge the world between ticks.

use autopilot_core::vector::{self, Vector3};
use autopilot_vehicle::{
    AttitudeControl, AttitudeReference, LaunchTiming, ManeuverNode, ManeuverQueue,
    NavigationTarget, NodeId, Requester, SelectedTarget, Staging, TargetOrbit, Telemetry,
    ThrottleControl, TimeWarp,
};

/// Telemetry snapshot refreshed by `SimVessel::step`.
#[derive(Debug, Clone)]
pub struct SimTelemetry {
    pub time: f64,
    pub tick_duration: f64,
    pub max_thrust_accel: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub north: Vector3,
    pub east: Vector3,
    pub up: Vector3,
    pub body_offset: Vector3,
    pub body_axis: Vector3,
    pub body_name: String,
    pub physics_running: bool,
    pub landed: bool,
}

impl Telemetry for SimTelemetry {
    fn now(&self) -> f64 {
        self.time
    }

    fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    fn max_thrust_accel(&self) -> f64 {
        self.max_thrust_accel
    }

    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn altitude(&self) -> f64 {
        self.altitude
    }

    fn north(&self) -> Vector3 {
        self.north
    }

    fn east(&self) -> Vector3 {
        self.east
    }

    fn up(&self) -> Vector3 {
        self.up
    }

    fn body_offset(&self) -> Vector3 {
        self.body_offset
    }

    fn body_axis(&self) -> Vector3 {
        self.body_axis
    }

    fn body_name(&self) -> &str {
        &self.body_name
    }

    fn is_physics_running(&self) -> bool {
        self.physics_running
    }

    fn is_landed(&self) -> bool {
        self.landed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeRequest {
    pub direction: Vector3,
    pub reference: AttitudeReference,
    pub requester: Requester,
}

/// Attitude hold that slews the pointing vector toward the resolved target at a fixed rate.
#[derive(Debug, Clone)]
pub struct SimAttitude {
    pub pointing: Vector3,
    pub slew_rate_deg_s: f64,
    /// Forces `angle_error_to_target` to a fixed value when set.
    pub error_override: Option<f64>,
    pub request: Option<AttitudeRequest>,
    pub releases: usize,
    resolved: Option<Vector3>,
    node_directions: Vec<(NodeId, Vector3)>,
    frame: [Vector3; 3],
}

impl SimAttitude {
    pub fn new(pointing: Vector3, slew_rate_deg_s: f64) -> Self {
        Self {
            pointing: vector::normalize(&pointing).unwrap_or([0.0, 0.0, 1.0]),
            slew_rate_deg_s,
            error_override: None,
            request: None,
            releases: 0,
            resolved: None,
            node_directions: Vec::new(),
            frame: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Current target direction in the inertial frame, if one is held.
    pub fn resolved_target(&self) -> Option<Vector3> {
        self.resolved
    }

    /// Node whose burn frame the held request points along.
    pub fn steered_node(&self) -> Option<NodeId> {
        match self.request?.reference {
            AttitudeReference::ManeuverNode(id) => Some(id),
            _ => None,
        }
    }

    /// Refresh the node and local-frame caches used to resolve frame-relative targets.
    pub(crate) fn sync(&mut self, nodes: &[ManeuverNode], frame: [Vector3; 3]) {
        self.node_directions = nodes
            .iter()
            .filter_map(|node| vector::normalize(&node.burn_vector).map(|dir| (node.id, dir)))
            .collect();
        self.frame = frame;
        self.resolved = self.request.and_then(|request| self.resolve(&request));
    }

    fn resolve(&self, request: &AttitudeRequest) -> Option<Vector3> {
        match request.reference {
            AttitudeReference::ManeuverNode(id) => self
                .node_directions
                .iter()
                .find(|(node, _)| *node == id)
                .map(|(_, dir)| *dir),
            AttitudeReference::Inertial => vector::normalize(&request.direction),
            AttitudeReference::SurfaceNorthEastUp => {
                let [north, east, up] = &self.frame;
                let [n, e, u] = request.direction;
                let world = vector::add(
                    &vector::add(&vector::scale(north, n), &vector::scale(east, e)),
                    &vector::scale(up, u),
                );
                vector::normalize(&world)
            }
        }
    }

    /// Rotate the pointing vector toward the target by at most `slew_rate × dt` degrees.
    pub(crate) fn slew(&mut self, dt: f64) {
        let Some(target) = self.resolved else {
            return;
        };
        let angle = vector::angle_between_deg(&self.pointing, &target);
        let max_step = self.slew_rate_deg_s * dt;
        if angle <= max_step {
            self.pointing = target;
            return;
        }
        let fraction = max_step / angle;
        let blended = vector::add(
            &self.pointing,
            &vector::scale(&vector::sub(&target, &self.pointing), fraction),
        );
        self.pointing = vector::normalize(&blended).unwrap_or(target);
    }
}

impl AttitudeControl for SimAttitude {
    fn set_target(&mut self, direction: Vector3, reference: AttitudeReference, requester: Requester) {
        let request = AttitudeRequest {
            direction,
            reference,
            requester,
        };
        self.resolved = self.resolve(&request);
        self.request = Some(request);
    }

    fn angle_error_to_target(&self) -> f64 {
        if let Some(error) = self.error_override {
            return error;
        }
        self.resolved
            .map(|target| vector::angle_between_deg(&self.pointing, &target))
            .unwrap_or(0.0)
    }

    fn release(&mut self, requester: Requester) {
        if self.request.map(|r| r.requester) == Some(requester) {
            self.request = None;
            self.resolved = None;
        }
        self.releases += 1;
    }
}

/// Time acceleration that jumps toward the requested instant in steps of `max_rate × tick`.
#[derive(Debug, Clone)]
pub struct SimWarp {
    pub max_rate: f64,
    pub target: Option<f64>,
    pub last_request: Option<f64>,
    pub warp_requests: usize,
    pub minimum_rate_calls: usize,
}

impl SimWarp {
    pub fn new(max_rate: f64) -> Self {
        Self {
            max_rate,
            target: None,
            last_request: None,
            warp_requests: 0,
            minimum_rate_calls: 0,
        }
    }

    /// Length of the next step starting at `now` with base step `tick`.
    pub(crate) fn step_length(&mut self, now: f64, tick: f64) -> f64 {
        match self.target {
            Some(instant) if instant > now + tick => (self.max_rate * tick).min(instant - now),
            _ => {
                self.target = None;
                tick
            }
        }
    }

    pub fn is_warping(&self, now: f64, tick: f64) -> bool {
        matches!(self.target, Some(instant) if instant > now + tick)
    }
}

impl TimeWarp for SimWarp {
    fn warp_to(&mut self, instant: f64) {
        self.target = Some(instant);
        self.last_request = Some(instant);
        self.warp_requests += 1;
    }

    fn minimum_rate(&mut self) {
        self.target = None;
        self.minimum_rate_calls += 1;
    }
}

/// Maneuver queue kept sorted by scheduled time.
#[derive(Debug, Clone, Default)]
pub struct SimNodeQueue {
    nodes: Vec<ManeuverNode>,
    next_id: u64,
    pub removed: Vec<NodeId>,
}

impl SimNodeQueue {
    pub fn add(&mut self, burn_vector: Vector3, scheduled_time: f64) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.push(ManeuverNode {
            id,
            burn_vector,
            scheduled_time,
        });
        self.nodes
            .sort_by(|a, b| a.scheduled_time.total_cmp(&b.scheduled_time));
        id
    }

    pub fn set_burn_vector(&mut self, id: NodeId, burn_vector: Vector3) {
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
            node.burn_vector = burn_vector;
        }
    }

    /// Delete a node the way a user would, outside the controllers.
    pub fn delete_externally(&mut self, id: NodeId) {
        self.nodes.retain(|node| node.id != id);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn as_slice(&self) -> &[ManeuverNode] {
        &self.nodes
    }

    /// Apply `dv` along `direction` to the remaining burn vector of `target`, or of the earliest
    /// node when no node is being steered for.
    pub(crate) fn apply_delta_v(&mut self, target: Option<NodeId>, direction: &Vector3, dv: f64) {
        let node = match target {
            Some(id) => self.nodes.iter_mut().find(|node| node.id == id),
            None => self.nodes.first_mut(),
        };
        if let Some(node) = node {
            node.burn_vector = vector::sub(&node.burn_vector, &vector::scale(direction, dv));
        }
    }
}

impl ManeuverQueue for SimNodeQueue {
    fn nodes(&self) -> Vec<ManeuverNode> {
        self.nodes.clone()
    }

    fn remove(&mut self, id: NodeId) {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != id);
        if self.nodes.len() != before {
            self.removed.push(id);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimThrottle {
    pub throttle: f64,
    pub writes: usize,
}

impl ThrottleControl for SimThrottle {
    fn set_main_throttle(&mut self, throttle: f64) {
        self.throttle = throttle.clamp(0.0, 1.0);
        self.writes += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimStaging {
    pub activations: usize,
}

impl Staging for SimStaging {
    fn activate_next_stage(&mut self) {
        self.activations += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimNavTarget {
    pub selected: Option<SelectedTarget>,
    pub direction: Option<Vector3>,
    pub direction_updates: usize,
}

impl NavigationTarget for SimNavTarget {
    fn selected(&self) -> Option<SelectedTarget> {
        self.selected.clone()
    }

    fn set_direction_target(&mut self, owner: &str) {
        self.selected = Some(SelectedTarget::Direction {
            owner: owner.to_string(),
        });
        self.direction = None;
    }

    fn update_direction(&mut self, direction: Vector3) {
        if matches!(self.selected, Some(SelectedTarget::Direction { .. })) {
            self.direction = Some(direction);
            self.direction_updates += 1;
        }
    }

    fn unset(&mut self) {
        self.selected = None;
        self.direction = None;
    }
}

/// Launch timing that counts down to fixed absolute instants, repeating once per body rotation.
#[derive(Debug, Clone)]
pub struct SimTiming {
    pub plane_crossing_at: f64,
    pub phase_angle_at: f64,
    pub rotation_period: f64,
    pub(crate) now: f64,
}

impl SimTiming {
    fn remaining(&self, instant: f64) -> f64 {
        let remaining = instant - self.now;
        if remaining < 0.0 && self.rotation_period > 0.0 {
            remaining.rem_euclid(self.rotation_period)
        } else {
            remaining
        }
    }
}

impl LaunchTiming for SimTiming {
    fn time_to_plane_crossing(
        &self,
        _body: &str,
        _latitude: f64,
        _longitude: f64,
        _target: &TargetOrbit,
    ) -> f64 {
        self.remaining(self.plane_crossing_at)
    }

    fn time_to_phase_angle(
        &self,
        _phase_angle: f64,
        _body: &str,
        _longitude: f64,
        _target: &TargetOrbit,
    ) -> f64 {
        self.remaining(self.phase_angle_at)
    }
}

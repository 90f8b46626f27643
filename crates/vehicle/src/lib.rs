//! Interfaces to the systems the autopilot steers but does not own.
//!
//! Physics, attitude hold, time acceleration, staging, and the maneuver queue all live outside the
//! controllers. Each is reached through a narrow trait so the controllers can be driven by a real
//! host or by stand-ins. A host lends its collaborators for one tick at a time through
//! [`VesselLink`].

use autopilot_core::vector::{self, Vector3};
use serde::{Deserialize, Serialize};

/// Stable identifier of a maneuver node inside the host's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Snapshot of one planned burn, re-read from the queue every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverNode {
    pub id: NodeId,
    /// Remaining delta-v (m/s) still to be applied, evaluated against the current orbit.
    pub burn_vector: Vector3,
    /// Absolute simulation time (s) the burn is centered on.
    pub scheduled_time: f64,
}

impl ManeuverNode {
    /// Remaining delta-v magnitude.
    pub fn delta_v(&self) -> f64 {
        vector::norm(&self.burn_vector)
    }
}

/// Orbit of a selected target body or vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOrbit {
    pub name: String,
    /// Unsigned inclination in degrees.
    pub inclination_deg: f64,
    /// Unit orbital normal in the same inertial frame as [`Telemetry::body_offset`].
    pub normal: Vector3,
}

/// Frame an attitude request is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttitudeReference {
    /// Burn frame of a maneuver node; forward points along the node's burn vector.
    ManeuverNode(NodeId),
    /// Inertial frame of the central body.
    Inertial,
    /// Local north/east/up frame at the vessel's position.
    SurfaceNorthEastUp,
}

/// Owner of an attitude request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    NodeExecutor,
    AscentGuidance,
}

/// Navigation target currently selected on the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedTarget {
    /// A bare direction marker published by `owner`.
    Direction { owner: String },
    /// A body or vessel on a known orbit.
    Orbiting(TargetOrbit),
}

/// Read-only vehicle state for the current tick.
pub trait Telemetry {
    /// Absolute simulation time (s).
    fn now(&self) -> f64;
    /// Length of one fixed simulation step (s) at the current time rate.
    fn tick_duration(&self) -> f64;
    /// Acceleration (m/s²) available at full throttle.
    fn max_thrust_accel(&self) -> f64;
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
    /// Altitude above sea level (m).
    fn altitude(&self) -> f64;
    fn north(&self) -> Vector3;
    fn east(&self) -> Vector3;
    fn up(&self) -> Vector3;
    /// Vessel position relative to the central body's center.
    fn body_offset(&self) -> Vector3;
    /// Rotation axis ("up") of the central body.
    fn body_axis(&self) -> Vector3;
    fn body_name(&self) -> &str;
    /// `true` when time runs at the normal physics rate, i.e. no time acceleration.
    fn is_physics_running(&self) -> bool;
    /// `true` while the vessel sits on the surface before launch.
    fn is_landed(&self) -> bool;
}

/// Attitude hold controller. The autopilot picks targets; the host converges on them.
pub trait AttitudeControl {
    fn set_target(&mut self, direction: Vector3, reference: AttitudeReference, requester: Requester);
    /// Angular error (deg) between the current pointing and the active target.
    fn angle_error_to_target(&self) -> f64;
    /// Drop the request held by `requester`, if any.
    fn release(&mut self, requester: Requester);
}

/// Time acceleration scheduler. Requests are fire-and-forget.
pub trait TimeWarp {
    fn warp_to(&mut self, instant: f64);
    fn minimum_rate(&mut self);
}

/// Ordered queue of planned maneuvers owned by the trajectory model.
pub trait ManeuverQueue {
    /// Pending nodes ordered by scheduled time, earliest first.
    fn nodes(&self) -> Vec<ManeuverNode>;
    fn remove(&mut self, id: NodeId);

    fn peek_earliest(&self) -> Option<ManeuverNode> {
        self.nodes().into_iter().next()
    }
}

/// Main throttle actuator, `0.0..=1.0`.
pub trait ThrottleControl {
    fn set_main_throttle(&mut self, throttle: f64);
}

pub trait Staging {
    fn activate_next_stage(&mut self);
}

/// Navigation target selection (the navball marker).
pub trait NavigationTarget {
    fn selected(&self) -> Option<SelectedTarget>;
    /// Select a direction target owned by `owner`, replacing any current selection.
    fn set_direction_target(&mut self, owner: &str);
    /// Move the direction target; ignored when no direction target is selected.
    fn update_direction(&mut self, direction: Vector3);
    fn unset(&mut self);

    fn target_orbit(&self) -> Option<TargetOrbit> {
        match self.selected() {
            Some(SelectedTarget::Orbiting(orbit)) => Some(orbit),
            _ => None,
        }
    }
}

/// Desired flight-path angle as a function of altitude.
pub trait AscentPath {
    /// Flight-path angle above the horizon (deg) at `altitude` (m).
    fn flight_path_angle(&self, altitude: f64) -> f64;
}

/// Launch timing solver for plane and phase-angle windows.
pub trait LaunchTiming {
    /// Seconds until the launch site passes under the target orbit plane.
    fn time_to_plane_crossing(
        &self,
        body: &str,
        latitude: f64,
        longitude: f64,
        target: &TargetOrbit,
    ) -> f64;
    /// Seconds until the target leads the launch site by `phase_angle` degrees.
    fn time_to_phase_angle(
        &self,
        phase_angle: f64,
        body: &str,
        longitude: f64,
        target: &TargetOrbit,
    ) -> f64;
}

/// Collaborators lent to the controllers for one tick.
pub struct VesselLink<'a> {
    pub telemetry: &'a dyn Telemetry,
    pub attitude: &'a mut dyn AttitudeControl,
    pub warp: &'a mut dyn TimeWarp,
    pub nodes: &'a mut dyn ManeuverQueue,
    pub throttle: &'a mut dyn ThrottleControl,
    pub staging: &'a mut dyn Staging,
    pub target: &'a mut dyn NavigationTarget,
    pub timing: &'a dyn LaunchTiming,
}

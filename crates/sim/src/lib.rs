//! Kinematic stand-in vessel for exercising the autopilot without a physics engine.
//!
//! The model is crude: a spherical rotating body, a vessel that either sits on the
//! pad or climbs straight up, an attitude that slews at a fixed rate, and thrust that eats
//! directly into the steered node's remaining burn vector. It is good enough to close the loop
//! around both controllers.

pub mod parts;

use autopilot_core::vector::{self, Vector3};
use autopilot_vehicle::{NodeId, SelectedTarget, TargetOrbit, VesselLink};
use serde::Deserialize;
use thiserror::Error;

pub use parts::{
    AttitudeRequest, SimAttitude, SimNavTarget, SimNodeQueue, SimStaging, SimTelemetry,
    SimThrottle, SimTiming, SimWarp,
};

/// Physical parameters of the stand-in vessel and its central body.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VesselParams {
    /// Fixed physics step (s) at normal time rate.
    pub tick: f64,
    pub start_time: f64,
    pub max_thrust_accel: f64,
    pub slew_rate_deg_s: f64,
    pub max_warp_rate: f64,
    pub pointing: Vector3,
    pub body_name: String,
    pub body_radius: f64,
    pub body_rotation_period: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub landed: bool,
    /// Vertical speed (m/s) after staging off the pad.
    pub climb_rate: f64,
}

impl Default for VesselParams {
    fn default() -> Self {
        Self {
            tick: 0.02,
            start_time: 0.0,
            max_thrust_accel: 10.0,
            slew_rate_deg_s: 15.0,
            max_warp_rate: 100.0,
            pointing: [1.0, 0.0, 0.0],
            body_name: "Kerbin".to_string(),
            body_radius: 600_000.0,
            body_rotation_period: 21_549.425,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 80_000.0,
            landed: false,
            climb_rate: 50.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("tick must be positive, got {0}")]
    InvalidTick(f64),
    #[error("max warp rate must be at least 1, got {0}")]
    InvalidWarpRate(f64),
    #[error("body radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// A vessel whose parts implement every collaborator trait.
#[derive(Debug, Clone)]
pub struct SimVessel {
    pub params: VesselParams,
    pub telemetry: SimTelemetry,
    pub attitude: SimAttitude,
    pub warp: SimWarp,
    pub nodes: SimNodeQueue,
    pub throttle: SimThrottle,
    pub staging: SimStaging,
    pub target: SimNavTarget,
    pub timing: SimTiming,
    steps: u64,
}

impl SimVessel {
    pub fn new(params: VesselParams) -> Result<Self, SimError> {
        if !(params.tick > 0.0) {
            return Err(SimError::InvalidTick(params.tick));
        }
        if !(params.max_warp_rate >= 1.0) {
            return Err(SimError::InvalidWarpRate(params.max_warp_rate));
        }
        if !(params.body_radius > 0.0) {
            return Err(SimError::InvalidRadius(params.body_radius));
        }

        let mut telemetry = SimTelemetry {
            time: params.start_time,
            tick_duration: params.tick,
            max_thrust_accel: params.max_thrust_accel,
            latitude: params.latitude,
            longitude: params.longitude,
            altitude: params.altitude,
            north: vector::ZERO,
            east: vector::ZERO,
            up: vector::ZERO,
            body_offset: vector::ZERO,
            body_axis: [0.0, 0.0, 1.0],
            body_name: params.body_name.clone(),
            physics_running: true,
            landed: params.landed,
        };
        update_frame(&mut telemetry, params.body_radius);

        Ok(Self {
            attitude: SimAttitude::new(params.pointing, params.slew_rate_deg_s),
            warp: SimWarp::new(params.max_warp_rate),
            nodes: SimNodeQueue::default(),
            throttle: SimThrottle::default(),
            staging: SimStaging::default(),
            target: SimNavTarget::default(),
            timing: SimTiming {
                plane_crossing_at: f64::INFINITY,
                phase_angle_at: f64::INFINITY,
                rotation_period: params.body_rotation_period,
                now: params.start_time,
            },
            telemetry,
            params,
            steps: 0,
        })
    }

    pub fn add_node(&mut self, burn_vector: Vector3, scheduled_time: f64) -> NodeId {
        self.nodes.add(burn_vector, scheduled_time)
    }

    pub fn select_target_orbit(&mut self, orbit: TargetOrbit) {
        self.target.selected = Some(SelectedTarget::Orbiting(orbit));
    }

    pub fn clear_target(&mut self) {
        self.target.selected = None;
        self.target.direction = None;
    }

    pub fn now(&self) -> f64 {
        self.telemetry.time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Lend every part to the controllers for one tick.
    pub fn link(&mut self) -> VesselLink<'_> {
        let frame = [self.telemetry.north, self.telemetry.east, self.telemetry.up];
        self.attitude.sync(self.nodes.as_slice(), frame);
        self.timing.now = self.telemetry.time;
        VesselLink {
            telemetry: &self.telemetry,
            attitude: &mut self.attitude,
            warp: &mut self.warp,
            nodes: &mut self.nodes,
            throttle: &mut self.throttle,
            staging: &mut self.staging,
            target: &mut self.target,
            timing: &self.timing,
        }
    }

    /// Advance the world by one fixed step, warped if a warp request is pending.
    pub fn step(&mut self) {
        let tick = self.params.tick;
        let now = self.telemetry.time;
        let dt = self.warp.step_length(now, tick);
        let physics_running = dt <= tick;

        if physics_running {
            self.attitude.slew(dt);
            let dv = self.throttle.throttle * self.telemetry.max_thrust_accel * dt;
            if dv > 0.0 {
                let pointing = self.attitude.pointing;
                let steered = self.attitude.steered_node();
                self.nodes.apply_delta_v(steered, &pointing, dv);
            }
        }

        if self.telemetry.landed && self.staging.activations > 0 {
            self.telemetry.landed = false;
        }
        if !self.telemetry.landed && self.staging.activations > 0 {
            self.telemetry.altitude += self.params.climb_rate * dt;
        }

        self.telemetry.time = now + dt;
        if self.params.body_rotation_period > 0.0 {
            let spin = 360.0 * dt / self.params.body_rotation_period;
            self.telemetry.longitude = autopilot_core::angles::wrap_180(self.telemetry.longitude + spin);
        }
        update_frame(&mut self.telemetry, self.params.body_radius);

        let warping = self.warp.is_warping(self.telemetry.time, tick);
        self.telemetry.physics_running = !warping;
        self.telemetry.tick_duration = if warping {
            self.warp.max_rate * tick
        } else {
            tick
        };
        self.steps += 1;
    }
}

/// Recompute the local north/east/up frame and body offset from latitude and longitude.
fn update_frame(telemetry: &mut SimTelemetry, body_radius: f64) {
    let lat = telemetry.latitude.to_radians();
    let lon = telemetry.longitude.to_radians();
    let up = [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()];
    telemetry.up = up;
    telemetry.east = [-lon.sin(), lon.cos(), 0.0];
    telemetry.north = [-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos()];
    telemetry.body_offset = vector::scale(&up, body_radius + telemetry.altitude);
}

//! Launch window guidance controller.
//!
//! Two independent duties run on every fixed update:
//!
//! - While the guidance direction marker is the selected navigation target, publish the
//!   direction the ascent profile wants at the current altitude.
//! - While a countdown is active, time the launch for a target plane or phase angle, keep time
//!   warp parked just ahead of the window, and stage exactly once at T-0.

use autopilot_config::AscentGuidanceConfig;
use autopilot_core::format::to_si;
use autopilot_vehicle::{AscentPath, NavigationTarget, SelectedTarget, VesselLink};
use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::{ascent_direction, heading_for_inclination, plane_matching_inclination};

/// Owner label of the direction marker published by this controller.
pub const GUIDANCE_TARGET_NAME: &str = "Ascent Path Guidance";

/// Countdown ticks before the window at which the launch fires.
const TRIGGER_TICKS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchGuidanceState {
    Idle,
    CountdownToPlane,
    CountdownToRendezvous,
}

/// Reasons a countdown request is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuidanceError {
    #[error("launch countdown needs an orbiting target")]
    NoTarget,
    #[error("another launch countdown is already running ({0:?})")]
    CountdownActive(LaunchGuidanceState),
}

pub struct LaunchWindowGuidance {
    config: AscentGuidanceConfig,
    path: Box<dyn AscentPath>,
    autowarp: bool,
    armed: bool,
    state: LaunchGuidanceState,
    time_to_launch: Option<f64>,
    launches: usize,
    status: String,
}

impl LaunchWindowGuidance {
    pub fn new(config: AscentGuidanceConfig, path: Box<dyn AscentPath>, autowarp: bool) -> Self {
        Self {
            config,
            path,
            autowarp,
            armed: false,
            state: LaunchGuidanceState::Idle,
            time_to_launch: None,
            launches: 0,
            status: "Idle".to_string(),
        }
    }

    pub fn config(&self) -> &AscentGuidanceConfig {
        &self.config
    }

    pub fn state(&self) -> LaunchGuidanceState {
        self.state
    }

    pub fn desired_inclination(&self) -> f64 {
        self.config.desired_inclination
    }

    pub fn set_desired_inclination(&mut self, inclination_deg: f64) {
        self.config.desired_inclination = inclination_deg;
    }

    pub fn set_launch_phase_angle(&mut self, phase_angle_deg: f64) {
        self.config.launch_phase_angle = phase_angle_deg;
    }

    pub fn set_countdown_margin(&mut self, margin_s: f64) {
        self.config.countdown_margin = margin_s;
    }

    pub fn set_autowarp(&mut self, autowarp: bool) {
        self.autowarp = autowarp;
    }

    /// Allow the countdown to warp time and to stage at T-0.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds to the launch window as of the last countdown tick.
    pub fn time_to_launch(&self) -> Option<f64> {
        self.time_to_launch
    }

    /// Stages fired by countdowns so far.
    pub fn launches_triggered(&self) -> usize {
        self.launches
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Select the guidance direction marker as the navigation target.
    pub fn show_direction_marker(&self, target: &mut dyn NavigationTarget) {
        target.set_direction_target(GUIDANCE_TARGET_NAME);
    }

    /// Release the direction marker if it is still ours; other selections are left alone.
    pub fn hide_direction_marker(&self, target: &mut dyn NavigationTarget) {
        if self.is_marker_active(target) {
            target.unset();
        }
    }

    pub fn is_marker_active(&self, target: &dyn NavigationTarget) -> bool {
        matches!(
            target.selected(),
            Some(SelectedTarget::Direction { owner }) if owner == GUIDANCE_TARGET_NAME
        )
    }

    /// Start counting down to the moment the launch site passes under the target's plane.
    pub fn launch_to_plane(&mut self, target: &dyn NavigationTarget) -> Result<(), GuidanceError> {
        self.begin_countdown(LaunchGuidanceState::CountdownToPlane, target)
    }

    /// Start counting down to the configured phase angle to the target.
    pub fn launch_to_rendezvous(
        &mut self,
        target: &dyn NavigationTarget,
    ) -> Result<(), GuidanceError> {
        self.begin_countdown(LaunchGuidanceState::CountdownToRendezvous, target)
    }

    fn begin_countdown(
        &mut self,
        state: LaunchGuidanceState,
        target: &dyn NavigationTarget,
    ) -> Result<(), GuidanceError> {
        if self.state != LaunchGuidanceState::Idle {
            return Err(GuidanceError::CountdownActive(self.state));
        }
        let orbit = target.target_orbit().ok_or(GuidanceError::NoTarget)?;
        info!(?state, target = %orbit.name, "launch countdown started");
        self.state = state;
        Ok(())
    }

    /// Abandon any countdown. No warp, staging, or target changes.
    pub fn cancel_countdown(&mut self) {
        if self.state != LaunchGuidanceState::Idle {
            info!("launch countdown cancelled");
        }
        self.reset_countdown("Idle");
    }

    /// Shut the module down: release our marker and drop any countdown.
    pub fn stop(&mut self, target: &mut dyn NavigationTarget) {
        self.hide_direction_marker(target);
        self.reset_countdown("Idle");
    }

    pub fn fixed_update(&mut self, link: &mut VesselLink<'_>) {
        self.publish_direction(link);
        self.update_countdown(link);
    }

    fn publish_direction(&self, link: &mut VesselLink<'_>) {
        if !self.is_marker_active(&*link.target) {
            return;
        }
        let telemetry = link.telemetry;
        let angle = self.path.flight_path_angle(telemetry.altitude());
        let heading = heading_for_inclination(self.config.desired_inclination, telemetry.latitude());
        let direction = ascent_direction(
            heading,
            angle,
            &telemetry.north(),
            &telemetry.east(),
            &telemetry.up(),
        );
        link.target.update_direction(direction);
    }

    fn update_countdown(&mut self, link: &mut VesselLink<'_>) {
        if self.state == LaunchGuidanceState::Idle {
            return;
        }
        let Some(orbit) = link.target.target_orbit() else {
            info!("launch target lost, countdown cancelled");
            self.reset_countdown("Select a target to launch to");
            return;
        };
        let telemetry = link.telemetry;
        if !telemetry.is_landed() {
            return;
        }

        let (time_to_launch, label) = match self.state {
            LaunchGuidanceState::CountdownToPlane => (
                link.timing.time_to_plane_crossing(
                    telemetry.body_name(),
                    telemetry.latitude(),
                    telemetry.longitude(),
                    &orbit,
                ),
                "target plane",
            ),
            LaunchGuidanceState::CountdownToRendezvous => (
                link.timing.time_to_phase_angle(
                    self.config.launch_phase_angle,
                    telemetry.body_name(),
                    telemetry.longitude(),
                    &orbit,
                ),
                "rendezvous",
            ),
            LaunchGuidanceState::Idle => return,
        };
        self.time_to_launch = Some(time_to_launch);

        let launch_time = telemetry.now() + time_to_launch;
        if self.armed && self.autowarp {
            link.warp.warp_to(launch_time - self.config.countdown_margin);
        }

        if self.state == LaunchGuidanceState::CountdownToPlane {
            self.config.desired_inclination = plane_matching_inclination(
                orbit.inclination_deg,
                &orbit.normal,
                &telemetry.body_offset(),
                &telemetry.body_axis(),
            );
        }

        self.status = format!("Launching to {label}: T-{}s", to_si(time_to_launch, 3));
        debug!(time_to_launch, launch_time, "launch countdown");

        if time_to_launch < TRIGGER_TICKS * telemetry.tick_duration() {
            if self.armed {
                info!(target = %orbit.name, "launch window reached, staging");
                link.staging.activate_next_stage();
                self.launches += 1;
                self.reset_countdown("Launched");
            } else {
                info!("launch window reached while disarmed, countdown ends");
                self.reset_countdown("Launch window passed");
            }
        }
    }

    fn reset_countdown(&mut self, status: &str) {
        self.state = LaunchGuidanceState::Idle;
        self.time_to_launch = None;
        self.status = status.to_string();
    }
}

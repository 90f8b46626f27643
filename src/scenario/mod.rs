use std::fs::File;
use std::path::Path;

use autopilot_core::vector::Vector3;
use autopilot_sim::{SimError, SimVessel, VesselParams};
use autopilot_vehicle::TargetOrbit;
use serde::Deserialize;
use thiserror::Error;

/// A stand-in vessel, its maneuver queue, and the launch target, as read from YAML.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vessel: VesselParams,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub target: Option<TargetOrbit>,
    #[serde(default)]
    pub timing: Option<TimingConfig>,
    /// Overrides the attitude error the stand-in reports, in degrees.
    #[serde(default)]
    pub attitude_error_deg: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    pub burn_vector: Vector3,
    pub scheduled_time: f64,
}

/// Absolute instants at which the launch windows open.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TimingConfig {
    #[serde(default)]
    pub plane_crossing_at: Option<f64>,
    #[serde(default)]
    pub phase_angle_at: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read YAML: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid vessel parameters: {0}")]
    Vessel(#[from] SimError),
    #[error("node {index} has a non-finite burn vector or time")]
    InvalidNode { index: usize },
}

pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ScenarioError> {
    let reader = File::open(path)?;
    Ok(serde_yaml::from_reader(reader)?)
}

impl Scenario {
    /// Build the stand-in vessel with every node queued and the target selected.
    pub fn build_vessel(&self) -> Result<SimVessel, ScenarioError> {
        let mut vessel = SimVessel::new(self.vessel.clone())?;
        for (index, node) in self.nodes.iter().enumerate() {
            let finite = node.burn_vector.iter().all(|c| c.is_finite())
                && node.scheduled_time.is_finite();
            if !finite {
                return Err(ScenarioError::InvalidNode { index });
            }
            vessel.add_node(node.burn_vector, node.scheduled_time);
        }
        if let Some(target) = &self.target {
            vessel.select_target_orbit(target.clone());
        }
        if let Some(timing) = &self.timing {
            if let Some(at) = timing.plane_crossing_at {
                vessel.timing.plane_crossing_at = at;
            }
            if let Some(at) = timing.phase_angle_at {
                vessel.timing.phase_angle_at = at;
            }
        }
        vessel.attitude.error_override = self.attitude_error_deg;
        Ok(vessel)
    }
}

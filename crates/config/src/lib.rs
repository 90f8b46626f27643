//! Configuration models and loaders for the orbital autopilot.
//!
//! A single [`AutopilotConfig`] value carries every tunable of both controllers. Each field has
//! exactly one writer at runtime: `autowarp` belongs to the `Autopilot` driver, which fans it out
//! to both controllers; `ascent.desired_inclination` belongs to launch window guidance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest attitude error (deg) at which a burn may throttle up.
pub const MAX_BURN_ALIGNMENT_DEG: f64 = 5.0;

/// Top-level configuration shared by the maneuver executor and launch window guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Allow the controllers to request time acceleration.
    pub autowarp: bool,
    pub node: NodeExecutorConfig,
    pub ascent: AscentGuidanceConfig,
    pub ascent_path: AscentPathConfig,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            autowarp: true,
            node: NodeExecutorConfig::default(),
            ascent: AscentGuidanceConfig::default(),
            ascent_path: AscentPathConfig::default(),
        }
    }
}

/// Tunables of the maneuver burn executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeExecutorConfig {
    /// Margin (s) before the computed burn start at which warping stops.
    pub lead_time: f64,
    /// Remove a node from the queue once it is complete.
    pub remove_nodes: bool,
    /// Fraction of the estimated burn duration to start ahead of the node.
    pub lead_fraction: f64,
    /// Remaining delta-v (m/s) below which a burn counts as complete.
    pub precision: f64,
    /// Attitude error (deg) under which warping is always allowed.
    pub warp_alignment_deg: f64,
    /// Attitude error (deg) under which warping may continue once already warping.
    pub warp_alignment_loose_deg: f64,
    /// Attitude error (deg) at or above which throttle is forced to zero. At most
    /// [`MAX_BURN_ALIGNMENT_DEG`]; tighter values are allowed.
    pub burn_alignment_deg: f64,
}

impl Default for NodeExecutorConfig {
    fn default() -> Self {
        Self {
            lead_time: 3.0,
            remove_nodes: true,
            lead_fraction: 1.0,
            precision: 0.1,
            warp_alignment_deg: 1.0,
            warp_alignment_loose_deg: 10.0,
            burn_alignment_deg: 5.0,
        }
    }
}

/// Tunables of launch window guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AscentGuidanceConfig {
    /// Signed target inclination in degrees; negative means a southbound ascent.
    pub desired_inclination: f64,
    /// Phase angle (deg) to the target at which a rendezvous launch should happen.
    pub launch_phase_angle: f64,
    /// Pre-launch hold (s): warping stops this long before the launch instant.
    pub countdown_margin: f64,
}

impl Default for AscentGuidanceConfig {
    fn default() -> Self {
        Self {
            desired_inclination: 0.0,
            launch_phase_angle: 0.0,
            countdown_margin: 11.0,
        }
    }
}

/// Shape of the classic gravity-turn ascent profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AscentPathConfig {
    /// Altitude (m) at which the gravity turn begins.
    pub turn_start_altitude: f64,
    /// Altitude (m) at which the turn reaches its final angle.
    pub turn_end_altitude: f64,
    /// Flight-path angle (deg) held above `turn_end_altitude`.
    pub turn_end_angle: f64,
    /// Exponent shaping the turn; smaller values pitch over earlier.
    pub turn_shape_exponent: f64,
}

impl Default for AscentPathConfig {
    fn default() -> Self {
        Self {
            turn_start_altitude: 10_000.0,
            turn_end_altitude: 70_000.0,
            turn_end_angle: 0.0,
            turn_shape_exponent: 0.4,
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl AutopilotConfig {
    /// Check value ranges; a loaded file must pass this before it drives a controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let node = &self.node;
        if !(node.precision > 0.0) {
            return Err(invalid("node.precision must be positive"));
        }
        if !(node.lead_fraction >= 0.0) {
            return Err(invalid("node.lead_fraction must not be negative"));
        }
        if !(node.lead_time >= 0.0) {
            return Err(invalid("node.lead_time must not be negative"));
        }
        if !(node.warp_alignment_deg > 0.0
            && node.warp_alignment_deg <= node.warp_alignment_loose_deg)
        {
            return Err(invalid(
                "node.warp_alignment_deg must be positive and not exceed warp_alignment_loose_deg",
            ));
        }
        if !(node.burn_alignment_deg > 0.0 && node.burn_alignment_deg <= MAX_BURN_ALIGNMENT_DEG) {
            return Err(invalid("node.burn_alignment_deg must lie in (0, 5]"));
        }

        let ascent = &self.ascent;
        if !(ascent.desired_inclination.abs() <= 180.0) {
            return Err(invalid("ascent.desired_inclination must lie in [-180, 180]"));
        }
        if !(ascent.countdown_margin >= 0.0) {
            return Err(invalid("ascent.countdown_margin must not be negative"));
        }
        if !ascent.launch_phase_angle.is_finite() {
            return Err(invalid("ascent.launch_phase_angle must be finite"));
        }

        let path = &self.ascent_path;
        if !(path.turn_start_altitude >= 0.0 && path.turn_end_altitude > path.turn_start_altitude)
        {
            return Err(invalid(
                "ascent_path.turn_end_altitude must exceed a non-negative turn_start_altitude",
            ));
        }
        if !(0.0..=90.0).contains(&path.turn_end_angle) {
            return Err(invalid("ascent_path.turn_end_angle must lie in [0, 90]"));
        }
        if !(path.turn_shape_exponent > 0.0) {
            return Err(invalid("ascent_path.turn_shape_exponent must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

/// Load and validate an autopilot configuration from a TOML or YAML file.
///
/// The format is chosen by extension: `.toml` is parsed as TOML, anything else as YAML.
/// Missing keys fall back to their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AutopilotConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config: AutopilotConfig = if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        toml::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };
    config.validate()?;
    Ok(config)
}

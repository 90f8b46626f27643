//! Driver that owns both controllers and the configuration they share.

use autopilot_ascent::{ClassicAscentPath, LaunchWindowGuidance};
use autopilot_config::{AscentPathConfig, AutopilotConfig};
use autopilot_executor::BurnExecutor;
use autopilot_vehicle::{AscentPath, VesselLink};

/// Both controllers behind one fixed-update / control-step pair.
///
/// The host calls [`Autopilot::fixed_update`] once per simulation step and [`Autopilot::drive`]
/// on every control step, which may run more often. `drive` only reads what the last
/// `fixed_update` decided.
pub struct Autopilot {
    autowarp: bool,
    ascent_path: AscentPathConfig,
    executor: BurnExecutor,
    guidance: LaunchWindowGuidance,
}

impl Autopilot {
    /// Build with the classic ascent path described by `config.ascent_path`.
    pub fn new(config: AutopilotConfig) -> Self {
        let path = ClassicAscentPath::from(&config.ascent_path);
        Self::with_ascent_path(config, Box::new(path))
    }

    pub fn with_ascent_path(config: AutopilotConfig, path: Box<dyn AscentPath>) -> Self {
        Self {
            autowarp: config.autowarp,
            ascent_path: config.ascent_path,
            executor: BurnExecutor::new(config.node, config.autowarp),
            guidance: LaunchWindowGuidance::new(config.ascent, path, config.autowarp),
        }
    }

    pub fn autowarp(&self) -> bool {
        self.autowarp
    }

    /// The only writer of the autowarp flag; both controllers get the new value.
    pub fn set_autowarp(&mut self, autowarp: bool) {
        self.autowarp = autowarp;
        self.executor.set_autowarp(autowarp);
        self.guidance.set_autowarp(autowarp);
    }

    pub fn executor(&self) -> &BurnExecutor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut BurnExecutor {
        &mut self.executor
    }

    pub fn guidance(&self) -> &LaunchWindowGuidance {
        &self.guidance
    }

    pub fn guidance_mut(&mut self) -> &mut LaunchWindowGuidance {
        &mut self.guidance
    }

    /// Current configuration, including values the controllers have updated at runtime.
    pub fn config(&self) -> AutopilotConfig {
        AutopilotConfig {
            autowarp: self.autowarp,
            node: self.executor.config().clone(),
            ascent: self.guidance.config().clone(),
            ascent_path: self.ascent_path.clone(),
        }
    }

    pub fn fixed_update(&mut self, link: &mut VesselLink<'_>) {
        self.executor.fixed_update(link);
        self.guidance.fixed_update(link);
    }

    /// Write and return the main throttle for this control step. An idle executor leaves the
    /// throttle to the pilot.
    pub fn drive(&self, link: &mut VesselLink<'_>) -> f64 {
        self.executor.drive(link)
    }
}

//! Gravity-turn ascent profile.

use autopilot_config::AscentPathConfig;
use autopilot_vehicle::AscentPath;

/// Vertical climb, then a power-law pitch-over between two altitudes, then a fixed angle.
#[derive(Debug, Clone)]
pub struct ClassicAscentPath {
    pub turn_start_altitude: f64,
    pub turn_end_altitude: f64,
    pub turn_end_angle: f64,
    pub turn_shape_exponent: f64,
}

impl From<&AscentPathConfig> for ClassicAscentPath {
    fn from(config: &AscentPathConfig) -> Self {
        Self {
            turn_start_altitude: config.turn_start_altitude,
            turn_end_altitude: config.turn_end_altitude,
            turn_end_angle: config.turn_end_angle,
            turn_shape_exponent: config.turn_shape_exponent,
        }
    }
}

impl AscentPath for ClassicAscentPath {
    fn flight_path_angle(&self, altitude: f64) -> f64 {
        if altitude < self.turn_start_altitude {
            return 90.0;
        }
        if altitude > self.turn_end_altitude {
            return self.turn_end_angle;
        }
        let progress = (altitude - self.turn_start_altitude)
            / (self.turn_end_altitude - self.turn_start_altitude);
        let angle = 90.0 - progress.powf(self.turn_shape_exponent) * (90.0 - self.turn_end_angle);
        angle.clamp(0.01, 89.99)
    }
}

//! Burn duration and throttle arithmetic.

use autopilot_core::constants::MIN_THRUST_ACCEL;

/// Time constant (s) the throttle divides by. Always 0.5, independent of the remaining delta-v.
pub const THROTTLE_TIME_CONSTANT: f64 = 0.5;
/// Lowest throttle commanded while a burn is live.
pub const MIN_THROTTLE: f64 = 0.05;
/// Remaining delta-v (m/s) above which the status time constant is short.
const TIME_CONSTANT_SWITCH_DV: f64 = 10.0;

/// Estimated burn figures for one node at the current thrust level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnEstimate {
    pub delta_v: f64,
    /// Full-throttle burn duration (s); `None` when no usable thrust is available.
    pub burn_time: Option<f64>,
    /// 0.5 s above 10 m/s remaining, 2.0 s below. Reported only; see [`throttle_for`].
    pub time_constant: f64,
    /// `delta_v / (time_constant × accel)`, unclamped, for status output.
    pub throttle_estimate: Option<f64>,
}

fn has_thrust(max_thrust_accel: f64) -> bool {
    max_thrust_accel.is_finite() && max_thrust_accel > MIN_THRUST_ACCEL
}

/// Estimate the burn for `delta_v` at `max_thrust_accel`.
pub fn estimate_burn(delta_v: f64, max_thrust_accel: f64) -> BurnEstimate {
    let time_constant = if delta_v > TIME_CONSTANT_SWITCH_DV { 0.5 } else { 2.0 };
    if !has_thrust(max_thrust_accel) {
        return BurnEstimate {
            delta_v,
            burn_time: None,
            time_constant,
            throttle_estimate: None,
        };
    }
    BurnEstimate {
        delta_v,
        burn_time: Some(delta_v / max_thrust_accel),
        time_constant,
        throttle_estimate: Some(delta_v / (time_constant * max_thrust_accel)),
    }
}

/// Throttle for a live burn with `delta_v` remaining.
///
/// Divides by `0.5 × accel` regardless of [`BurnEstimate::time_constant`], so the tail of the
/// burn runs hotter than a plain delta-v/time ratio and stops crisply. Zero without thrust.
pub fn throttle_for(delta_v: f64, max_thrust_accel: f64) -> f64 {
    if !has_thrust(max_thrust_accel) {
        return 0.0;
    }
    (delta_v / (THROTTLE_TIME_CONSTANT * max_thrust_accel)).clamp(MIN_THROTTLE, 1.0)
}

//! Launch geometry helpers.

use autopilot_core::angles::{sign, wrap_180, wrap_360};
use autopilot_core::vector::{self, Vector3};

/// Compass heading (deg, 0 = north, 90 = east) that puts a launch from `latitude_deg` into an
/// orbit of `inclination_deg`. Negative inclinations ascend southward.
///
/// When the inclination is lower than the site latitude no heading reaches it; the closest
/// achievable one is due east for prograde and due west for retrograde inclinations.
pub fn heading_for_inclination(inclination_deg: f64, latitude_deg: f64) -> f64 {
    let cos_surface_angle = inclination_deg.to_radians().cos() / latitude_deg.to_radians().cos();
    if cos_surface_angle.abs() > 1.0 {
        return if wrap_180(inclination_deg).abs() < 90.0 {
            90.0
        } else {
            270.0
        };
    }
    let mut angle_from_east = cos_surface_angle.acos().to_degrees();
    if inclination_deg < 0.0 {
        angle_from_east = -angle_from_east;
    }
    wrap_360(90.0 - angle_from_east)
}

/// Signed inclination for a launch into the plane of a target orbit.
///
/// The sign follows `normal · (offset × body_axis)`: negative when the target plane has to be
/// joined heading south from the vessel's current position. Recompute every tick; the vessel's
/// offset rotates with the body.
pub fn plane_matching_inclination(
    inclination_deg: f64,
    target_normal: &Vector3,
    body_offset: &Vector3,
    body_axis: &Vector3,
) -> f64 {
    let reference = vector::cross(body_offset, body_axis);
    inclination_deg * sign(vector::dot(target_normal, &reference))
}

/// Unit pointing direction for `heading_deg` and `flight_path_angle_deg` in the local frame.
pub fn ascent_direction(
    heading_deg: f64,
    flight_path_angle_deg: f64,
    north: &Vector3,
    east: &Vector3,
    up: &Vector3,
) -> Vector3 {
    let heading = heading_deg.to_radians();
    let angle = flight_path_angle_deg.to_radians();
    let horizontal = vector::add(
        &vector::scale(north, heading.cos()),
        &vector::scale(east, heading.sin()),
    );
    vector::add(
        &vector::scale(&horizontal, angle.cos()),
        &vector::scale(up, angle.sin()),
    )
}

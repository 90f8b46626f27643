use orbital_autopilot::ascent::{
    ClassicAscentPath, GUIDANCE_TARGET_NAME, GuidanceError, LaunchGuidanceState,
    LaunchWindowGuidance, ascent_direction, heading_for_inclination, plane_matching_inclination,
};
use orbital_autopilot::config::{AscentGuidanceConfig, AscentPathConfig};
use orbital_autopilot::sim::{SimVessel, VesselParams};
use orbital_autopilot::vehicle::{AscentPath, SelectedTarget, TargetOrbit};

fn mun() -> TargetOrbit {
    TargetOrbit {
        name: "Mun".to_string(),
        inclination_deg: 6.0,
        normal: [0.0, -0.104528, 0.994522],
    }
}

/// Landed on the equator at longitude 0 with the Mun selected.
fn pad(plane_crossing_at: f64) -> SimVessel {
    let params = VesselParams {
        landed: true,
        altitude: 70.0,
        ..VesselParams::default()
    };
    let mut vessel = SimVessel::new(params).expect("vessel");
    vessel.select_target_orbit(mun());
    vessel.timing.plane_crossing_at = plane_crossing_at;
    vessel
}

fn guidance() -> LaunchWindowGuidance {
    let path = ClassicAscentPath::from(&AscentPathConfig::default());
    LaunchWindowGuidance::new(AscentGuidanceConfig::default(), Box::new(path), true)
}

fn tick(guidance: &mut LaunchWindowGuidance, vessel: &mut SimVessel) {
    let mut link = vessel.link();
    guidance.fixed_update(&mut link);
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
fn heading_matches_inclination_from_latitude() {
    assert!(close(heading_for_inclination(0.0, 0.0), 90.0, 1e-9));
    assert!(close(heading_for_inclination(90.0, 0.0), 0.0, 1e-9));
    assert!(close(heading_for_inclination(-45.0, 0.0), 135.0, 1e-9));
    assert!(close(heading_for_inclination(28.5, 28.5), 90.0, 1e-9));
    // Unreachable inclinations fall back to due east or due west.
    assert_eq!(heading_for_inclination(10.0, 28.5), 90.0);
    assert_eq!(heading_for_inclination(170.0, 28.5), 270.0);
}

#[test]
fn plane_matching_sign_follows_target_normal() {
    let offset = [600_070.0, 0.0, 0.0];
    let axis = [0.0, 0.0, 1.0];
    assert_eq!(
        plane_matching_inclination(6.0, &[0.0, -0.1, 0.99], &offset, &axis),
        6.0
    );
    assert_eq!(
        plane_matching_inclination(6.0, &[0.0, 0.1, 0.99], &offset, &axis),
        -6.0
    );
    assert_eq!(
        plane_matching_inclination(6.0, &[0.0, 0.0, 1.0], &offset, &axis),
        0.0
    );
}

#[test]
fn ascent_direction_blends_heading_and_pitch() {
    let north = [0.0, 0.0, 1.0];
    let east = [0.0, 1.0, 0.0];
    let up = [1.0, 0.0, 0.0];
    let horizontal_east = ascent_direction(90.0, 0.0, &north, &east, &up);
    assert!(close(horizontal_east[1], 1.0, 1e-12));
    assert!(close(horizontal_east[0], 0.0, 1e-12));
    let vertical = ascent_direction(45.0, 90.0, &north, &east, &up);
    assert!(close(vertical[0], 1.0, 1e-12));
}

#[test]
fn classic_path_turns_between_start_and_end_altitudes() {
    let path = ClassicAscentPath::from(&AscentPathConfig::default());
    assert_eq!(path.flight_path_angle(0.0), 90.0);
    assert_eq!(path.flight_path_angle(9_999.0), 90.0);
    assert_eq!(path.flight_path_angle(80_000.0), 0.0);
    assert_eq!(path.flight_path_angle(10_000.0), 89.99);

    let mut previous = 90.0;
    for altitude in (11_000..70_000).step_by(1_000) {
        let angle = path.flight_path_angle(altitude as f64);
        assert!(angle < previous, "angle should fall with altitude");
        assert!(angle > 0.0);
        previous = angle;
    }
    let mid = path.flight_path_angle(40_000.0);
    assert!(close(mid, 90.0 - 0.5f64.powf(0.4) * 90.0, 1e-9));
}

#[test]
fn countdown_needs_an_orbiting_target() {
    let mut vessel = pad(600.0);
    vessel.clear_target();
    let mut guidance = guidance();
    assert_eq!(
        guidance.launch_to_plane(&vessel.target),
        Err(GuidanceError::NoTarget)
    );
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
}

#[test]
fn only_one_countdown_at_a_time() {
    let vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    assert_eq!(
        guidance.launch_to_rendezvous(&vessel.target),
        Err(GuidanceError::CountdownActive(
            LaunchGuidanceState::CountdownToPlane
        ))
    );
}

#[test]
fn armed_countdown_warps_to_margin_and_sets_inclination() {
    let mut vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);

    assert_eq!(guidance.state(), LaunchGuidanceState::CountdownToPlane);
    assert_eq!(guidance.time_to_launch(), Some(600.0));
    assert_eq!(vessel.warp.last_request, Some(589.0));
    assert_eq!(guidance.desired_inclination(), 6.0);
    assert!(guidance.status().starts_with("Launching to target plane: T-"));
    assert_eq!(vessel.staging.activations, 0);
}

#[test]
fn southern_plane_crossing_flips_inclination() {
    let mut vessel = pad(600.0);
    vessel.select_target_orbit(TargetOrbit {
        normal: [0.0, 0.104528, 0.994522],
        ..mun()
    });
    let mut guidance = guidance();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    assert_eq!(guidance.desired_inclination(), -6.0);
}

#[test]
fn armed_launch_stages_exactly_once() {
    let mut vessel = pad(0.05);
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");

    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.staging.activations, 1);
    assert_eq!(guidance.launches_triggered(), 1);
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
    assert_eq!(guidance.status(), "Launched");

    tick(&mut guidance, &mut vessel);
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.staging.activations, 1);
}

#[test]
fn launch_waits_outside_three_ticks() {
    let mut vessel = pad(0.07);
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.staging.activations, 0);
    assert_eq!(guidance.state(), LaunchGuidanceState::CountdownToPlane);

    vessel.step();
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.staging.activations, 1);
}

#[test]
fn disarmed_countdown_neither_warps_nor_stages() {
    let mut vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.warp.warp_requests, 0);

    vessel.timing.plane_crossing_at = 0.01;
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.staging.activations, 0);
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
    assert_eq!(guidance.status(), "Launch window passed");
}

#[test]
fn autowarp_off_suppresses_countdown_warp() {
    let mut vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.set_autowarp(false);
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.warp.warp_requests, 0);
}

#[test]
fn losing_the_target_cancels_countdown() {
    let mut vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);

    vessel.clear_target();
    vessel.timing.plane_crossing_at = 0.01;
    tick(&mut guidance, &mut vessel);
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
    assert_eq!(guidance.status(), "Select a target to launch to");
    assert_eq!(vessel.staging.activations, 0);
}

#[test]
fn cancel_has_no_side_effects() {
    let mut vessel = pad(0.01);
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    guidance.cancel_countdown();
    tick(&mut guidance, &mut vessel);
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
    assert_eq!(vessel.staging.activations, 0);
    assert_eq!(vessel.warp.warp_requests, 0);
}

#[test]
fn countdown_holds_while_airborne() {
    let mut vessel = pad(0.01);
    vessel.telemetry.landed = false;
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    assert_eq!(guidance.state(), LaunchGuidanceState::CountdownToPlane);
    assert_eq!(guidance.time_to_launch(), None);
    assert_eq!(vessel.staging.activations, 0);
}

#[test]
fn rendezvous_countdown_keeps_desired_inclination() {
    let mut vessel = pad(600.0);
    vessel.timing.phase_angle_at = 300.0;
    let mut guidance = guidance();
    guidance.set_desired_inclination(3.0);
    guidance.set_launch_phase_angle(42.0);
    guidance.launch_to_rendezvous(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    assert_eq!(guidance.time_to_launch(), Some(300.0));
    assert_eq!(guidance.desired_inclination(), 3.0);
    assert!(guidance.status().starts_with("Launching to rendezvous"));
}

#[test]
fn marker_tracks_ascent_direction_while_selected() {
    let mut vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.show_direction_marker(&mut vessel.target);
    assert_eq!(
        vessel.target.selected,
        Some(SelectedTarget::Direction {
            owner: GUIDANCE_TARGET_NAME.to_string()
        })
    );

    tick(&mut guidance, &mut vessel);
    let direction = vessel.target.direction.expect("marker direction");
    let up = vessel.telemetry.up;
    for axis in 0..3 {
        assert!(close(direction[axis], up[axis], 1e-9));
    }

    guidance.hide_direction_marker(&mut vessel.target);
    assert_eq!(vessel.target.selected, None);
    let updates = vessel.target.direction_updates;
    tick(&mut guidance, &mut vessel);
    assert_eq!(vessel.target.direction_updates, updates);
}

#[test]
fn hiding_marker_leaves_other_targets_selected() {
    let mut vessel = pad(600.0);
    let guidance = guidance();
    guidance.hide_direction_marker(&mut vessel.target);
    assert_eq!(vessel.target.selected, Some(SelectedTarget::Orbiting(mun())));
}

#[test]
fn stop_hides_marker_and_drops_countdown() {
    let mut vessel = pad(600.0);
    let mut guidance = guidance();
    guidance.launch_to_plane(&vessel.target).expect("countdown");
    tick(&mut guidance, &mut vessel);
    guidance.show_direction_marker(&mut vessel.target);
    guidance.stop(&mut vessel.target);
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
    assert_eq!(vessel.target.selected, None);
}

#[test]
fn phase_angle_countdown_stages_once_across_the_window() {
    let mut vessel = pad(600.0);
    vessel.timing.phase_angle_at = 0.1;
    let mut guidance = guidance();
    guidance.arm();
    guidance.launch_to_rendezvous(&vessel.target).expect("countdown");

    for _ in 0..10 {
        tick(&mut guidance, &mut vessel);
        vessel.step();
    }
    assert_eq!(vessel.staging.activations, 1);
    assert_eq!(guidance.launches_triggered(), 1);
    assert_eq!(guidance.state(), LaunchGuidanceState::Idle);
}

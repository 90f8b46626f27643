use std::fs;
use std::io::Write;

use orbital_autopilot::autopilot::Autopilot;
use orbital_autopilot::config::{AutopilotConfig, load_config};
use orbital_autopilot::executor::{BurnPhase, ExecutionMode};
use orbital_autopilot::export::{summary, trace};
use orbital_autopilot::harness::{
    CountdownKind, HarnessError, LaunchRunOptions, NodeRunOptions, run_launch, run_nodes,
};
use orbital_autopilot::ascent::{GuidanceError, LaunchGuidanceState};
use orbital_autopilot::scenario::{ScenarioError, load_scenario};

const MAX_TICKS: u64 = 200_000;

#[test]
fn shipped_scenarios_load() {
    let circularize = load_scenario("scenarios/circularize.yaml").expect("circularize");
    assert_eq!(circularize.nodes.len(), 1);
    assert!(circularize.target.is_none());

    let transfer = load_scenario("scenarios/transfer.yaml").expect("transfer");
    assert_eq!(transfer.nodes.len(), 2);
    assert_eq!(transfer.vessel.max_thrust_accel, 8.0);

    let launch = load_scenario("scenarios/launch_mun.yaml").expect("launch");
    assert!(launch.vessel.landed);
    assert_eq!(launch.target.as_ref().map(|t| t.name.as_str()), Some("Mun"));
    let vessel = launch.build_vessel().expect("vessel");
    assert_eq!(vessel.timing.plane_crossing_at, 600.0);
    assert_eq!(vessel.nodes.len(), 0);
}

#[test]
fn invalid_vessel_parameters_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "vessel:\n  tick: 0.0\n").expect("write yaml");
    let scenario = load_scenario(&path).expect("parse");
    assert!(matches!(
        scenario.build_vessel(),
        Err(ScenarioError::Vessel(_))
    ));

    fs::write(&path, "nodes:\n  - burn_vector: [1.0, .nan, 0.0]\n    scheduled_time: 10.0\n")
        .expect("write yaml");
    let scenario = load_scenario(&path).expect("parse");
    assert!(matches!(
        scenario.build_vessel(),
        Err(ScenarioError::InvalidNode { index: 0 })
    ));
}

#[test]
fn single_node_burn_closes_the_loop() {
    let scenario = load_scenario("scenarios/circularize.yaml").expect("circularize");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    let options = NodeRunOptions {
        mode: ExecutionMode::Single,
        max_ticks: MAX_TICKS,
    };
    let result = run_nodes(&mut autopilot, &mut vessel, &options, None).expect("run");

    assert_eq!(result.status, "Node executed");
    assert_eq!(autopilot.executor().phase(), BurnPhase::Done);
    assert_eq!(result.nodes_completed, vec![1]);
    assert_eq!(result.nodes_removed, 1);
    assert_eq!(result.nodes_remaining, 0);
    assert!(result.ticks < MAX_TICKS);
    assert_eq!(vessel.steps() + 1, result.ticks);
    // A 5 s burn centered on t = 120 s.
    assert!(
        result.elapsed_s > 115.0 && result.elapsed_s < 130.0,
        "elapsed {}",
        result.elapsed_s
    );
    assert!(vessel.warp.warp_requests > 0);
    assert_eq!(vessel.throttle.throttle, 0.0);
    assert!(vessel.attitude.request.is_none());
}

#[test]
fn all_nodes_run_with_kept_nodes() {
    let config = load_config("configs/keep_nodes.yaml").expect("config");
    let scenario = load_scenario("scenarios/transfer.yaml").expect("transfer");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(config);
    let options = NodeRunOptions {
        mode: ExecutionMode::All,
        max_ticks: MAX_TICKS,
    };
    let result = run_nodes(&mut autopilot, &mut vessel, &options, None).expect("run");

    assert_eq!(result.status, "All nodes executed");
    assert_eq!(result.nodes_completed, vec![1, 2]);
    assert_eq!(result.nodes_removed, 0);
    assert_eq!(result.nodes_remaining, 2);
    let residual = result.residual_delta_v_m_s.expect("kept node");
    assert!(residual < 0.1);
    assert!(result.elapsed_s > 395.0 && result.elapsed_s < 410.0);
}

#[test]
fn warp_disabled_run_still_completes() {
    let scenario = load_scenario("scenarios/circularize.yaml").expect("circularize");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    autopilot.set_autowarp(false);
    assert!(!autopilot.executor().autowarp());
    assert!(!autopilot.config().autowarp);

    let options = NodeRunOptions {
        mode: ExecutionMode::Single,
        max_ticks: MAX_TICKS,
    };
    let result = run_nodes(&mut autopilot, &mut vessel, &options, None).expect("run");
    assert_eq!(result.status, "Node executed");
    assert_eq!(vessel.warp.warp_requests, 0);
}

#[test]
fn trace_csv_records_every_tick() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace_path = dir.path().join("trace").join("circularize.csv");
    let summary_path = dir.path().join("summary.json");

    let scenario = load_scenario("scenarios/circularize.yaml").expect("circularize");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    let options = NodeRunOptions {
        mode: ExecutionMode::Single,
        max_ticks: MAX_TICKS,
    };
    let mut writer = trace::writer_for_path(&trace_path).expect("trace writer");
    let result = run_nodes(
        &mut autopilot,
        &mut vessel,
        &options,
        Some(writer.as_mut() as &mut dyn Write),
    )
    .expect("run");
    drop(writer);
    summary::write_json(&summary_path, &result).expect("summary");

    let mut reader = csv::Reader::from_path(&trace_path).expect("trace csv");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(&headers[0], "tick");
    assert_eq!(&headers[3], "phase");
    let phase_col = headers.iter().position(|h| h == "phase").expect("phase");
    let throttle_col = headers.iter().position(|h| h == "throttle").expect("throttle");
    let physics_col = headers
        .iter()
        .position(|h| h == "physics_running")
        .expect("physics_running");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len() as u64, result.ticks);
    assert!(rows.iter().any(|row| &row[physics_col] == "false"));
    assert!(rows.iter().any(|row| &row[phase_col] == "Burning"));
    assert!(rows.iter().any(|row| &row[throttle_col] == "1.0000"));
    assert_eq!(&rows[rows.len() - 1][phase_col], "Done");

    let json = fs::read_to_string(&summary_path).expect("summary json");
    assert!(json.contains("\"status\": \"Node executed\""));
}

#[test]
fn armed_plane_launch_fires_at_window() {
    let scenario = load_scenario("scenarios/launch_mun.yaml").expect("launch");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    let options = LaunchRunOptions {
        kind: CountdownKind::Plane,
        armed: true,
        max_ticks: MAX_TICKS,
    };
    let result = run_launch(&mut autopilot, &mut vessel, &options, None).expect("run");

    assert_eq!(result.status, "Launched");
    assert_eq!(result.stages_fired, 1);
    assert_eq!(result.desired_inclination_deg, 6.0);
    let launch = result.launch_time_s.expect("launch time");
    assert!(launch > 599.9 && launch <= 600.0, "launch at {launch}");
    let warp = vessel.warp.last_request.expect("countdown warp");
    assert!((warp - 589.0).abs() < 1e-6, "warp to {warp}");
    assert_eq!(autopilot.config().ascent.desired_inclination, 6.0);
}

#[test]
fn disarmed_launch_only_reports_the_window() {
    let scenario = load_scenario("scenarios/launch_mun.yaml").expect("launch");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    let options = LaunchRunOptions {
        kind: CountdownKind::Rendezvous,
        armed: false,
        max_ticks: MAX_TICKS,
    };
    let result = run_launch(&mut autopilot, &mut vessel, &options, None).expect("run");

    assert_eq!(result.status, "Launch window passed");
    assert_eq!(result.stages_fired, 0);
    assert!(result.launch_time_s.is_none());
    assert_eq!(vessel.warp.warp_requests, 0);
    assert_eq!(autopilot.guidance().state(), LaunchGuidanceState::Idle);
    // Rendezvous window opens at t = 300 s.
    assert!(vessel.now() > 299.9 && vessel.now() <= 300.0);
}

#[test]
fn launch_without_target_is_refused() {
    let scenario = load_scenario("scenarios/circularize.yaml").expect("circularize");
    let mut vessel = scenario.build_vessel().expect("vessel");
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    let options = LaunchRunOptions {
        kind: CountdownKind::Plane,
        armed: true,
        max_ticks: 10,
    };
    let err = run_launch(&mut autopilot, &mut vessel, &options, None).expect_err("no target");
    assert!(matches!(
        err,
        HarnessError::Guidance(GuidanceError::NoTarget)
    ));
}

#[test]
fn idle_autopilot_leaves_pilot_throttle_alone() {
    let scenario = load_scenario("scenarios/circularize.yaml").expect("circularize");
    let mut vessel = scenario.build_vessel().expect("vessel");
    vessel.throttle.throttle = 0.7;
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    for _ in 0..3 {
        let mut link = vessel.link();
        autopilot.fixed_update(&mut link);
        assert_eq!(autopilot.drive(&mut link), 0.0);
    }
    assert_eq!(vessel.throttle.throttle, 0.7);
    assert_eq!(vessel.throttle.writes, 0);
}

use orbital_autopilot::primitives::angles::{sign, wrap_180, wrap_360};
use orbital_autopilot::primitives::format::to_si;
use orbital_autopilot::primitives::vector::{angle_between_deg, cross, normalize};

#[test]
fn si_formatting_uses_prefixes_and_significant_figures() {
    assert_eq!(to_si(12_345.0, 3), "12.3 k");
    assert_eq!(to_si(5.0, 3), "5.00 ");
    assert_eq!(to_si(0.0125, 3), "12.5 m");
    assert_eq!(to_si(-250.0, 3), "-250 ");
    assert_eq!(to_si(0.0, 3), "0 ");
    assert_eq!(to_si(f64::INFINITY, 3), "∞");
    assert_eq!(to_si(f64::NAN, 3), "NaN");
}

#[test]
fn angle_wrapping_and_sign() {
    assert_eq!(wrap_360(-90.0), 270.0);
    assert_eq!(wrap_360(720.0), 0.0);
    assert_eq!(wrap_180(270.0), -90.0);
    assert_eq!(wrap_180(180.0), -180.0);
    assert_eq!(sign(0.0), 0.0);
    assert_eq!(sign(-3.0), -1.0);
    assert_eq!(sign(1e-300), 1.0);
}

#[test]
fn vector_helpers_handle_degenerate_input() {
    assert_eq!(normalize(&[0.0, 0.0, 0.0]), None);
    assert_eq!(cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
    assert_eq!(angle_between_deg(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0]), 0.0);
    assert!((angle_between_deg(&[1.0, 0.0, 0.0], &[0.0, 2.0, 0.0]) - 90.0).abs() < 1e-12);
}

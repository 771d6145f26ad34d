use proptest::prelude::*;

use solar_cable_tracker::actuator::*;
use solar_cable_tracker::{
    AppliedConstraints, MechanicalConstraints, PanelOrientation, TrackerError,
};

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

fn tilt(tilt_x: f64, tilt_z: f64) -> PanelOrientation {
    PanelOrientation { tilt_x, tilt_z }
}

// ── Ideal lengths ──

#[test]
fn test_zero_rotation_gives_equal_cables() {
    let c = MechanicalConstraints::default();
    let cables = calculate_cable_lengths(tilt(21.56, 0.0), &c).unwrap();
    assert_eq!(cables.se_length, cables.sw_length);
    assert_approx!(cables.se_length, 80.0 + 21.56 * 0.35, 1e-9);
    assert_eq!(cables.constraints, AppliedConstraints::default());
    assert!(!cables.constraints.any());
}

#[test]
fn test_rotation_moves_length_between_cables() {
    let c = MechanicalConstraints::default();
    let cables = calculate_cable_lengths(tilt(10.0, 20.0), &c).unwrap();
    assert_approx!(cables.se_length, 80.0 - 16.0 + 3.5, 1e-9);
    assert_approx!(cables.sw_length, 80.0 + 16.0 + 3.5, 1e-9);
    assert!(!cables.constraints.any());
}

// ── Clamping ──

#[test]
fn test_clamp_to_max_without_rebalance() {
    let c = MechanicalConstraints::default();
    // Both ideal lengths exceed the maximum by the same amount.
    let cables = calculate_cable_lengths(tilt(200.0, 0.0), &c).unwrap();
    assert_eq!(cables.se_length, 120.0);
    assert_eq!(cables.sw_length, 120.0);
    assert!(cables.constraints.max_length);
    assert!(!cables.constraints.min_length);
    assert!(!cables.constraints.max_difference);
}

#[test]
fn test_clamp_to_min() {
    let c = MechanicalConstraints {
        base_cable_length: 20.0,
        ..MechanicalConstraints::default()
    };
    let cables = calculate_cable_lengths(tilt(0.0, 0.0), &c).unwrap();
    assert_eq!(cables.se_length, 30.0);
    assert_eq!(cables.sw_length, 30.0);
    assert!(cables.constraints.min_length);
}

#[test]
fn test_rebalance_after_both_clamps() {
    let c = MechanicalConstraints::default();
    // Ideal se = 8, sw = 152: clamped to 30 / 120, then recentred around 75.
    let cables = calculate_cable_lengths(tilt(0.0, 90.0), &c).unwrap();
    assert_approx!(cables.se_length, 50.0, 1e-9);
    assert_approx!(cables.sw_length, 100.0, 1e-9);
    assert_eq!(
        cables.constraints,
        AppliedConstraints {
            min_length: true,
            max_length: true,
            max_difference: true,
        }
    );
}

#[test]
fn test_rebalance_preserves_direction() {
    let c = MechanicalConstraints::default();
    let west = calculate_cable_lengths(tilt(0.0, -40.0), &c).unwrap();
    assert!(west.se_length > west.sw_length);
    assert_approx!(west.se_length - west.sw_length, 50.0, 1e-9);
    assert_approx!((west.se_length + west.sw_length) / 2.0, 80.0, 1e-9);
    assert!(west.constraints.max_difference);
    assert!(!west.constraints.min_length && !west.constraints.max_length);
}

#[test]
fn test_zero_max_difference_forces_equal_cables() {
    let c = MechanicalConstraints {
        max_difference: 0.0,
        ..MechanicalConstraints::default()
    };
    let cables = calculate_cable_lengths(tilt(20.0, 30.0), &c).unwrap();
    assert_approx!(cables.se_length, cables.sw_length, 1e-9);
    assert_approx!(cables.se_length, 87.0, 1e-9);
}

#[test]
fn test_rebalanced_gap_never_exceeds_max_difference() {
    // A third is not representable, so `avg ± max_difference / 2` rounds apart.
    let c = MechanicalConstraints {
        max_difference: 1.0 / 3.0,
        ..MechanicalConstraints::default()
    };
    for tilt_z in [-170.0, -95.5, -40.3, 40.3, 95.5, 170.0] {
        for tilt_x in [0.0, 12.34, 45.6, 89.9] {
            let cables = calculate_cable_lengths(tilt(tilt_x, tilt_z), &c).unwrap();
            assert!(cables.constraints.max_difference);
            let gap = (cables.se_length - cables.sw_length).abs();
            assert!(gap <= c.max_difference, "tilt ({}, {}): gap={}", tilt_x, tilt_z, gap);
            assert_approx!(gap, c.max_difference, 1e-12);
        }
    }
}

#[test]
fn test_degenerate_span() {
    let c = MechanicalConstraints {
        min_length: 60.0,
        max_length: 60.0,
        max_difference: 0.0,
        ..MechanicalConstraints::default()
    };
    let cables = calculate_cable_lengths(tilt(45.0, 45.0), &c).unwrap();
    assert_eq!(cables.se_length, 60.0);
    assert_eq!(cables.sw_length, 60.0);
    assert_approx!(cables.se_tension, 1.0 - c.elasticity, 1e-12);
}

// ── Validation ──

#[test]
fn test_rejects_invalid_constraints() {
    let inverted = MechanicalConstraints {
        min_length: 130.0,
        ..MechanicalConstraints::default()
    };
    assert!(matches!(
        calculate_cable_lengths(tilt(0.0, 0.0), &inverted),
        Err(TrackerError::InvalidConstraints(_))
    ));

    let elastic = MechanicalConstraints {
        elasticity: 1.5,
        ..MechanicalConstraints::default()
    };
    assert!(calculate_cable_lengths(tilt(0.0, 0.0), &elastic).is_err());

    let negative = MechanicalConstraints {
        max_difference: -1.0,
        ..MechanicalConstraints::default()
    };
    assert!(calculate_cable_lengths(tilt(0.0, 0.0), &negative).is_err());
}

#[test]
fn test_rejects_non_finite_target() {
    let c = MechanicalConstraints::default();
    assert!(matches!(
        calculate_cable_lengths(tilt(f64::NAN, 0.0), &c),
        Err(TrackerError::InvalidInput(_))
    ));
    assert!(calculate_cable_lengths(tilt(0.0, f64::INFINITY), &c).is_err());
}

#[test]
fn test_constraints_not_mutated() {
    let c = MechanicalConstraints::default();
    let before = c;
    let _ = calculate_cable_lengths(tilt(0.0, 90.0), &c).unwrap();
    assert_eq!(c, before);
}

// ── Tension ──

#[test]
fn test_tension_midpoint_and_extremes() {
    for elasticity in [0.0, 0.1, 0.5, 1.0] {
        assert_approx!(cable_tension(75.0, 30.0, 120.0, elasticity), 1.0 - elasticity, 1e-12);
        assert_approx!(cable_tension(30.0, 30.0, 120.0, elasticity), 0.0, 1e-12);
        assert_approx!(cable_tension(120.0, 30.0, 120.0, elasticity), 0.0, 1e-12);
    }
}

#[test]
fn test_tension_quarter_travel() {
    // normalized 0.25: 1 - 4 * 0.0625 = 0.75
    assert_approx!(cable_tension(52.5, 30.0, 120.0, 0.0), 0.75, 1e-12);
    assert_approx!(cable_tension(52.5, 30.0, 120.0, 0.2), 0.6, 1e-12);
}

#[test]
fn test_tension_equal_bounds() {
    assert_approx!(cable_tension(50.0, 50.0, 50.0, 0.3), 0.7, 1e-12);
}

// ── Forward kinematics ──

#[test]
fn test_orientation_from_cables_inverts_ideal_lengths() {
    let c = MechanicalConstraints::default();
    let target = tilt(25.0, -15.0);
    let cables = calculate_cable_lengths(target, &c).unwrap();
    assert!(!cables.constraints.any());
    let achieved = orientation_from_cables(cables.se_length, cables.sw_length, &c);
    assert_approx!(achieved.tilt_x, 25.0, 1e-9);
    assert_approx!(achieved.tilt_z, -15.0, 1e-9);
}

#[test]
fn test_orientation_from_flat_cables() {
    let c = MechanicalConstraints::default();
    let flat = orientation_from_cables(80.0, 80.0, &c);
    assert_approx!(flat.tilt_x, 0.0, 1e-12);
    assert_approx!(flat.tilt_z, 0.0, 1e-12);

    let rigid = MechanicalConstraints {
        tilt_z_factor: 0.0,
        ..c
    };
    assert_eq!(orientation_from_cables(70.0, 90.0, &rigid).tilt_z, 0.0);
}

#[test]
fn test_forced_cables_keep_lengths() {
    let c = MechanicalConstraints::default();
    let forced = forced_cable_lengths(80.0, 80.0, &c);
    assert_eq!(forced.se_length, 80.0);
    assert_eq!(forced.sw_length, 80.0);
    assert!(!forced.constraints.any());
    assert!(forced.se_tension > 0.0);
}

// ── Invariants ──

fn any_constraints() -> impl Strategy<Value = MechanicalConstraints> {
    (
        0.0f64..200.0,
        0.0f64..2.0,
        0.0f64..2.0,
        0.0f64..100.0,
        0.0f64..150.0,
        0.0f64..200.0,
        0.0f64..=1.0,
    )
        .prop_map(|(base, fx, fz, min, span, max_diff, elasticity)| MechanicalConstraints {
            base_cable_length: base,
            tilt_x_factor: fx,
            tilt_z_factor: fz,
            min_length: min,
            max_length: min + span,
            max_difference: max_diff,
            elasticity,
            min_tilt_x: 0.0,
            max_tilt_x: 90.0,
        })
}

proptest! {
    #[test]
    fn prop_solution_respects_limits(
        c in any_constraints(),
        tilt_x in -90.0f64..180.0,
        tilt_z in -360.0f64..360.0,
    ) {
        let cables = calculate_cable_lengths(tilt(tilt_x, tilt_z), &c).unwrap();
        let eps = 1e-9;
        prop_assert!(cables.se_length >= c.min_length - eps && cables.se_length <= c.max_length + eps);
        prop_assert!(cables.sw_length >= c.min_length - eps && cables.sw_length <= c.max_length + eps);
        prop_assert!((cables.se_length - cables.sw_length).abs() <= c.max_difference);
        for tension in [cables.se_tension, cables.sw_tension] {
            prop_assert!((-eps..=1.0 + eps).contains(&tension));
        }
    }
}

use crate::angles::fold_signed_angle;
use crate::types::PanelOrientation;

/// Panel attitude that faces the sun, with the inclination held to
/// `[min_tilt_x, max_tilt_x]`.
///
/// `tilt_z` is not clamped here; rotation limits come from the cable solver.
pub fn optimal_panel_angles(
    elevation: f64,
    azimuth: f64,
    min_tilt_x: f64,
    max_tilt_x: f64,
) -> PanelOrientation {
    let tilt_x = (90.0 - elevation).max(min_tilt_x).min(max_tilt_x);
    // Azimuth folded to (-180, 180], then mirrored so the panel faces the sun.
    let tilt_z = -fold_signed_angle(azimuth);
    PanelOrientation { tilt_x, tilt_z }
}

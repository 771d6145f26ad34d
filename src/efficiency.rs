use crate::angles::deg_to_rad;
use crate::orientation::optimal_panel_angles;
use crate::types::{EfficiencyLosses, EfficiencyReport, PanelOrientation};

/// Irradiance efficiency of `actual` relative to the optimal orientation for the
/// given sun position, by the cosine law.
///
/// The two axis deviations are combined as a Euclidean norm before the cosine
/// is taken, while each axis loss is the cosine loss of that axis alone. The
/// axis losses therefore do not add up to the total loss. Headings are
/// compared by their plain difference, without wrapping at ±180.
pub fn panel_efficiency(
    actual: PanelOrientation,
    sun_elevation: f64,
    sun_azimuth: f64,
    min_tilt_x: f64,
    max_tilt_x: f64,
) -> EfficiencyReport {
    let optimal = optimal_panel_angles(sun_elevation, sun_azimuth, min_tilt_x, max_tilt_x);

    let delta_x = (actual.tilt_x - optimal.tilt_x).abs();
    let delta_z = (actual.tilt_z - optimal.tilt_z).abs();
    let angle_difference = delta_x.hypot(delta_z);

    let efficiency = (deg_to_rad(angle_difference).cos() * 100.0).clamp(0.0, 100.0);
    let axis_loss = |delta: f64| (1.0 - deg_to_rad(delta).cos()) * 100.0;

    EfficiencyReport {
        efficiency,
        optimal,
        angle_difference,
        losses: EfficiencyLosses {
            tilt_x: axis_loss(delta_x),
            tilt_z: axis_loss(delta_z),
            total: 100.0 - efficiency,
        },
    }
}

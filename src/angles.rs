pub const DEGREES_PER_HOUR: f64 = 15.0;
pub const MINUTES_PER_DEGREE: f64 = 4.0;

/// Elevation below which the refraction formula is not applied, degrees.
pub const REFRACTION_CUTOFF: f64 = -1.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / std::f64::consts::PI)
}

/// Wraps into [0, period). `rem_euclid` can round up to `period` itself for
/// tiny negative inputs, which is folded back to zero.
fn wrap(value: f64, period: f64) -> f64 {
    let wrapped = value.rem_euclid(period);
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// Angle in [0, 360).
pub fn normalize_angle(angle: f64) -> f64 {
    wrap(angle, 360.0)
}

/// Angle in (-180, 180]. Exactly 180 stays 180.
pub fn fold_signed_angle(angle: f64) -> f64 {
    180.0 - wrap(180.0 - angle, 360.0)
}

/// Hour of day in [0, 24).
pub fn normalize_hours(hours: f64) -> f64 {
    wrap(hours, 24.0)
}

pub fn intermediate_angle_b(n: i32) -> f64 {
    2.0 * std::f64::consts::PI * (n - 1) as f64 / 365.0
}

/// Spencer (1971) equation of time in minutes for day-of-year `n`.
pub fn equation_of_time(n: i32) -> f64 {
    let b = intermediate_angle_b(n);
    229.18
        * (0.000075
            + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.040849 * (2.0 * b).sin())
}

/// Longitude correction between solar time and the zone's standard meridian, hours.
pub fn longitude_correction(longitude: f64, timezone: f64) -> f64 {
    MINUTES_PER_DEGREE * (longitude - DEGREES_PER_HOUR * timezone) / 60.0
}

/// Atmospheric refraction to add to an elevation, both in degrees.
///
/// Returns zero at or below [`REFRACTION_CUTOFF`], where the formula diverges.
pub fn refraction_correction(elevation: f64) -> f64 {
    if elevation <= REFRACTION_CUTOFF {
        return 0.0;
    }
    let e = deg_to_rad(elevation);
    0.0002967 / (e + 0.00312536 / (e + 0.089186)).tan()
}

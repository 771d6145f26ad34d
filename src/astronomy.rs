//! Sun position, sun times and solar/local time conversion.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use log::{debug, warn};

use crate::angles::{self, normalize_angle, normalize_hours, rad_to_deg};
use crate::celestial::CelestialProvider;
use crate::error::{Result, TrackerError};
use crate::types::{Daylight, GeoLocation, Moment, SunPosition, SunTimes};

/// Azimuth offset from the provider's south-referenced convention to north-referenced.
pub const AZIMUTH_REFERENCE_OFFSET: f64 = 180.0;

fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrackerError::UpstreamUnavailable(format!(
            "celestial provider returned non-finite {what}"
        )))
    }
}

/// Equation of time in minutes for the caller-local calendar day of `moment`.
pub fn equation_of_time_at(moment: &Moment) -> f64 {
    angles::equation_of_time(moment.day_of_year())
}

pub fn sun_position<P: CelestialProvider + ?Sized>(
    provider: &P,
    location: &GeoLocation,
    moment: &Moment,
    apply_refraction: bool,
) -> Result<SunPosition> {
    location.validate()?;
    let raw = provider.position_of(moment.instant, location)?;
    let raw_altitude = ensure_finite(raw.altitude, "altitude")?;
    let raw_azimuth = ensure_finite(raw.azimuth, "azimuth")?;

    let mut elevation = rad_to_deg(raw_altitude);
    if apply_refraction {
        elevation += angles::refraction_correction(elevation);
    }
    let azimuth = normalize_angle(rad_to_deg(raw_azimuth) + AZIMUTH_REFERENCE_OFFSET);

    debug!(
        "sun at ({}, {}) {}: elevation {:.3}, azimuth {:.3}",
        location.latitude, location.longitude, moment.instant, elevation, azimuth
    );
    Ok(SunPosition {
        elevation,
        azimuth,
        raw_altitude,
        raw_azimuth,
        equation_of_time: equation_of_time_at(moment),
    })
}

pub fn sun_times<P: CelestialProvider + ?Sized>(
    provider: &P,
    location: &GeoLocation,
    date: NaiveDate,
) -> Result<SunTimes> {
    location.validate()?;
    let raw = provider.times_for(date, location)?;

    let (day_length, daylight) = match (raw.sunrise, raw.sunset) {
        (Some(rise), Some(set)) if set >= rise => {
            ((set - rise).num_milliseconds() as f64 / 3_600_000.0, Daylight::Regular)
        }
        (Some(rise), Some(set)) => {
            warn!("sunset {set} precedes sunrise {rise} at ({}, {}) on {date}",
                location.latitude, location.longitude);
            (0.0, Daylight::Inverted)
        }
        _ => {
            // No crossing of the horizon: the altitude at transit decides day or night.
            let noon = provider.position_of(raw.solar_noon, location)?;
            if ensure_finite(noon.altitude, "altitude")? > 0.0 {
                (24.0, Daylight::PolarDay)
            } else {
                (0.0, Daylight::PolarNight)
            }
        }
    };

    Ok(SunTimes {
        sunrise: raw.sunrise,
        sunset: raw.sunset,
        solar_noon: raw.solar_noon,
        dawn: raw.dawn,
        dusk: raw.dusk,
        day_length,
        daylight,
    })
}

/// Converts local solar time to clock time in the zone `timezone` (hours from UTC).
pub fn solar_time_to_local_time(
    solar_time: f64,
    longitude: f64,
    timezone: f64,
    moment: &Moment,
) -> f64 {
    let correction = angles::longitude_correction(longitude, timezone);
    normalize_hours(solar_time - correction - equation_of_time_at(moment) / 60.0)
}

/// Inverse of [`solar_time_to_local_time`].
pub fn local_time_to_solar_time(
    local_time: f64,
    longitude: f64,
    timezone: f64,
    moment: &Moment,
) -> f64 {
    let correction = angles::longitude_correction(longitude, timezone);
    normalize_hours(local_time + correction + equation_of_time_at(moment) / 60.0)
}

/// Clock time of `instant` as decimal hours at the given offset from UTC.
pub fn decimal_hours(instant: DateTime<Utc>, utc_offset_hours: f64) -> f64 {
    let local = instant + Duration::milliseconds((utc_offset_hours * 3_600_000.0).round() as i64);
    local.hour() as f64 + local.minute() as f64 / 60.0 + local.second() as f64 / 3600.0
}

/// `HH:MM` clock time of `instant` at the given offset from UTC.
pub fn format_clock(instant: DateTime<Utc>, utc_offset_hours: f64) -> String {
    let local = instant + Duration::milliseconds((utc_offset_hours * 3_600_000.0).round() as i64);
    format!("{:02}:{:02}", local.hour(), local.minute())
}

/// Formats a duration in hours as `H h MM min`.
pub fn format_duration(hours: f64) -> String {
    let total_minutes = (hours.max(0.0) * 60.0).round() as i64;
    format!("{} h {:02} min", total_minutes / 60, total_minutes % 60)
}

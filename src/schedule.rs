//! Precomputed tracking schedule for one day, with interpolated lookup.

use chrono::{Duration, NaiveDate};

use crate::actuator::calculate_cable_lengths;
use crate::angles::fold_signed_angle;
use crate::astronomy::{decimal_hours, sun_position, sun_times};
use crate::celestial::CelestialProvider;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::orientation::optimal_panel_angles;
use crate::types::{
    DailySchedule, Daylight, GeoLocation, Moment, PanelOrientation, ScheduleConfig, ScheduleEntry,
};

const MINUTES_PER_DAY: i32 = 1440;

pub fn minutes_to_time(total_minutes: i32) -> (i32, i32) {
    (total_minutes / 60, total_minutes % 60)
}

pub fn intervals_per_day(interval_minutes: i32) -> i32 {
    MINUTES_PER_DAY / interval_minutes
}

/// Interpolates a signed heading along the shorter arc, result in (-180, 180].
pub fn interpolate_angle(a1: f64, a2: f64, fraction: f64) -> f64 {
    let diff = fold_signed_angle(a2 - a1);
    fold_signed_angle(a1 + diff * fraction)
}

fn interpolate_linear(a: f64, b: f64, fraction: f64) -> f64 {
    a + fraction * (b - a)
}

/// Local-clock window to sample, as minutes after local midnight.
fn sampling_window(
    daylight: Daylight,
    sunrise: Option<f64>,
    sunset: Option<f64>,
    config: &ScheduleConfig,
) -> Option<(i32, i32)> {
    match (daylight, sunrise, sunset) {
        (Daylight::PolarDay, _, _) => Some((0, MINUTES_PER_DAY - 1)),
        (Daylight::Regular, Some(rise), Some(set)) => {
            let rise = (rise * 60.0).floor() as i32;
            let mut set = (set * 60.0).ceil() as i32;
            // Sunset after local midnight.
            if set < rise {
                set += MINUTES_PER_DAY;
            }
            let start = (rise - config.sunrise_buffer_minutes).max(0);
            let end = (set + config.sunset_buffer_minutes).min(MINUTES_PER_DAY - 1);
            Some((start, end))
        }
        _ => None,
    }
}

/// Samples `date` (local calendar at the configured timezone) every
/// `schedule.interval_minutes` between sunrise and sunset, widened by the buffers.
///
/// Samples with the sun below the horizon carry no target or cables.
pub fn generate_daily_schedule<P: CelestialProvider + ?Sized>(
    provider: &P,
    config: &TrackerConfig,
    location: &GeoLocation,
    date: NaiveDate,
    schedule: &ScheduleConfig,
) -> Result<DailySchedule> {
    if schedule.interval_minutes <= 0 || schedule.interval_minutes > MINUTES_PER_DAY {
        return Err(TrackerError::InvalidInput(format!(
            "interval of {} minutes",
            schedule.interval_minutes
        )));
    }
    let tz = config.timezone;
    let local_midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TrackerError::InvalidInput(format!("no midnight on {date}")))?
        .and_utc()
        - Duration::milliseconds((tz * 3_600_000.0).round() as i64);

    // Providers key a date by the transit nearest 12:00 UTC minus the longitude
    // offset; pick the one whose transit falls on this local day.
    let provider_date = (local_midnight
        + Duration::hours(12)
        + Duration::seconds((location.longitude * 240.0).round() as i64))
    .date_naive();
    let times = sun_times(provider, location, provider_date)?;
    let window = sampling_window(
        times.daylight,
        times.sunrise.map(|t| decimal_hours(t, tz)),
        times.sunset.map(|t| decimal_hours(t, tz)),
        schedule,
    );

    let mut entries = Vec::new();
    if let Some((start, end)) = window {
        let first = start / schedule.interval_minutes;
        let last = (end / schedule.interval_minutes)
            .min(intervals_per_day(schedule.interval_minutes) - 1);
        entries.reserve((last - first + 1) as usize);
        for interval in first..=last {
            let minutes = interval * schedule.interval_minutes;
            let moment = Moment::with_offset(
                local_midnight + Duration::minutes(minutes as i64),
                tz,
            );
            let sun = sun_position(provider, location, &moment, config.apply_refraction)?;
            let (target, cables) = if sun.elevation > 0.0 {
                let m = &config.mechanics;
                let target =
                    optimal_panel_angles(sun.elevation, sun.azimuth, m.min_tilt_x, m.max_tilt_x);
                (Some(target), Some(calculate_cable_lengths(target, m)?))
            } else {
                (None, None)
            };
            entries.push(ScheduleEntry {
                minutes,
                sun,
                target,
                cables,
            });
        }
    }

    Ok(DailySchedule {
        date,
        location: *location,
        utc_offset_hours: tz,
        interval_minutes: schedule.interval_minutes,
        sun_times: times,
        entries,
    })
}

fn find_bracketing_entries(
    entries: &[ScheduleEntry],
    interval_minutes: i32,
    minutes: i32,
) -> Option<(&ScheduleEntry, Option<&ScheduleEntry>, f64)> {
    let first_minutes = entries.first()?.minutes;
    let last_minutes = entries.last()?.minutes;
    if minutes < first_minutes || minutes > last_minutes {
        return None;
    }

    let idx_before =
        ((minutes - first_minutes) / interval_minutes).min(entries.len() as i32 - 1) as usize;
    let entry_before = &entries[idx_before];
    let t0 = entry_before.minutes;
    match entries.get(idx_before + 1) {
        Some(after) if minutes != t0 => {
            let fraction = (minutes - t0) as f64 / (after.minutes - t0) as f64;
            Some((entry_before, Some(after), fraction))
        }
        _ => Some((entry_before, None, 0.0)),
    }
}

/// Target orientation at `minutes` after local midnight, interpolated between
/// the neighbouring samples. `None` outside the sampled window or at night.
pub fn lookup_schedule(schedule: &DailySchedule, minutes: i32) -> Option<PanelOrientation> {
    let (before, after, fraction) =
        find_bracketing_entries(&schedule.entries, schedule.interval_minutes, minutes)?;
    let before_target = before.target?;
    match after {
        None => Some(before_target),
        Some(after) => {
            let after_target = after.target?;
            Some(PanelOrientation {
                tilt_x: interpolate_linear(before_target.tilt_x, after_target.tilt_x, fraction),
                tilt_z: interpolate_angle(before_target.tilt_z, after_target.tilt_z, fraction),
            })
        }
    }
}

use chrono::{Duration, NaiveDate};

use solar_cable_tracker::schedule::*;
use solar_cable_tracker::{
    Daylight, GeoLocation, ScheduleConfig, SunCalc, TrackerConfig, TrackerError,
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

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config_at(timezone: f64) -> TrackerConfig {
    TrackerConfig {
        timezone,
        ..TrackerConfig::default()
    }
}

fn summer_schedule() -> solar_cable_tracker::DailySchedule {
    let location = GeoLocation::new(45.0, 5.0).unwrap();
    generate_daily_schedule(
        &SunCalc,
        &config_at(2.0),
        &location,
        date(2024, 6, 21),
        &ScheduleConfig::default(),
    )
    .unwrap()
}

// ── Time utilities ──

#[test]
fn test_known_time_conversions() {
    assert_eq!(minutes_to_time(0), (0, 0));
    assert_eq!(minutes_to_time(720), (12, 0));
    assert_eq!(minutes_to_time(1439), (23, 59));
    assert_eq!(minutes_to_time(390), (6, 30));
}

#[test]
fn test_intervals_per_day() {
    assert_eq!(intervals_per_day(5), 288);
    assert_eq!(intervals_per_day(15), 96);
    assert_eq!(intervals_per_day(30), 48);
    assert_eq!(intervals_per_day(1), 1440);
}

// ── Angle interpolation ──

#[test]
fn test_interpolate_angle_plain() {
    assert_approx!(interpolate_angle(10.0, 30.0, 0.25), 15.0, 1e-12);
    assert_approx!(interpolate_angle(-90.0, -60.0, 1.0), -60.0, 1e-12);
}

#[test]
fn test_interpolate_angle_across_wrap() {
    // The short way from 170 to -170 passes through 180.
    assert_approx!(interpolate_angle(170.0, -170.0, 0.5), 180.0, 1e-9);
    assert_approx!(interpolate_angle(-170.0, 170.0, 0.5), 180.0, 1e-9);
    assert_approx!(interpolate_angle(175.0, -175.0, 0.25), 177.5, 1e-9);
    assert_approx!(interpolate_angle(-175.0, 175.0, 0.25), -177.5, 1e-9);
}

// ── Generation ──

#[test]
fn test_summer_window_around_daylight() {
    let schedule = summer_schedule();
    assert_eq!(schedule.sun_times.daylight, Daylight::Regular);
    assert_eq!(schedule.interval_minutes, 5);
    assert_eq!(schedule.utc_offset_hours, 2.0);

    // Sunrise ~05:55 and sunset ~21:32 local, with 30 minute buffers.
    let first = schedule.entries.first().unwrap();
    let last = schedule.entries.last().unwrap();
    assert_eq!(first.minutes, 320);
    assert_eq!(last.minutes, 1320);
    assert_eq!(schedule.entries.len(), 201);

    for pair in schedule.entries.windows(2) {
        assert_eq!(pair[1].minutes - pair[0].minutes, 5);
    }
}

#[test]
fn test_targets_only_in_daylight() {
    let schedule = summer_schedule();
    assert!(schedule.entries.first().unwrap().target.is_none());
    assert!(schedule.entries.last().unwrap().target.is_none());
    for entry in &schedule.entries {
        assert_eq!(entry.target.is_some(), entry.sun.elevation > 0.0, "minutes={}", entry.minutes);
        assert_eq!(entry.target.is_some(), entry.cables.is_some());
    }
    let noon = schedule.entries.iter().find(|e| e.minutes == 825).unwrap();
    assert!(noon.sun.elevation > 65.0);
    assert!(noon.target.is_some());
}

#[test]
fn test_sun_times_follow_local_day() {
    // Local clock ten hours behind UTC, solar time eleven hours ahead of it.
    let location = GeoLocation::new(45.0, 170.0).unwrap();
    let day = date(2024, 6, 21);
    let schedule = generate_daily_schedule(
        &SunCalc,
        &config_at(-10.0),
        &location,
        day,
        &ScheduleConfig::default(),
    )
    .unwrap();
    let local = |t: chrono::DateTime<chrono::Utc>| (t - Duration::hours(10)).date_naive();
    assert_eq!(local(schedule.sun_times.solar_noon), day);
    assert_eq!(local(schedule.sun_times.sunrise.unwrap()), day);
    assert_eq!(local(schedule.sun_times.sunset.unwrap()), day);

    // Solar noon is mid-afternoon on the local clock.
    let afternoon = schedule.entries.iter().find(|e| e.minutes == 885).unwrap();
    assert!(afternoon.sun.elevation > 60.0);
    assert!(lookup_schedule(&schedule, 885).is_some());
    assert!(schedule.entries.first().unwrap().minutes > 5 * 60);
}

#[test]
fn test_polar_day_covers_whole_day() {
    let location = GeoLocation::new(80.0, 0.0).unwrap();
    let schedule = generate_daily_schedule(
        &SunCalc,
        &config_at(0.0),
        &location,
        date(2024, 6, 21),
        &ScheduleConfig::default(),
    )
    .unwrap();
    assert_eq!(schedule.sun_times.daylight, Daylight::PolarDay);
    assert_eq!(schedule.entries.len(), 288);
    assert_eq!(schedule.entries.first().unwrap().minutes, 0);
    assert_eq!(schedule.entries.last().unwrap().minutes, 1435);
    assert!(schedule.entries.iter().all(|e| e.target.is_some()));
}

#[test]
fn test_polar_night_is_empty() {
    let location = GeoLocation::new(80.0, 0.0).unwrap();
    let schedule = generate_daily_schedule(
        &SunCalc,
        &config_at(0.0),
        &location,
        date(2024, 12, 21),
        &ScheduleConfig::default(),
    )
    .unwrap();
    assert_eq!(schedule.sun_times.daylight, Daylight::PolarNight);
    assert!(schedule.entries.is_empty());
    assert_eq!(lookup_schedule(&schedule, 720), None);
}

#[test]
fn test_uneven_interval_stays_within_day() {
    let location = GeoLocation::new(80.0, 0.0).unwrap();
    let schedule = generate_daily_schedule(
        &SunCalc,
        &config_at(0.0),
        &location,
        date(2024, 6, 21),
        &ScheduleConfig {
            interval_minutes: 7,
            ..ScheduleConfig::default()
        },
    )
    .unwrap();
    assert_eq!(schedule.entries.len(), 205);
    assert!(schedule.entries.last().unwrap().minutes < 1440);
}

#[test]
fn test_invalid_interval() {
    let location = GeoLocation::new(45.0, 5.0).unwrap();
    for interval_minutes in [0, -5, 1441] {
        let result = generate_daily_schedule(
            &SunCalc,
            &TrackerConfig::default(),
            &location,
            date(2024, 6, 21),
            &ScheduleConfig {
                interval_minutes,
                ..ScheduleConfig::default()
            },
        );
        assert!(matches!(result, Err(TrackerError::InvalidInput(_))));
    }
}

// ── Lookup ──

#[test]
fn test_lookup_exact_sample() {
    let schedule = summer_schedule();
    let entry = schedule.entries.iter().find(|e| e.minutes == 600).unwrap();
    assert_eq!(lookup_schedule(&schedule, 600), entry.target);
}

#[test]
fn test_lookup_interpolates_between_samples() {
    let schedule = summer_schedule();
    let before = schedule.entries.iter().find(|e| e.minutes == 600).unwrap().target.unwrap();
    let after = schedule.entries.iter().find(|e| e.minutes == 605).unwrap().target.unwrap();
    let mid = lookup_schedule(&schedule, 602).unwrap();
    assert_approx!(mid.tilt_x, before.tilt_x + 0.4 * (after.tilt_x - before.tilt_x), 1e-9);
    assert_approx!(mid.tilt_z, interpolate_angle(before.tilt_z, after.tilt_z, 0.4), 1e-9);
}

#[test]
fn test_lookup_outside_window_or_at_night() {
    let schedule = summer_schedule();
    assert_eq!(lookup_schedule(&schedule, 120), None);
    assert_eq!(lookup_schedule(&schedule, 1439), None);
    // First sample is before sunrise.
    assert_eq!(lookup_schedule(&schedule, 320), None);
}

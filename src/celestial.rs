//! Celestial-mechanics providers.
//!
//! The rest of the crate only relies on [`CelestialProvider`]: an altitude and
//! azimuth in radians for an instant, with the azimuth measured from the south
//! and increasing clockwise (west), and the rise/set/transit events of a date.
//! [`SunCalc`] is the default implementation; [`ApproximateModel`] is a cheaper
//! low-precision alternative.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::f64::consts::PI;

use crate::angles::{self, deg_to_rad, rad_to_deg};
use crate::error::{Result, TrackerError};
use crate::types::GeoLocation;

/// Altitude for sunrise and sunset, allowing for refraction and the solar disc.
pub const SUNRISE_ALTITUDE: f64 = -0.833;
/// Altitude for civil dawn and dusk.
pub const CIVIL_TWILIGHT_ALTITUDE: f64 = -6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSunPosition {
    pub altitude: f64,
    pub azimuth: f64,
}

/// Events of one date. Events the sun never reaches (polar day or night) are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSunTimes {
    pub solar_noon: DateTime<Utc>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub dawn: Option<DateTime<Utc>>,
    pub dusk: Option<DateTime<Utc>>,
}

pub trait CelestialProvider {
    fn position_of(&self, instant: DateTime<Utc>, location: &GeoLocation)
        -> Result<RawSunPosition>;

    fn times_for(&self, date: NaiveDate, location: &GeoLocation) -> Result<RawSunTimes>;
}

impl<P: CelestialProvider + ?Sized> CelestialProvider for &P {
    fn position_of(
        &self,
        instant: DateTime<Utc>,
        location: &GeoLocation,
    ) -> Result<RawSunPosition> {
        (**self).position_of(instant, location)
    }

    fn times_for(&self, date: NaiveDate, location: &GeoLocation) -> Result<RawSunTimes> {
        (**self).times_for(date, location)
    }
}

const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
const OBLIQUITY: f64 = 23.4397 * PI / 180.0;

fn to_julian(instant: &DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

fn from_julian(j: f64) -> Option<DateTime<Utc>> {
    if !j.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(((j + 0.5 - J1970) * DAY_MS).round() as i64)
}

fn to_days(instant: &DateTime<Utc>) -> f64 {
    to_julian(instant) - J2000
}

fn right_ascension(l: f64, b: f64) -> f64 {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

fn declination(l: f64, b: f64) -> f64 {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    deg_to_rad(280.16 + 360.9856235 * d) - lw
}

fn solar_mean_anomaly(d: f64) -> f64 {
    deg_to_rad(357.5291 + 0.98560028 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let c = deg_to_rad(1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    let perihelion = deg_to_rad(102.9372);
    m + c + perihelion + PI
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / (2.0 * PI)).round()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

/// NaN when the sun never reaches altitude `h` on that day.
fn hour_angle_for(h: f64, phi: f64, dec: f64) -> f64 {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

/// The algorithm of the suncalc library (after the astronomy answers formulas),
/// good to a fraction of a degree over several centuries around J2000.
#[derive(Debug, Clone, Copy, Default)]
pub struct SunCalc;

impl SunCalc {
    #[allow(clippy::too_many_arguments)]
    fn rise_and_set(
        altitude: f64,
        lw: f64,
        phi: f64,
        dec: f64,
        n: f64,
        m: f64,
        l: f64,
        j_noon: f64,
    ) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let w = hour_angle_for(deg_to_rad(altitude), phi, dec);
        let a = approx_transit(w, lw, n);
        let j_set = solar_transit_j(a, m, l);
        let j_rise = j_noon - (j_set - j_noon);
        (from_julian(j_rise), from_julian(j_set))
    }
}

impl CelestialProvider for SunCalc {
    fn position_of(
        &self,
        instant: DateTime<Utc>,
        location: &GeoLocation,
    ) -> Result<RawSunPosition> {
        let lw = deg_to_rad(-location.longitude);
        let phi = deg_to_rad(location.latitude);
        let d = to_days(&instant);

        let m = solar_mean_anomaly(d);
        let l = ecliptic_longitude(m);
        let dec = declination(l, 0.0);
        let ra = right_ascension(l, 0.0);
        let h = sidereal_time(d, lw) - ra;

        Ok(RawSunPosition {
            altitude: (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin(),
            azimuth: h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos()),
        })
    }

    fn times_for(&self, date: NaiveDate, location: &GeoLocation) -> Result<RawSunTimes> {
        let lw = deg_to_rad(-location.longitude);
        let phi = deg_to_rad(location.latitude);

        // Anchor on the approximate local noon so the julian cycle picks this date's transit.
        let anchor = date
            .and_hms_opt(12, 0, 0)
            .ok_or_else(|| TrackerError::InvalidInput(format!("no noon on {date}")))?
            .and_utc()
            - Duration::seconds((location.longitude * 240.0).round() as i64);
        let d = to_days(&anchor);

        let n = julian_cycle(d, lw);
        let ds = approx_transit(0.0, lw, n);
        let m = solar_mean_anomaly(ds);
        let l = ecliptic_longitude(m);
        let dec = declination(l, 0.0);
        let j_noon = solar_transit_j(ds, m, l);

        let solar_noon = from_julian(j_noon).ok_or_else(|| {
            TrackerError::UpstreamUnavailable(format!("no solar transit on {date}"))
        })?;
        let (sunrise, sunset) =
            Self::rise_and_set(SUNRISE_ALTITUDE, lw, phi, dec, n, m, l, j_noon);
        let (dawn, dusk) =
            Self::rise_and_set(CIVIL_TWILIGHT_ALTITUDE, lw, phi, dec, n, m, l, j_noon);

        Ok(RawSunTimes {
            solar_noon,
            sunrise,
            sunset,
            dawn,
            dusk,
        })
    }
}

/// Cooper's approximation of the solar declination in degrees for day-of-year `n`.
fn cooper_declination(n: i32) -> f64 {
    23.45 * deg_to_rad(360.0 * ((284 + n) as f64 / 365.0)).sin()
}

/// Textbook model: Cooper declination, Spencer equation of time and the
/// spherical hour-angle relations. Accurate to about a degree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateModel;

impl ApproximateModel {
    /// Hours between UTC and local solar time at `longitude` on day `n`.
    fn solar_offset_hours(longitude: f64, n: i32) -> f64 {
        (angles::MINUTES_PER_DEGREE * longitude + angles::equation_of_time(n)) / 60.0
    }
}

impl CelestialProvider for ApproximateModel {
    fn position_of(
        &self,
        instant: DateTime<Utc>,
        location: &GeoLocation,
    ) -> Result<RawSunPosition> {
        let n = instant.ordinal() as i32;
        let utc_hours = instant.hour() as f64
            + instant.minute() as f64 / 60.0
            + instant.second() as f64 / 3600.0;
        let lst = angles::normalize_hours(utc_hours + Self::solar_offset_hours(location.longitude, n));
        let ha = deg_to_rad(angles::DEGREES_PER_HOUR * (lst - 12.0));
        let lat = deg_to_rad(location.latitude);
        let dec = deg_to_rad(cooper_declination(n));

        let cos_zenith = lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos();
        let altitude = PI / 2.0 - cos_zenith.clamp(-1.0, 1.0).acos();

        let sin_az = -dec.cos() * ha.sin();
        let cos_az = dec.sin() * lat.cos() - dec.cos() * lat.sin() * ha.cos();
        let north_azimuth = rad_to_deg(sin_az.atan2(cos_az));

        Ok(RawSunPosition {
            altitude,
            azimuth: deg_to_rad(angles::fold_signed_angle(north_azimuth - 180.0)),
        })
    }

    fn times_for(&self, date: NaiveDate, location: &GeoLocation) -> Result<RawSunTimes> {
        let n = date.ordinal() as i32;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| TrackerError::InvalidInput(format!("no midnight on {date}")))?
            .and_utc();
        let at = |hours: f64| midnight + Duration::milliseconds((hours * 3_600_000.0).round() as i64);

        let noon_hours = 12.0 - Self::solar_offset_hours(location.longitude, n);
        let lat = deg_to_rad(location.latitude);
        let dec = deg_to_rad(cooper_declination(n));
        let events = |altitude: f64| {
            let w = hour_angle_for(deg_to_rad(altitude), lat, dec);
            if w.is_nan() {
                return (None, None);
            }
            let half_day = rad_to_deg(w) / angles::DEGREES_PER_HOUR;
            (Some(at(noon_hours - half_day)), Some(at(noon_hours + half_day)))
        };
        let (sunrise, sunset) = events(SUNRISE_ALTITUDE);
        let (dawn, dusk) = events(CIVIL_TWILIGHT_ALTITUDE);

        Ok(RawSunTimes {
            solar_noon: at(noon_hours),
            sunrise,
            sunset,
            dawn,
            dusk,
        })
    }
}

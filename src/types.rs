use chrono::{DateTime, Datelike, Duration, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Observer position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    /// Checks the coordinate ranges. NaN is rejected along with out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TrackerError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TrackerError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// An absolute instant, plus the caller's UTC offset in hours when known.
///
/// The offset only affects calendar-dependent calculations (day of year for the
/// equation of time) and time-of-day conversions; the instant itself is always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moment {
    pub instant: DateTime<Utc>,
    pub utc_offset_hours: Option<f64>,
}

impl Moment {
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            utc_offset_hours: None,
        }
    }

    pub fn with_offset(instant: DateTime<Utc>, utc_offset_hours: f64) -> Self {
        Self {
            instant,
            utc_offset_hours: Some(utc_offset_hours),
        }
    }

    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let offset_secs = dt.offset().fix().local_minus_utc();
        Self::with_offset(dt.with_timezone(&Utc), offset_secs as f64 / 3600.0)
    }

    /// Calendar date as seen by the caller (UTC when no offset is attached).
    pub fn local_date(&self) -> NaiveDate {
        let offset_ms = (self.utc_offset_hours.unwrap_or(0.0) * 3_600_000.0).round() as i64;
        (self.instant + Duration::milliseconds(offset_ms)).date_naive()
    }

    pub fn day_of_year(&self) -> i32 {
        self.local_date().ordinal() as i32
    }
}

/// Sun position as seen from the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    /// Degrees above the horizon, negative below it.
    pub elevation: f64,
    /// Degrees clockwise from north, in [0, 360).
    pub azimuth: f64,
    /// Altitude as returned by the celestial provider, radians.
    pub raw_altitude: f64,
    /// Azimuth as returned by the celestial provider, radians from south, clockwise.
    pub raw_azimuth: f64,
    /// Minutes.
    pub equation_of_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Daylight {
    Regular,
    /// The sun never sets on this date.
    PolarDay,
    /// The sun never rises on this date.
    PolarNight,
    /// The provider reported a sunset before the sunrise.
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunTimes {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub solar_noon: DateTime<Utc>,
    pub dawn: Option<DateTime<Utc>>,
    pub dusk: Option<DateTime<Utc>>,
    /// Hours, never negative.
    pub day_length: f64,
    pub daylight: Daylight,
}

/// Panel attitude in degrees.
///
/// `tilt_x` is the inclination (0 = horizontal). `tilt_z` is the rotation about
/// the vertical axis, positive towards the east.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelOrientation {
    pub tilt_x: f64,
    pub tilt_z: f64,
}

/// Geometry and limits of the two-cable actuator. Lengths share one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MechanicalConstraints {
    pub base_cable_length: f64,
    /// Length added to both cables per degree of inclination.
    pub tilt_x_factor: f64,
    /// Length moved between the cables per degree of rotation.
    pub tilt_z_factor: f64,
    pub min_length: f64,
    pub max_length: f64,
    pub max_difference: f64,
    /// 0 = rigid, 1 = fully elastic.
    pub elasticity: f64,
    pub min_tilt_x: f64,
    pub max_tilt_x: f64,
}

impl Default for MechanicalConstraints {
    fn default() -> Self {
        Self {
            base_cable_length: 80.0,
            tilt_x_factor: 0.35,
            tilt_z_factor: 0.8,
            min_length: 30.0,
            max_length: 120.0,
            max_difference: 50.0,
            elasticity: 0.1,
            min_tilt_x: 0.0,
            max_tilt_x: 90.0,
        }
    }
}

impl MechanicalConstraints {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("base_cable_length", self.base_cable_length),
            ("tilt_x_factor", self.tilt_x_factor),
            ("tilt_z_factor", self.tilt_z_factor),
            ("min_length", self.min_length),
            ("max_length", self.max_length),
            ("max_difference", self.max_difference),
            ("elasticity", self.elasticity),
            ("min_tilt_x", self.min_tilt_x),
            ("max_tilt_x", self.max_tilt_x),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TrackerError::InvalidConstraints(format!("{name} is not finite")));
        }
        if self.tilt_x_factor < 0.0 || self.tilt_z_factor < 0.0 {
            return Err(TrackerError::InvalidConstraints(
                "tilt factors must not be negative".into(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(TrackerError::InvalidConstraints(format!(
                "min_length {} exceeds max_length {}",
                self.min_length, self.max_length
            )));
        }
        if self.max_difference < 0.0 {
            return Err(TrackerError::InvalidConstraints(
                "max_difference must not be negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.elasticity) {
            return Err(TrackerError::InvalidConstraints(format!(
                "elasticity {} outside [0, 1]",
                self.elasticity
            )));
        }
        if self.min_tilt_x > self.max_tilt_x {
            return Err(TrackerError::InvalidConstraints(format!(
                "min_tilt_x {} exceeds max_tilt_x {}",
                self.min_tilt_x, self.max_tilt_x
            )));
        }
        Ok(())
    }
}

/// Which constraint classes the cable solver had to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AppliedConstraints {
    pub min_length: bool,
    pub max_length: bool,
    pub max_difference: bool,
}

impl AppliedConstraints {
    pub fn any(&self) -> bool {
        self.min_length || self.max_length || self.max_difference
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CableLengths {
    pub se_length: f64,
    pub sw_length: f64,
    pub se_tension: f64,
    pub sw_tension: f64,
    pub constraints: AppliedConstraints,
}

/// Per-axis efficiency losses in percent. `total` is not the sum of the axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyLosses {
    pub tilt_x: f64,
    pub tilt_z: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyReport {
    /// In [0, 100].
    pub efficiency: f64,
    pub optimal: PanelOrientation,
    /// Combined angular deviation in degrees.
    pub angle_difference: f64,
    pub losses: EfficiencyLosses,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackingPlan {
    pub sun: SunPosition,
    pub target: PanelOrientation,
    pub cables: CableLengths,
    /// Orientation actually realised by `cables`.
    pub achieved: PanelOrientation,
    pub efficiency: EfficiencyReport,
    pub tracking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DemoScenario {
    SummerSolstice,
    WinterSolstice,
    Equinox,
    FullDay,
    SnowLoad,
    WindStress,
    Optimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForcedCables {
    pub se_length: f64,
    pub sw_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemoConfig {
    pub scenario: DemoScenario,
    pub day_of_year: u32,
    /// Local solar time in hours.
    pub hour: f64,
    pub tracking: bool,
    pub forced_cables: Option<ForcedCables>,
    /// Playback speed multiplier.
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub interval_minutes: i32,
    pub sunrise_buffer_minutes: i32,
    pub sunset_buffer_minutes: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            sunrise_buffer_minutes: 30,
            sunset_buffer_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleEntry {
    /// Minutes after local midnight.
    pub minutes: i32,
    pub sun: SunPosition,
    pub target: Option<PanelOrientation>,
    pub cables: Option<CableLengths>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub location: GeoLocation,
    pub utc_offset_hours: f64,
    pub interval_minutes: i32,
    pub sun_times: SunTimes,
    pub entries: Vec<ScheduleEntry>,
}

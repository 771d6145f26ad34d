use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};

use crate::astronomy::solar_time_to_local_time;
use crate::error::{Result, TrackerError};
use crate::types::{DemoConfig, DemoScenario, ForcedCables, GeoLocation, Moment};

impl DemoScenario {
    pub const ALL: [DemoScenario; 7] = [
        DemoScenario::SummerSolstice,
        DemoScenario::WinterSolstice,
        DemoScenario::Equinox,
        DemoScenario::FullDay,
        DemoScenario::SnowLoad,
        DemoScenario::WindStress,
        DemoScenario::Optimization,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            DemoScenario::SummerSolstice => "solstice-summer",
            DemoScenario::WinterSolstice => "solstice-winter",
            DemoScenario::Equinox => "equinox",
            DemoScenario::FullDay => "full-day",
            DemoScenario::SnowLoad => "snow-load",
            DemoScenario::WindStress => "wind-stress",
            DemoScenario::Optimization => "optimization-demo",
        }
    }
}

impl fmt::Display for DemoScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DemoScenario {
    type Err = TrackerError;

    /// Accepts the kebab-case tags and the French names used by the dashboard.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "solstice-summer" | "solsticeEte" => Ok(DemoScenario::SummerSolstice),
            "solstice-winter" | "solsticeHiver" => Ok(DemoScenario::WinterSolstice),
            "equinox" | "equinoxe" => Ok(DemoScenario::Equinox),
            "full-day" | "journee" => Ok(DemoScenario::FullDay),
            "snow-load" | "neige" => Ok(DemoScenario::SnowLoad),
            "wind-stress" | "vent" => Ok(DemoScenario::WindStress),
            "optimization-demo" | "optimisation" => Ok(DemoScenario::Optimization),
            other => Err(TrackerError::UnknownScenario(other.to_string())),
        }
    }
}

const SUMMER_SOLSTICE_DAY: u32 = 172;
const WINTER_SOLSTICE_DAY: u32 = 355;
const SPRING_EQUINOX_DAY: u32 = 80;

/// Canned inputs for `scenario`.
///
/// `today` is only read by [`DemoScenario::FullDay`], which replays the given
/// date from 06:00; `default_speed` is used unless the scenario sets its own.
pub fn demo_config(scenario: DemoScenario, today: NaiveDate, default_speed: f64) -> DemoConfig {
    use chrono::Datelike;

    let base = DemoConfig {
        scenario,
        day_of_year: SUMMER_SOLSTICE_DAY,
        hour: 12.0,
        tracking: true,
        forced_cables: None,
        speed: default_speed,
    };
    match scenario {
        DemoScenario::SummerSolstice => base,
        DemoScenario::WinterSolstice => DemoConfig {
            day_of_year: WINTER_SOLSTICE_DAY,
            ..base
        },
        DemoScenario::Equinox => DemoConfig {
            day_of_year: SPRING_EQUINOX_DAY,
            ..base
        },
        DemoScenario::FullDay => DemoConfig {
            day_of_year: today.ordinal(),
            hour: 6.0,
            speed: 2.0,
            ..base
        },
        // Panel laid flat.
        DemoScenario::SnowLoad => DemoConfig {
            day_of_year: WINTER_SOLSTICE_DAY,
            tracking: false,
            forced_cables: Some(ForcedCables {
                se_length: 80.0,
                sw_length: 80.0,
            }),
            ..base
        },
        // Both cables fully retracted.
        DemoScenario::WindStress => DemoConfig {
            tracking: false,
            forced_cables: Some(ForcedCables {
                se_length: 30.0,
                sw_length: 30.0,
            }),
            ..base
        },
        DemoScenario::Optimization => DemoConfig {
            speed: 0.5,
            ..base
        },
    }
}

impl DemoConfig {
    /// The instant this scenario describes in `year`, with `hour` read as local
    /// solar time at `location` and the result tagged with `timezone`.
    pub fn moment(&self, year: i32, location: &GeoLocation, timezone: f64) -> Result<Moment> {
        location.validate()?;
        let date = NaiveDate::from_yo_opt(year, self.day_of_year).ok_or_else(|| {
            TrackerError::InvalidInput(format!("day {} does not exist in {year}", self.day_of_year))
        })?;
        let midnight_utc = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| TrackerError::InvalidInput(format!("no midnight on {date}")))?
            .and_utc();
        let to_instant =
            |hours: f64| midnight_utc + Duration::milliseconds((hours * 3_600_000.0).round() as i64);

        // Local noon only fixes the calendar day for the equation of time.
        let reference = Moment::with_offset(to_instant(12.0 - timezone), timezone);
        let local = solar_time_to_local_time(self.hour, location.longitude, timezone, &reference);
        Ok(Moment::with_offset(to_instant(local - timezone), timezone))
    }
}

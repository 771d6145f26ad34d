pub mod actuator;
pub mod angles;
pub mod astronomy;
pub mod celestial;
pub mod config;
pub mod demo;
pub mod efficiency;
pub mod error;
pub mod orientation;
pub mod schedule;
pub mod tracker;
pub mod types;

pub use actuator::{
    cable_tension, calculate_cable_lengths, forced_cable_lengths, orientation_from_cables,
};

pub use angles::{
    deg_to_rad, equation_of_time, fold_signed_angle, normalize_angle, normalize_hours,
    rad_to_deg, refraction_correction, DEGREES_PER_HOUR, REFRACTION_CUTOFF,
};

pub use astronomy::{
    decimal_hours, equation_of_time_at, format_clock, format_duration, local_time_to_solar_time,
    solar_time_to_local_time, sun_position, sun_times,
};

pub use celestial::{ApproximateModel, CelestialProvider, RawSunPosition, RawSunTimes, SunCalc};

pub use config::{AttributeSource, AttributeValue, ConfigOverrides, TrackerConfig};

pub use demo::demo_config;

pub use efficiency::panel_efficiency;

pub use error::{ErrorKind, Result, TrackerError};

pub use orientation::optimal_panel_angles;

pub use schedule::{generate_daily_schedule, interpolate_angle, lookup_schedule};

pub use tracker::SolarTracker;

pub use types::{
    AppliedConstraints, CableLengths, DailySchedule, Daylight, DemoConfig, DemoScenario,
    EfficiencyLosses, EfficiencyReport, ForcedCables, GeoLocation, MechanicalConstraints, Moment,
    PanelOrientation, ScheduleConfig, ScheduleEntry, SunPosition, SunTimes, TrackingPlan,
};

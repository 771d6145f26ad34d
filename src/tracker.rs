use std::sync::RwLock;

use chrono::NaiveDate;
use log::debug;

use crate::actuator::{calculate_cable_lengths, forced_cable_lengths, orientation_from_cables};
use crate::astronomy;
use crate::celestial::{CelestialProvider, SunCalc};
use crate::config::{ConfigOverrides, TrackerConfig};
use crate::efficiency::panel_efficiency;
use crate::error::Result;
use crate::orientation::optimal_panel_angles;
use crate::schedule::generate_daily_schedule;
use crate::types::{
    DailySchedule, DemoConfig, EfficiencyReport, GeoLocation, Moment, PanelOrientation,
    ScheduleConfig, SunPosition, SunTimes, TrackingPlan,
};

/// Runs the location → sun → orientation → cables pipeline against a shared,
/// replaceable configuration.
///
/// Every call copies the configuration once on entry, so a concurrent
/// [`SolarTracker::set_config`] is seen either entirely or not at all.
pub struct SolarTracker<P = SunCalc> {
    provider: P,
    config: RwLock<TrackerConfig>,
}

impl SolarTracker<SunCalc> {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_provider(SunCalc, config)
    }
}

impl<P: CelestialProvider> SolarTracker<P> {
    pub fn with_provider(provider: P, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            config: RwLock::new(config),
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> TrackerConfig {
        // The config is plain data, so a poisoned lock still holds a usable value.
        match self.config.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_config(&self, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        match self.config.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
        Ok(())
    }

    pub fn sun_position(&self, location: &GeoLocation, moment: &Moment) -> Result<SunPosition> {
        let config = self.config();
        astronomy::sun_position(&self.provider, location, moment, config.apply_refraction)
    }

    pub fn sun_times(&self, location: &GeoLocation, date: NaiveDate) -> Result<SunTimes> {
        astronomy::sun_times(&self.provider, location, date)
    }

    /// Solar to clock time, in the moment's own offset if it has one, else the
    /// configured timezone.
    pub fn solar_to_local_time(&self, solar_time: f64, longitude: f64, moment: &Moment) -> f64 {
        let timezone = moment.utc_offset_hours.unwrap_or(self.config().timezone);
        astronomy::solar_time_to_local_time(solar_time, longitude, timezone, moment)
    }

    pub fn local_to_solar_time(&self, local_time: f64, longitude: f64, moment: &Moment) -> f64 {
        let timezone = moment.utc_offset_hours.unwrap_or(self.config().timezone);
        astronomy::local_time_to_solar_time(local_time, longitude, timezone, moment)
    }

    pub fn efficiency(&self, actual: PanelOrientation, sun: &SunPosition) -> EfficiencyReport {
        let m = self.config().mechanics;
        panel_efficiency(actual, sun.elevation, sun.azimuth, m.min_tilt_x, m.max_tilt_x)
    }

    pub fn plan(&self, location: &GeoLocation, moment: &Moment) -> Result<TrackingPlan> {
        let config = self.config();
        self.plan_with_config(&config, location, moment)
    }

    /// Like [`SolarTracker::plan`], with `overrides` taking precedence over the
    /// configuration for this call only.
    pub fn plan_with(
        &self,
        location: &GeoLocation,
        moment: &Moment,
        overrides: &ConfigOverrides,
    ) -> Result<TrackingPlan> {
        let config = self.config().with_overrides(overrides);
        config.validate()?;
        self.plan_with_config(&config, location, moment)
    }

    fn plan_with_config(
        &self,
        config: &TrackerConfig,
        location: &GeoLocation,
        moment: &Moment,
    ) -> Result<TrackingPlan> {
        let m = &config.mechanics;
        let sun = astronomy::sun_position(&self.provider, location, moment, config.apply_refraction)?;
        let target = optimal_panel_angles(sun.elevation, sun.azimuth, m.min_tilt_x, m.max_tilt_x);
        let cables = calculate_cable_lengths(target, m)?;
        let achieved = orientation_from_cables(cables.se_length, cables.sw_length, m);
        let efficiency =
            panel_efficiency(achieved, sun.elevation, sun.azimuth, m.min_tilt_x, m.max_tilt_x);
        debug!(
            "plan: target ({:.2}, {:.2}), achieved ({:.2}, {:.2}), efficiency {:.1}%",
            target.tilt_x, target.tilt_z, achieved.tilt_x, achieved.tilt_z, efficiency.efficiency
        );
        Ok(TrackingPlan {
            sun,
            target,
            cables,
            achieved,
            efficiency,
            tracking: true,
        })
    }

    /// Runs a demo scenario in `year`. Forced cable lengths replace the solved ones.
    pub fn run_scenario(
        &self,
        location: &GeoLocation,
        demo: &DemoConfig,
        year: i32,
    ) -> Result<TrackingPlan> {
        let config = self.config();
        let moment = demo.moment(year, location, config.timezone)?;
        let mut plan = self.plan_with_config(&config, location, &moment)?;
        if let Some(forced) = demo.forced_cables {
            let m = &config.mechanics;
            plan.cables = forced_cable_lengths(forced.se_length, forced.sw_length, m);
            plan.achieved = orientation_from_cables(forced.se_length, forced.sw_length, m);
            plan.efficiency = panel_efficiency(
                plan.achieved,
                plan.sun.elevation,
                plan.sun.azimuth,
                m.min_tilt_x,
                m.max_tilt_x,
            );
        }
        plan.tracking = demo.tracking;
        debug!("scenario {} at {}: {:?}", demo.scenario, moment.instant, plan.cables);
        Ok(plan)
    }

    pub fn daily_schedule(
        &self,
        location: &GeoLocation,
        date: NaiveDate,
        schedule: &ScheduleConfig,
    ) -> Result<DailySchedule> {
        let config = self.config();
        generate_daily_schedule(&self.provider, &config, location, date, schedule)
    }
}

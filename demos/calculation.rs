use chrono::{Datelike, NaiveDate, TimeZone};
use chrono_tz::Europe::Paris;

use solar_cable_tracker::schedule::{lookup_schedule, minutes_to_time};
use solar_cable_tracker::{
    demo_config, format_clock, format_duration, DemoScenario, GeoLocation, Moment,
    ScheduleConfig, SolarTracker, TrackerConfig,
};

fn main() -> solar_cable_tracker::Result<()> {
    env_logger::init();

    let location = GeoLocation::new(45.0, 5.0)?;
    let tracker = SolarTracker::new(TrackerConfig {
        timezone: 2.0,
        ..TrackerConfig::default()
    })?;

    let dt = Paris
        .with_ymd_and_hms(2024, 6, 21, 14, 0, 0)
        .single()
        .ok_or_else(|| solar_cable_tracker::TrackerError::InvalidInput("ambiguous time".into()))?;
    let moment = Moment::from_datetime(&dt);
    let plan = tracker.plan(&location, &moment)?;

    println!("=== Cable Tracker Calculation Example ===");
    println!(
        "Location: {:.1}°N, {:.1}°E",
        location.latitude, location.longitude
    );
    println!("Date/Time: {}", dt);
    println!();
    println!("--- Sun ---");
    println!("Elevation: {:.2}°", plan.sun.elevation);
    println!("Azimuth: {:.2}° (0°=N, 90°=E, 180°=S)", plan.sun.azimuth);
    println!("Equation of Time: {:.2} minutes", plan.sun.equation_of_time);
    println!();
    println!("--- Panel ---");
    println!("Target: tilt X {:.2}°, tilt Z {:.2}°", plan.target.tilt_x, plan.target.tilt_z);
    println!(
        "Achieved: tilt X {:.2}°, tilt Z {:.2}°",
        plan.achieved.tilt_x, plan.achieved.tilt_z
    );
    println!(
        "Cables: SE {:.1} (tension {:.2}), SW {:.1} (tension {:.2})",
        plan.cables.se_length, plan.cables.se_tension, plan.cables.sw_length, plan.cables.sw_tension
    );
    println!("Constraints applied: {:?}", plan.cables.constraints);
    println!(
        "Efficiency: {:.1}% (loss X {:.1}%, loss Z {:.1}%)",
        plan.efficiency.efficiency, plan.efficiency.losses.tilt_x, plan.efficiency.losses.tilt_z
    );

    let date = dt.date_naive();
    let times = tracker.sun_times(&location, date)?;
    println!();
    println!("--- Sun Times ---");
    if let (Some(rise), Some(set)) = (times.sunrise, times.sunset) {
        println!("Sunrise: {}", format_clock(rise, 2.0));
        println!("Sunset: {}", format_clock(set, 2.0));
    }
    println!("Solar noon: {}", format_clock(times.solar_noon, 2.0));
    println!("Day length: {}", format_duration(times.day_length));

    let schedule = tracker.daily_schedule(&location, date, &ScheduleConfig::default())?;
    println!();
    println!("--- Schedule ({} samples) ---", schedule.entries.len());
    for minutes in (6 * 60..=21 * 60).step_by(180) {
        let (h, m) = minutes_to_time(minutes);
        match lookup_schedule(&schedule, minutes) {
            Some(o) => println!("{:02}:{:02}  tilt X {:6.2}°  tilt Z {:7.2}°", h, m, o.tilt_x, o.tilt_z),
            None => println!("{:02}:{:02}  parked", h, m),
        }
    }

    println!();
    println!("--- Scenarios ---");
    let today = NaiveDate::from_ymd_opt(date.year(), 9, 1).unwrap_or(date);
    for scenario in DemoScenario::ALL {
        let demo = demo_config(scenario, today, tracker.config().demo_speed);
        let plan = tracker.run_scenario(&location, &demo, date.year())?;
        println!(
            "{:<18} elevation {:6.2}°  SE {:6.1}  SW {:6.1}  efficiency {:5.1}%",
            scenario.to_string(),
            plan.sun.elevation,
            plan.cables.se_length,
            plan.cables.sw_length,
            plan.efficiency.efficiency
        );
    }
    Ok(())
}

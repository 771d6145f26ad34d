//! Tracker configuration.
//!
//! Defaults are resolved once, either from a TOML file or from an external
//! [`AttributeSource`], into a [`TrackerConfig`] value. Per-call overrides are
//! layered on top with [`TrackerConfig::with_overrides`].

use std::collections::HashMap;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::error::{Result, TrackerError};
use crate::types::MechanicalConstraints;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub mechanics: MechanicalConstraints,
    /// Hours from UTC.
    pub timezone: f64,
    pub apply_refraction: bool,
    pub demo_speed: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            mechanics: MechanicalConstraints::default(),
            timezone: 0.0,
            apply_refraction: true,
            demo_speed: 1.0,
        }
    }
}

/// Caller-supplied values that take precedence over the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub base_cable_length: Option<f64>,
    pub tilt_x_factor: Option<f64>,
    pub tilt_z_factor: Option<f64>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub max_difference: Option<f64>,
    pub elasticity: Option<f64>,
    pub min_tilt_x: Option<f64>,
    pub max_tilt_x: Option<f64>,
    pub timezone: Option<f64>,
    pub apply_refraction: Option<bool>,
    pub demo_speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Flag(bool),
}

/// External key/value store of default settings.
///
/// `Ok(None)` means the key is not set; an `Err` means the store itself could
/// not be reached.
pub trait AttributeSource {
    fn attribute(&self, key: &str) -> Result<Option<AttributeValue>>;
}

impl AttributeSource for HashMap<String, AttributeValue> {
    fn attribute(&self, key: &str) -> Result<Option<AttributeValue>> {
        Ok(self.get(key).copied())
    }
}

fn number(source: &dyn AttributeSource, key: &str, target: &mut f64) -> Result<()> {
    match source.attribute(key).map_err(|err| upstream(key, err))? {
        Some(AttributeValue::Number(value)) => *target = value,
        Some(AttributeValue::Flag(_)) => {
            return Err(TrackerError::InvalidInput(format!("attribute {key} must be a number")))
        }
        None => {}
    }
    Ok(())
}

fn flag(source: &dyn AttributeSource, key: &str, target: &mut bool) -> Result<()> {
    match source.attribute(key).map_err(|err| upstream(key, err))? {
        Some(AttributeValue::Flag(value)) => *target = value,
        Some(AttributeValue::Number(_)) => {
            return Err(TrackerError::InvalidInput(format!("attribute {key} must be a flag")))
        }
        None => {}
    }
    Ok(())
}

fn upstream(key: &str, err: TrackerError) -> TrackerError {
    warn!("attribute source failed for {key}: {err}");
    match err {
        TrackerError::UpstreamUnavailable(_) => err,
        other => TrackerError::UpstreamUnavailable(format!("attribute {key}: {other}")),
    }
}

impl TrackerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Reads every known key from `source`, keeping the built-in default for
    /// keys it does not define.
    pub fn from_source(source: &dyn AttributeSource) -> Result<Self> {
        let mut config = TrackerConfig::default();
        let m = &mut config.mechanics;
        number(source, "baseCableLength", &mut m.base_cable_length)?;
        number(source, "tiltXFactor", &mut m.tilt_x_factor)?;
        number(source, "tiltZFactor", &mut m.tilt_z_factor)?;
        number(source, "minLength", &mut m.min_length)?;
        number(source, "maxLength", &mut m.max_length)?;
        number(source, "maxDifference", &mut m.max_difference)?;
        number(source, "elasticity", &mut m.elasticity)?;
        number(source, "minTiltX", &mut m.min_tilt_x)?;
        number(source, "maxTiltX", &mut m.max_tilt_x)?;
        number(source, "timezone", &mut config.timezone)?;
        flag(source, "applyRefraction", &mut config.apply_refraction)?;
        number(source, "demoSpeed", &mut config.demo_speed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let o = overrides;
        let m = &self.mechanics;
        TrackerConfig {
            mechanics: MechanicalConstraints {
                base_cable_length: o.base_cable_length.unwrap_or(m.base_cable_length),
                tilt_x_factor: o.tilt_x_factor.unwrap_or(m.tilt_x_factor),
                tilt_z_factor: o.tilt_z_factor.unwrap_or(m.tilt_z_factor),
                min_length: o.min_length.unwrap_or(m.min_length),
                max_length: o.max_length.unwrap_or(m.max_length),
                max_difference: o.max_difference.unwrap_or(m.max_difference),
                elasticity: o.elasticity.unwrap_or(m.elasticity),
                min_tilt_x: o.min_tilt_x.unwrap_or(m.min_tilt_x),
                max_tilt_x: o.max_tilt_x.unwrap_or(m.max_tilt_x),
            },
            timezone: o.timezone.unwrap_or(self.timezone),
            apply_refraction: o.apply_refraction.unwrap_or(self.apply_refraction),
            demo_speed: o.demo_speed.unwrap_or(self.demo_speed),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.mechanics.validate()?;
        if !(-14.0..=14.0).contains(&self.timezone) {
            return Err(TrackerError::InvalidInput(format!(
                "timezone {} outside [-14, 14]",
                self.timezone
            )));
        }
        if !(self.demo_speed.is_finite() && self.demo_speed > 0.0) {
            return Err(TrackerError::InvalidInput(format!(
                "demo speed {} must be positive",
                self.demo_speed
            )));
        }
        Ok(())
    }
}

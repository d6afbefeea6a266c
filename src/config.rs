//! Protocol configuration
//!
//! JSON description of a lighting protocol plus optional pulses overlaid on
//! top of it. Every parameter falls back to the protocol builder defaults:
//!
//! ```json
//! {
//!   "protocol": "social_jetlag",
//!   "num_regular_days": 5,
//!   "num_jetlag_days": 2,
//!   "pulses": [{ "start": 150.0, "end": 151.0, "intensity": 1000.0 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, DomainError};
use crate::light::Light;
use crate::protocols::{
    regular_light, shift_work_light, slam_shift, social_jetlag, DEFAULT_LUX,
};
use crate::pulse::Pulse;

/// Lighting protocol and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProtocolConfig {
    /// A single 24-hour day
    Regular {
        #[serde(default = "default_lux")]
        lux: f64,
        #[serde(default = "default_lights_on")]
        lights_on: f64,
        #[serde(default = "default_lights_off")]
        lights_off: f64,
    },
    /// Night-shift work days followed by days off
    ShiftWork {
        #[serde(default = "default_lux")]
        lux: f64,
        #[serde(default = "default_days_on")]
        days_on: u32,
        #[serde(default = "default_days_off")]
        days_off: u32,
    },
    /// Abrupt shift of the light schedule
    SlamShift {
        #[serde(default = "default_lux")]
        lux: f64,
        #[serde(default = "default_shift")]
        shift: f64,
        #[serde(default = "default_slam_days")]
        before_days: u32,
        #[serde(default = "default_slam_days")]
        after_days: u32,
        #[serde(default = "default_lights_on")]
        starting_lights_on: f64,
    },
    /// Regular days followed by delayed days
    SocialJetlag {
        #[serde(default = "default_lux")]
        lux: f64,
        #[serde(default = "default_regular_days")]
        num_regular_days: u32,
        #[serde(default = "default_jetlag_days")]
        num_jetlag_days: u32,
        #[serde(default = "default_hours_delayed")]
        hours_delayed: f64,
        #[serde(default = "default_jetlag_lights_on")]
        regular_days_lights_on: f64,
    },
}

fn default_lux() -> f64 {
    DEFAULT_LUX
}
fn default_lights_on() -> f64 {
    8.0
}
fn default_lights_off() -> f64 {
    16.0
}
fn default_days_on() -> u32 {
    3
}
fn default_days_off() -> u32 {
    2
}
fn default_shift() -> f64 {
    8.0
}
fn default_slam_days() -> u32 {
    10
}
fn default_regular_days() -> u32 {
    5
}
fn default_jetlag_days() -> u32 {
    2
}
fn default_hours_delayed() -> f64 {
    2.0
}
fn default_jetlag_lights_on() -> f64 {
    7.0
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig::Regular {
            lux: default_lux(),
            lights_on: default_lights_on(),
            lights_off: default_lights_off(),
        }
    }
}

impl ProtocolConfig {
    /// Protocol name as used in the `protocol` tag
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolConfig::Regular { .. } => "regular",
            ProtocolConfig::ShiftWork { .. } => "shift_work",
            ProtocolConfig::SlamShift { .. } => "slam_shift",
            ProtocolConfig::SocialJetlag { .. } => "social_jetlag",
        }
    }

    /// Build the protocol's light schedule
    pub fn build(&self) -> Result<Light, DomainError> {
        match *self {
            ProtocolConfig::Regular {
                lux,
                lights_on,
                lights_off,
            } => regular_light(lux, lights_on, lights_off),
            ProtocolConfig::ShiftWork {
                lux,
                days_on,
                days_off,
            } => shift_work_light(lux, days_on, days_off),
            ProtocolConfig::SlamShift {
                lux,
                shift,
                before_days,
                after_days,
                starting_lights_on,
            } => slam_shift(lux, shift, before_days, after_days, starting_lights_on),
            ProtocolConfig::SocialJetlag {
                lux,
                num_regular_days,
                num_jetlag_days,
                hours_delayed,
                regular_days_lights_on,
            } => social_jetlag(
                lux,
                num_regular_days,
                num_jetlag_days,
                hours_delayed,
                regular_days_lights_on,
            ),
        }
    }
}

/// A protocol with pulses overlaid on it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(flatten)]
    pub protocol: ProtocolConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pulses: Vec<Pulse>,
}

impl LightConfig {
    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build the protocol and overlay each pulse onto it in order
    pub fn build(&self) -> Result<Light, DomainError> {
        let base = self.protocol.build()?;
        let light = self.pulses.iter().try_fold(base, |light, pulse| {
            light.overlay(&pulse.to_light()?)
        })?;

        debug!(
            protocol = self.protocol.name(),
            pulses = self.pulses.len(),
            start = light.start(),
            duration = light.duration(),
            "built light schedule from configuration"
        );
        Ok(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_fill_missing_parameters() {
        let config = LightConfig::from_json(r#"{"protocol": "slam_shift", "shift": 6.0}"#).unwrap();
        assert_eq!(
            config.protocol,
            ProtocolConfig::SlamShift {
                lux: 150.0,
                shift: 6.0,
                before_days: 10,
                after_days: 10,
                starting_lights_on: 8.0,
            }
        );
        assert!(config.pulses.is_empty());
    }

    #[test]
    fn test_build_shift_work() {
        let config = LightConfig::from_json(
            r#"{"protocol": "shift_work", "lux": 150.0, "days_on": 3, "days_off": 2}"#,
        )
        .unwrap();
        let light = config.build().unwrap();
        assert_eq!(light.duration(), 120.0);
    }

    #[test]
    fn test_build_social_jetlag_defaults() {
        let config = LightConfig::from_json(r#"{"protocol": "social_jetlag"}"#).unwrap();
        let light = config.build().unwrap();
        assert_eq!(light.duration(), 7.0 * 24.0);
    }

    #[test]
    fn test_pulses_are_overlaid() {
        let config = LightConfig::from_json(
            r#"{
                "protocol": "regular",
                "pulses": [{"start": 20.0, "end": 22.0, "intensity": 1000.0}]
            }"#,
        )
        .unwrap();
        let light = config.build().unwrap();

        assert_eq!(light.value_at(12.0, None).unwrap(), 150.0);
        assert!((light.value_at(21.0, None).unwrap() - 1000.0).abs() < 1e-6);
        assert!(light.value_at(3.0, None).unwrap() < 1e-6);
    }

    #[test]
    fn test_round_trip_keeps_protocol_tag() {
        let config = LightConfig::default();
        let json = config.to_json().unwrap();
        assert!(json.contains(r#""protocol":"regular""#));
        assert_eq!(LightConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_unknown_protocol_is_a_json_error() {
        assert!(matches!(
            LightConfig::from_json(r#"{"protocol": "moonlight"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_parameters_are_domain_errors() {
        let config = LightConfig::from_json(r#"{"protocol": "regular", "lux": -5.0}"#).unwrap();
        assert!(config.build().is_err());

        let config =
            LightConfig::from_json(r#"{"protocol": "shift_work", "days_on": 0, "days_off": 0}"#)
                .unwrap();
        assert!(matches!(
            config.build(),
            Err(DomainError::ConflictingParameters(_))
        ));
    }
}

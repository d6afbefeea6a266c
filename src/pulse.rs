//! Smooth light pulses
//!
//! A rectangular pulse approximated by the difference of two hyperbolic
//! tangent steps. Useful for single experimental light exposures laid over
//! a baseline protocol with [`Light::overlay`].

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::light::Light;
use crate::protocols::{DEFAULT_LUX, HOURS_PER_DAY};

/// Default steepness of the tanh edges (per hour)
pub const DEFAULT_STEEPNESS: f64 = 30.0;

/// Smooth unit pulse between `start` and `end`.
///
/// Close to `1` well inside `[start, end]`, close to `0` well outside, and
/// `0.5` at each edge.
pub fn smooth_pulse(t: f64, start: f64, end: f64, steepness: f64) -> f64 {
    0.5 * (steepness * (t - start)).tanh() - 0.5 * (steepness * (t - end)).tanh()
}

/// Intensity of a pulse of `intensity` lux between `start` and `end`.
///
/// With `repeat`, `t` is wrapped onto a 24-hour day first. The result is
/// always nonnegative.
pub fn pulse_intensity(t: f64, start: f64, end: f64, repeat: bool, intensity: f64) -> f64 {
    (intensity * smooth_pulse(wrap_day(t, repeat), start, end, DEFAULT_STEEPNESS)).abs()
}

fn wrap_day(t: f64, repeat: bool) -> f64 {
    let t = if repeat { t % HOURS_PER_DAY } else { t };
    if t < 0.0 {
        t + HOURS_PER_DAY
    } else {
        t
    }
}

/// A single light pulse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    /// Pulse onset (hours)
    pub start: f64,
    /// Pulse offset (hours)
    pub end: f64,
    /// Peak intensity (lux)
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// Edge steepness (per hour)
    #[serde(default = "default_steepness")]
    pub steepness: f64,
    /// Repeat the pulse every 24 hours
    #[serde(default)]
    pub repeat: bool,
}

fn default_intensity() -> f64 {
    DEFAULT_LUX
}

fn default_steepness() -> f64 {
    DEFAULT_STEEPNESS
}

impl Pulse {
    pub fn new(start: f64, end: f64, intensity: f64) -> Self {
        Self {
            start,
            end,
            intensity,
            steepness: DEFAULT_STEEPNESS,
            repeat: false,
        }
    }

    /// Pulse intensity at `t`
    pub fn value(&self, t: f64) -> f64 {
        let t = wrap_day(t, self.repeat);
        (self.intensity * smooth_pulse(t, self.start, self.end, self.steepness)).abs()
    }

    /// Light schedule for this pulse.
    ///
    /// The active window is `[start, end]`, or the whole day `[0, 24]` for
    /// a repeating pulse; the default value is `0`.
    pub fn to_light(&self) -> Result<Light, DomainError> {
        for (name, value) in [
            ("pulse start", self.start),
            ("pulse end", self.end),
            ("pulse steepness", self.steepness),
        ] {
            if !value.is_finite() {
                return Err(DomainError::non_finite(name, value));
            }
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(DomainError::nonnegative("pulse intensity", self.intensity));
        }
        if self.end < self.start {
            return Err(DomainError::ConflictingParameters(format!(
                "pulse end {} precedes pulse start {}",
                self.end, self.start
            )));
        }

        let (start, duration) = if self.repeat {
            (0.0, HOURS_PER_DAY)
        } else {
            (self.start, self.end - self.start)
        };

        let pulse = self.clone();
        Light::from_fn(move |t| pulse.value(t), start, duration, 0.0)
    }
}

//! Light schedules
//!
//! A [`Light`] is an immutable, validated function of time (hours) with an
//! active window `[start, start + duration]` and a default value returned
//! outside that window. A zero duration means the schedule is the constant
//! `default_value` everywhere.
//!
//! Schedules are combined with [`Light::overlay`] (pointwise sum) and
//! [`Light::concatenate`] (one schedule after the other); both return a new
//! schedule and leave their operands untouched.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::DomainError;
use crate::profile::{LightFn, Profile, SegmentSummary};
use crate::types::LightSamples;

/// Number of points sampled across the active window during validation
pub const VALIDATION_SAMPLES: usize = 100;

/// Default number of points produced by [`Light::sample`]
pub const DEFAULT_SAMPLE_COUNT: usize = 10_000;

/// Active window length used by [`Light::from_source`] (hours)
pub const DEFAULT_DURATION: f64 = 1.0;

/// The function part of a light schedule: a constant intensity or a
/// function of time
#[derive(Clone)]
pub enum LightSource {
    Constant(f64),
    Function(LightFn),
}

impl LightSource {
    /// Wrap a closure as a light source
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        LightSource::Function(Arc::new(f))
    }
}

impl From<f64> for LightSource {
    fn from(value: f64) -> Self {
        LightSource::Constant(value)
    }
}

impl fmt::Debug for LightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightSource::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            LightSource::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// An immutable light schedule
#[derive(Clone)]
pub struct Light {
    profile: Profile,
    start: f64,
    duration: f64,
    default_value: f64,
}

impl Light {
    /// Create a light schedule.
    ///
    /// # Arguments
    /// * `source` - constant intensity or function of time returning a
    ///   nonnegative intensity
    /// * `start` - start of the active window in hours
    /// * `duration` - length of the active window in hours (`0` makes the
    ///   schedule a constant equal to `default_value`)
    /// * `default_value` - intensity outside the active window
    ///
    /// # Errors
    /// [`DomainError`] when the function does not produce a real number at
    /// `t = 0`, any scalar is not finite, `duration` or `default_value` is
    /// negative, or the function is negative at one of
    /// [`VALIDATION_SAMPLES`] evenly spaced points across the window.
    pub fn new(
        source: impl Into<LightSource>,
        start: f64,
        duration: f64,
        default_value: f64,
    ) -> Result<Self, DomainError> {
        let profile = match source.into() {
            LightSource::Constant(value) => {
                if value.is_nan() {
                    return Err(DomainError::InvalidFunction(format!(
                        "constant intensity is {value}"
                    )));
                }
                Profile::constant(value)
            }
            LightSource::Function(func) => {
                let probe = func(0.0);
                if probe.is_nan() {
                    return Err(DomainError::InvalidFunction(
                        "function returned NaN at t = 0".to_string(),
                    ));
                }
                Profile::primitive(func)
            }
        };

        Self::from_profile(profile, start, duration, default_value)
    }

    /// Light schedule active on `[0, 1]` with a default value of `0`
    pub fn from_source(source: impl Into<LightSource>) -> Result<Self, DomainError> {
        Self::new(source, 0.0, DEFAULT_DURATION, 0.0)
    }

    /// Constant intensity `value` over `[start, start + duration]`
    pub fn constant(
        value: f64,
        start: f64,
        duration: f64,
        default_value: f64,
    ) -> Result<Self, DomainError> {
        Self::new(value, start, duration, default_value)
    }

    /// Light schedule driven by a function of time
    pub fn from_fn<F>(
        f: F,
        start: f64,
        duration: f64,
        default_value: f64,
    ) -> Result<Self, DomainError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(LightSource::function(f), start, duration, default_value)
    }

    /// Validate window scalars and sample the profile across the window.
    ///
    /// Every composed schedule goes through here as well, so composition
    /// results satisfy the same invariants as directly built ones.
    pub(crate) fn from_profile(
        profile: Profile,
        start: f64,
        duration: f64,
        default_value: f64,
    ) -> Result<Self, DomainError> {
        if !start.is_finite() {
            return Err(DomainError::InvalidStart(start));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::InvalidDuration(duration));
        }
        if !default_value.is_finite() || default_value < 0.0 {
            return Err(DomainError::InvalidDefault(default_value));
        }

        for t in linspace(start, start + duration, VALIDATION_SAMPLES) {
            let value = profile.value(t);
            if value < 0.0 {
                return Err(DomainError::NegativeOutput { at: t, value });
            }
        }

        trace!(
            start,
            duration,
            default_value,
            segments = profile.len(),
            "light schedule validated"
        );

        Ok(Self {
            profile,
            start,
            duration,
            default_value,
        })
    }

    /// Start of the active window (hours)
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Length of the active window (hours)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// End of the active window (hours)
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Value returned outside the active window
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Whether the schedule has no active window
    pub fn is_degenerate(&self) -> bool {
        self.duration == 0.0
    }

    pub(crate) fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Evaluate the schedule at a single time.
    ///
    /// With `repeat_period`, `t` is first wrapped into `[0, repeat_period)`.
    pub fn value_at(&self, t: f64, repeat_period: Option<f64>) -> Result<f64, DomainError> {
        let period = check_repeat_period(repeat_period)?;
        if t.is_nan() {
            return Err(DomainError::InvalidTime("t is NaN".to_string()));
        }
        Ok(self.value_unchecked(t, period))
    }

    /// Evaluate the schedule over a batch of times.
    ///
    /// Times may be unordered and unevenly spaced. Inside the closed window
    /// `[start, end]` the schedule's function applies; everywhere else the
    /// default value does.
    pub fn evaluate(
        &self,
        times: &[f64],
        repeat_period: Option<f64>,
    ) -> Result<Vec<f64>, DomainError> {
        let period = check_repeat_period(repeat_period)?;
        if let Some(idx) = times.iter().position(|t| t.is_nan()) {
            return Err(DomainError::InvalidTime(format!("t[{idx}] is NaN")));
        }

        Ok(times
            .iter()
            .map(|&t| self.value_unchecked(t, period))
            .collect())
    }

    fn value_unchecked(&self, t: f64, repeat_period: Option<f64>) -> f64 {
        let t = match repeat_period {
            Some(period) => t.rem_euclid(period),
            None => t,
        };

        // a zero period wraps to NaN, which falls outside every window
        if self.is_degenerate() || !(t >= self.start && t <= self.end()) {
            return self.default_value;
        }
        self.profile.value(t)
    }

    /// Sample the schedule at evenly spaced times.
    ///
    /// `from` and `to` default to the active window; both ends are
    /// included.
    pub fn sample(
        &self,
        from: Option<f64>,
        to: Option<f64>,
        repeat_period: Option<f64>,
        num_samples: usize,
    ) -> Result<LightSamples, DomainError> {
        let from = from.unwrap_or(self.start);
        let to = to.unwrap_or_else(|| self.end());

        if num_samples == 0 {
            return Err(DomainError::InvalidParameter {
                name: "num_samples",
                reason: "must be positive",
                value: 0.0,
            });
        }
        if !from.is_finite() {
            return Err(DomainError::non_finite("sample start", from));
        }
        if !to.is_finite() {
            return Err(DomainError::non_finite("sample end", to));
        }

        let times = linspace(from, to, num_samples);
        let values = self.evaluate(&times, repeat_period)?;
        Ok(LightSamples { times, values })
    }

    /// Flattened segments of the schedule's function
    pub fn segments(&self) -> Vec<SegmentSummary> {
        self.profile
            .segments()
            .iter()
            .map(SegmentSummary::from)
            .collect()
    }
}

impl fmt::Debug for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("start", &self.start)
            .field("duration", &self.duration)
            .field("default_value", &self.default_value)
            .field("segments", &self.profile.len())
            .finish()
    }
}

fn check_repeat_period(repeat_period: Option<f64>) -> Result<Option<f64>, DomainError> {
    match repeat_period {
        Some(period) if period.is_nan() || period < 0.0 => {
            Err(DomainError::InvalidRepeatPeriod(period))
        }
        other => Ok(other),
    }
}

/// `n` evenly spaced values from `start` to `end`, both included
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = end;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_light_window() {
        let light = Light::constant(100.0, 2.0, 3.0, 5.0).unwrap();
        assert_eq!(light.start(), 2.0);
        assert_eq!(light.duration(), 3.0);
        assert_eq!(light.end(), 5.0);

        let values = light.evaluate(&[1.0, 2.0, 3.5, 5.0, 6.0], None).unwrap();
        assert_eq!(values, vec![5.0, 100.0, 100.0, 100.0, 5.0]);
    }

    #[test]
    fn test_from_source_uses_unit_window() {
        let light = Light::from_source(LightSource::function(|t| t * 10.0)).unwrap();
        assert_eq!(light.start(), 0.0);
        assert_eq!(light.end(), 1.0);
        assert_eq!(light.value_at(0.5, None).unwrap(), 5.0);
        assert_eq!(light.value_at(1.5, None).unwrap(), 0.0);
    }

    #[test]
    fn test_window_does_not_add_default() {
        let light = Light::from_fn(|t| t, 0.0, 10.0, 7.0).unwrap();
        assert_eq!(light.value_at(4.0, None).unwrap(), 4.0);
        assert_eq!(light.value_at(-1.0, None).unwrap(), 7.0);
    }

    #[test]
    fn test_degenerate_light_returns_default_everywhere() {
        let light = Light::from_fn(|t| t.abs() + 1000.0, 3.0, 0.0, 12.0).unwrap();
        assert!(light.is_degenerate());
        let values = light.evaluate(&[-50.0, 0.0, 3.0, 48.0], None).unwrap();
        assert!(values.iter().all(|&v| v == 12.0));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = Light::constant(1.0, 0.0, -1.0, 0.0).unwrap_err();
        assert_eq!(err, DomainError::InvalidDuration(-1.0));
    }

    #[test]
    fn test_negative_default_rejected() {
        let err = Light::constant(1.0, 0.0, 1.0, -0.5).unwrap_err();
        assert_eq!(err, DomainError::InvalidDefault(-0.5));
    }

    #[test]
    fn test_non_finite_start_rejected() {
        assert!(matches!(
            Light::constant(1.0, f64::NAN, 1.0, 0.0),
            Err(DomainError::InvalidStart(_))
        ));
        assert!(matches!(
            Light::constant(1.0, f64::INFINITY, 1.0, 0.0),
            Err(DomainError::InvalidStart(_))
        ));
    }

    #[test]
    fn test_negative_constant_rejected() {
        let err = Light::constant(-3.0, 0.0, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, DomainError::NegativeOutput { .. }));
    }

    #[test]
    fn test_negative_constant_rejected_for_degenerate_window() {
        assert!(Light::constant(-3.0, 4.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_function_negative_inside_window_rejected() {
        let err = Light::from_fn(|t| t - 5.0, 0.0, 10.0, 0.0).unwrap_err();
        match err {
            DomainError::NegativeOutput { at, value } => {
                assert!(at < 5.0);
                assert!(value < 0.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_function_negative_outside_window_accepted() {
        let light = Light::from_fn(|t| t - 5.0, 5.0, 10.0, 0.0).unwrap();
        assert_eq!(light.value_at(7.0, None).unwrap(), 2.0);
    }

    #[test]
    fn test_nan_function_rejected() {
        let err = Light::from_fn(|_| f64::NAN, 0.0, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidFunction(_)));
    }

    #[test]
    fn test_nan_time_rejected() {
        let light = Light::constant(1.0, 0.0, 1.0, 0.0).unwrap();
        assert!(matches!(
            light.evaluate(&[0.0, f64::NAN], None),
            Err(DomainError::InvalidTime(_))
        ));
        assert!(light.value_at(f64::NAN, None).is_err());
    }

    #[test]
    fn test_negative_repeat_period_rejected() {
        let light = Light::constant(1.0, 0.0, 1.0, 0.0).unwrap();
        assert_eq!(
            light.evaluate(&[0.5], Some(-24.0)).unwrap_err(),
            DomainError::InvalidRepeatPeriod(-24.0)
        );
    }

    #[test]
    fn test_repeat_period_wraps_time() {
        let light = Light::constant(100.0, 8.0, 8.0, 0.0).unwrap();
        let values = light
            .evaluate(&[34.0, -14.0, 44.0, 2.0], Some(24.0))
            .unwrap();
        assert_eq!(values, vec![100.0, 100.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_repeat_period_yields_default() {
        let light = Light::constant(100.0, 0.0, 24.0, 3.0).unwrap();
        assert_eq!(light.value_at(5.0, Some(0.0)).unwrap(), 3.0);
    }

    #[test]
    fn test_sample_defaults_to_window() {
        let light = Light::constant(50.0, 1.0, 2.0, 0.0).unwrap();
        let samples = light.sample(None, None, None, 5).unwrap();
        assert_eq!(samples.times, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        assert!(samples.values.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn test_sample_rejects_zero_samples() {
        let light = Light::constant(50.0, 1.0, 2.0, 0.0).unwrap();
        assert!(light.sample(None, None, None, 0).is_err());
    }

    #[test]
    fn test_linspace_endpoints() {
        let values = linspace(0.0, 1.0, 3);
        assert_eq!(values, vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0, 2.0, 4), vec![2.0; 4]);
        assert_eq!(linspace(5.0, 9.0, 1), vec![5.0]);
    }

    #[test]
    fn test_light_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Light>();
    }
}

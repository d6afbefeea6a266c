//! Output types for light schedules
//!
//! Sampled schedules and schedule summaries handed to plotting and phase
//! model consumers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::light::Light;
use crate::profile::SegmentSummary;

/// Evenly spaced samples of a light schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightSamples {
    /// Sample times (hours)
    pub times: Vec<f64>,
    /// Light intensity at each sample time (lux)
    pub values: Vec<f64>,
}

/// One sample, optionally pinned to a wall-clock instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSample {
    /// Time since the schedule origin (hours)
    pub hours: f64,
    /// Light intensity (lux)
    pub lux: f64,
    /// Wall-clock instant of the sample when the schedule is anchored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_utc: Option<DateTime<Utc>>,
}

impl LightSamples {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Per-sample records; with `anchor`, hour `0` maps to that instant.
    ///
    /// # Errors
    /// [`DomainError::InvalidParameter`] when a sample time lands outside
    /// the range of representable timestamps.
    pub fn records(
        &self,
        anchor: Option<DateTime<Utc>>,
    ) -> Result<Vec<LightSample>, DomainError> {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(&hours, &lux)| {
                let timestamp_utc = match anchor {
                    Some(origin) => Some(anchored(origin, hours)?),
                    None => None,
                };
                Ok(LightSample {
                    hours,
                    lux,
                    timestamp_utc,
                })
            })
            .collect()
    }
}

fn anchored(origin: DateTime<Utc>, hours: f64) -> Result<DateTime<Utc>, DomainError> {
    hours_to_duration(hours)
        .and_then(|offset| origin.checked_add_signed(offset))
        .ok_or(DomainError::InvalidParameter {
            name: "sample time",
            reason: "is out of range for the anchor timestamp",
            value: hours,
        })
}

/// Hours to a chrono duration, rounded to the millisecond; `None` when the
/// result does not fit
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// Description of a light schedule's window and flattened segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSummary {
    pub start: f64,
    pub duration: f64,
    pub end: f64,
    pub default_value: f64,
    pub segments: Vec<SegmentSummary>,
}

impl From<&Light> for LightSummary {
    fn from(light: &Light) -> Self {
        LightSummary {
            start: light.start(),
            duration: light.duration(),
            end: light.end(),
            default_value: light.default_value(),
            segments: light.segments(),
        }
    }
}

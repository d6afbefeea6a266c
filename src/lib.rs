//! Circadian Lights - Light exposure schedules for circadian rhythm models
//!
//! A [`Light`] is a nonnegative light intensity (lux) active on a time window
//! `[start, start + duration]` with a fallback value outside it. Schedules
//! compose by overlay (pointwise sum) and by sequencing (one after another),
//! and the protocol builders assemble the standard experimental schedules:
//! regular days → shift work → slam shifts → social jet-lag.
//!
//! ## Modules
//!
//! - **Schedules**: [`Light`] construction, evaluation, and sampling
//! - **Composition**: [`overlay`] and [`sequence`] of two schedules
//! - **Protocols**: builders for standard lighting protocols and pulses
//! - **Configuration**: JSON protocol descriptions consumed by the CLI and FFI

pub mod config;
pub mod error;
pub mod light;
pub mod overlay;
mod profile;
pub mod protocols;
pub mod pulse;
pub mod sequence;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{LightConfig, ProtocolConfig};
pub use error::{ConfigError, DomainError};
pub use light::{Light, LightSource};
pub use overlay::{overlay, OverlayCase};
pub use profile::{LightFn, SegmentSummary};
pub use protocols::{regular_light, shift_work_light, slam_shift, social_jetlag};
pub use pulse::{pulse_intensity, Pulse};
pub use sequence::sequence;
pub use types::{LightSample, LightSamples, LightSummary};

/// Library version
pub const LIGHTS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "circadian-lights";

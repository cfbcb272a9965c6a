//! Engine configuration (motive.toml)
//!
//! Every constant the scheduler, generators, scroll tracker and appear
//! handoff depend on lives here so hosts can tune them in one place.
//! Missing fields fall back to the defaults below.

use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine-wide tunables
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Duration used when a sequence segment declares none (seconds)
    pub default_duration: f64,
    /// Exclusive upper bound on `repeat` inside sequences
    pub max_repeat: u32,
    /// Ceiling for simulated generator durations (ms)
    pub max_generator_duration_ms: f64,
    /// Step used while simulating a generator to rest (ms)
    pub generator_time_step_ms: f64,
    /// Representative scale for generator easings
    pub generator_easing_scale: f64,
    /// Upper clamp for per-frame delta (ms)
    pub max_frame_elapsed_ms: f64,
    /// Delta reported on the first frame after waking (ms)
    pub default_frame_delta_ms: f64,
    /// Window after which motion value velocity is considered stale (ms)
    pub velocity_window_ms: f64,
    /// Window after which scroll axis velocity is zeroed (ms)
    pub scroll_velocity_stale_ms: f64,
    /// Duration of the placeholder appear animation (ms)
    pub priming_duration_ms: f64,
    /// Sample spacing when converting easings to linear() stops (ms)
    pub linear_easing_resolution_ms: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            default_duration: 0.3,
            max_repeat: 20,
            max_generator_duration_ms: 20_000.0,
            generator_time_step_ms: 50.0,
            generator_easing_scale: 100.0,
            max_frame_elapsed_ms: 40.0,
            default_frame_delta_ms: 1000.0 / 60.0,
            velocity_window_ms: 30.0,
            scroll_velocity_stale_ms: 50.0,
            priming_duration_ms: 10_000.0,
            linear_easing_resolution_ms: 10.0,
        }
    }
}

impl MotionConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or from `motive.toml` inside a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("motive.toml")
        } else {
            path.to_path_buf()
        };

        let content = fs::read_to_string(&config_path).map_err(|source| MotionError::ConfigRead {
            path: config_path.display().to_string(),
            source,
        })?;

        tracing::debug!(path = %config_path.display(), "loaded motion config");
        Self::from_toml_str(&content)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("generator_time_step_ms", self.generator_time_step_ms),
            ("max_generator_duration_ms", self.max_generator_duration_ms),
            ("generator_easing_scale", self.generator_easing_scale),
            ("max_frame_elapsed_ms", self.max_frame_elapsed_ms),
            ("linear_easing_resolution_ms", self.linear_easing_resolution_ms),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(MotionError::InvalidConfig {
                    field,
                    reason: format!("must be greater than zero, got {value}"),
                });
            }
        }
        if self.default_duration < 0.0 {
            return Err(MotionError::InvalidConfig {
                field: "default_duration",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

//! Motive configuration file handling

use anyhow::{Context, Result};
use motive_core::MotionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration (motive.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MotiveToml {
    /// Engine tunables
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How results are printed
#[derive(Debug, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Sample count for easing curves and scroll sweeps
    #[serde(default = "default_samples")]
    pub samples: usize,
}

fn default_true() -> bool {
    true
}

fn default_samples() -> usize {
    10
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            samples: default_samples(),
        }
    }
}

impl MotiveToml {
    /// Load `path`, or `motive.toml` from the working directory when present.
    ///
    /// A missing default file yields the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Path::new("motive.toml").to_path_buf(), false),
        };
        if !explicit && !path.exists() {
            tracing::debug!("no motive.toml found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MotiveToml = toml::from_str(content).context("Failed to parse motive.toml")?;
        config.motion.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_default() {
        let config = MotiveToml::from_toml_str("[motion]\ndefault_duration = 0.5\n").unwrap();
        assert_eq!(config.motion.default_duration, 0.5);
        assert_eq!(config.motion.max_repeat, 20);
        assert!(config.output.pretty);
        assert_eq!(config.output.samples, 10);
    }

    #[test]
    fn test_invalid_motion_config() {
        assert!(MotiveToml::from_toml_str("[motion]\ngenerator_time_step_ms = 0.0\n").is_err());
    }
}

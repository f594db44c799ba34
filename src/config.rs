//! Tunables of the trajectory analyzer.
//!
//! ```
//! use trackpath::{AnalyzerConfig, Strategy};
//!
//! let config = AnalyzerConfig::default();
//! assert_eq!(config.frames_per_second, 30.0);
//! assert_eq!(config.strategy, Strategy::Segmented);
//!
//! let config = AnalyzerConfig::simple().with_fps(25.0);
//! assert!(config.validate().is_ok());
//! ```

use serde_derive::{Deserialize, Serialize};

use crate::detection::VideoMetrics;
use crate::error::{Error, Result};
use crate::heading::Labeling;

pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 45.0;

/// How direction changes are located along a path
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Angle test at every interior point of the raw path.
    Simple,
    /// Angle test on a smoothed path, breaks kept a minimum segment apart.
    #[default]
    Segmented,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Playback rate used for every frame to seconds conversion.
    pub frames_per_second: f64,

    pub strategy: Strategy,

    pub labeling: Labeling,

    /// Vectors not longer than this (px) never take part in an angle test.
    pub min_vector_norm: f64,

    /// Moving average window of the segmented strategy.
    pub smoothing_window: usize,

    /// Minimum number of points between two accepted breaks of the segmented strategy.
    pub min_segment_len: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FPS,
            strategy: Strategy::Segmented,
            labeling: Labeling::Compass,
            min_vector_norm: 0.1,
            smoothing_window: 3,
            min_segment_len: 5,
        }
    }
}

impl AnalyzerConfig {
    pub fn simple() -> Self {
        Self {
            strategy: Strategy::Simple,
            ..Self::default()
        }
    }

    pub fn segmented() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.frames_per_second = fps;
        self
    }

    #[must_use]
    pub fn with_labeling(mut self, labeling: Labeling) -> Self {
        self.labeling = labeling;
        self
    }

    /// Adopts the rate reported by the backend, if any.
    #[must_use]
    pub fn with_metrics(mut self, metrics: &VideoMetrics) -> Self {
        if let Some(fps) = metrics.frames_per_second() {
            self.frames_per_second = fps;
        }
        self
    }

    /// Reads overrides from `TRACKPATH_*` environment variables.
    ///
    /// Unset or unparsable variables keep the default value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let mut config = Self::default();

        if let Some(fps) = lookup("TRACKPATH_FPS").and_then(|s| s.parse().ok()) {
            config.frames_per_second = fps;
        }

        if let Some(s) = lookup("TRACKPATH_STRATEGY") {
            config.strategy = match s.to_ascii_lowercase().as_str() {
                "simple" => Strategy::Simple,
                "segmented" => Strategy::Segmented,
                other => return Err(Error::invalid_config(format!("unknown strategy `{}`", other))),
            };
        }

        if let Some(s) = lookup("TRACKPATH_LABELING") {
            config.labeling = match s.to_ascii_lowercase().as_str() {
                "compass" => Labeling::Compass,
                "two_axis" => Labeling::TwoAxis,
                other => return Err(Error::invalid_config(format!("unknown labeling `{}`", other))),
            };
        }

        if let Some(v) = lookup("TRACKPATH_MIN_VECTOR_NORM").and_then(|s| s.parse().ok()) {
            config.min_vector_norm = v;
        }

        if let Some(v) = lookup("TRACKPATH_SMOOTHING_WINDOW").and_then(|s| s.parse().ok()) {
            config.smoothing_window = v;
        }

        if let Some(v) = lookup("TRACKPATH_MIN_SEGMENT_LEN").and_then(|s| s.parse().ok()) {
            config.min_segment_len = v;
        }

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.frames_per_second.is_finite() && self.frames_per_second > 0.0) {
            return Err(Error::invalid_config(format!(
                "frames_per_second must be positive, got {}",
                self.frames_per_second
            )));
        }

        if !(self.min_vector_norm.is_finite() && self.min_vector_norm >= 0.0) {
            return Err(Error::invalid_config(format!(
                "min_vector_norm must be non-negative, got {}",
                self.min_vector_norm
            )));
        }

        if self.smoothing_window == 0 {
            return Err(Error::invalid_config("smoothing_window must be at least 1"));
        }

        if self.min_segment_len == 0 {
            return Err(Error::invalid_config("min_segment_len must be at least 1"));
        }

        Ok(())
    }

    #[inline]
    pub fn seconds(&self, frames: f64) -> f64 {
        frames / self.frames_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seconds(60.0), 2.0);
        assert_eq!(AnalyzerConfig::simple().strategy, Strategy::Simple);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AnalyzerConfig::default().with_fps(0.0).validate().is_err());
        assert!(AnalyzerConfig::default().with_fps(f64::NAN).validate().is_err());

        let config = AnalyzerConfig {
            min_segment_len: 0,
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides() {
        let config = AnalyzerConfig::from_lookup(lookup(&[
            ("TRACKPATH_FPS", "25"),
            ("TRACKPATH_STRATEGY", "Simple"),
            ("TRACKPATH_LABELING", "two_axis"),
            ("TRACKPATH_MIN_SEGMENT_LEN", "not a number"),
        ]))
        .unwrap();

        assert_eq!(config.frames_per_second, 25.0);
        assert_eq!(config.strategy, Strategy::Simple);
        assert_eq!(config.labeling, Labeling::TwoAxis);
        assert_eq!(config.min_segment_len, 5);

        assert!(AnalyzerConfig::from_lookup(lookup(&[("TRACKPATH_STRATEGY", "fancy")])).is_err());
        assert!(AnalyzerConfig::from_lookup(lookup(&[("TRACKPATH_FPS", "-1")])).is_err());
    }

    #[test]
    fn metrics_fps_is_adopted() {
        let metrics = VideoMetrics {
            processed_fps: Some(24.0),
            ..VideoMetrics::default()
        };
        assert_eq!(AnalyzerConfig::default().with_metrics(&metrics).frames_per_second, 24.0);
        assert_eq!(
            AnalyzerConfig::default()
                .with_metrics(&VideoMetrics::default())
                .frames_per_second,
            30.0
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: AnalyzerConfig = serde_json::from_str(r#"{"strategy":"simple"}"#).unwrap();
        assert_eq!(config.strategy, Strategy::Simple);
        assert_eq!(config.smoothing_window, 3);
    }
}

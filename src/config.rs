//! Runtime tunables for event reduction and ink analysis.
//!
//! Both structs deserialize with `#[serde(default)]`, so a host application can
//! embed them in its own configuration file and override only what it needs.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::types::{NumericError, check_finite, check_positive};

/// Tunables for [`EventEngine`](crate::events::EventEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest distance (pattern units) the pen may drift from its pen-down
    /// point while still producing a click. Anything farther is a drag.
    pub click_slop: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            click_slop: defaults::CLICK_SLOP,
        }
    }
}

impl EngineConfig {
    pub fn try_new(click_slop: f64) -> Result<Self, NumericError> {
        Self::default().with_click_slop(click_slop)
    }

    /// Replace the click slop. Zero is allowed: every movement becomes a drag.
    pub fn with_click_slop(mut self, click_slop: f64) -> Result<Self, NumericError> {
        let click_slop = check_finite(click_slop)?;
        if click_slop < 0.0 {
            return Err(NumericError::Negative);
        }
        self.click_slop = click_slop;
        Ok(self)
    }
}

/// Tunables for stroke analysis in [`crate::ink`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkConfig {
    /// Strokes whose largest gap between consecutive samples exceeds this
    /// are sparse and should be drawn as splines instead of polylines.
    pub sparse_sample_distance: f64,
}

impl Default for InkConfig {
    fn default() -> Self {
        Self {
            sparse_sample_distance: defaults::SPARSE_SAMPLE_DISTANCE,
        }
    }
}

impl InkConfig {
    pub fn try_new(sparse_sample_distance: f64) -> Result<Self, NumericError> {
        Self::default().with_sparse_sample_distance(sparse_sample_distance)
    }

    pub fn with_sparse_sample_distance(mut self, distance: f64) -> Result<Self, NumericError> {
        self.sparse_sample_distance = check_positive(distance)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_constants() {
        assert_eq!(EngineConfig::default().click_slop, defaults::CLICK_SLOP);
        assert_eq!(
            InkConfig::default().sparse_sample_distance,
            defaults::SPARSE_SAMPLE_DISTANCE
        );
    }

    #[test]
    fn click_slop_rejects_negative_and_nan() {
        assert_eq!(EngineConfig::try_new(-1.0), Err(NumericError::Negative));
        assert_eq!(EngineConfig::try_new(f64::NAN), Err(NumericError::NaN));
        assert_eq!(EngineConfig::try_new(0.0).map(|c| c.click_slop), Ok(0.0));
    }

    #[test]
    fn sparse_distance_must_be_positive() {
        assert_eq!(InkConfig::try_new(0.0), Err(NumericError::Zero));
        assert_eq!(InkConfig::try_new(-3.0), Err(NumericError::Negative));
        assert_eq!(InkConfig::try_new(40.0).map(|c| c.sparse_sample_distance), Ok(40.0));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        let config: InkConfig = serde_json::from_str(r#"{"sparse_sample_distance": 12.5}"#).unwrap();
        assert_eq!(config.sparse_sample_distance, 12.5);
    }
}

use serde::{Deserialize, Serialize};

use crate::colors::TeamColor;
use crate::geometry::DensityLadder;

pub const IMAGE_PATH: &str = "map.png";
pub const MAX_COORDS: usize = 10;
pub const SAFE_MAX_ROWS: u32 = 208;

pub const DEFAULT_ALPHA: f64 = 0.5;
pub const MIN_ALPHA: f64 = 0.1;
pub const MAX_ALPHA: f64 = 0.9;
pub const ALPHA_STEP: f64 = 0.05;

// Leaflet-style zoom levels: scale = 2^zoom.
pub const MIN_ZOOM: f64 = -2.0;
pub const MAX_ZOOM: f64 = 6.0;

/// Outline width of an unclaimed cell, in screen pixels.
pub const CELL_OUTLINE_WEIGHT: f64 = 0.2;

/// (id, name, color) for the teams every session starts with.
pub const DEFAULT_TEAMS: &[(&str, &str, TeamColor)] = &[
    ("team-red", "Red", TeamColor::new(0xe5, 0x39, 0x35)),
    ("team-blue", "Blue", TeamColor::new(0x1e, 0x88, 0xe5)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LadderChoice {
    /// Thresholds at zoom 0 / 1 / 2.
    #[default]
    Standard,
    /// Thresholds at zoom 0 / 0.5 / 1.5.
    Fine,
}

impl LadderChoice {
    pub fn ladder(self) -> DensityLadder {
        match self {
            Self::Standard => DensityLadder::standard(),
            Self::Fine => DensityLadder::fine(),
        }
    }
}

/// Page-level configuration, read from the mount element's `data-config`
/// attribute. Every field is optional in the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_path: String,
    pub ladder: LadderChoice,
    pub default_alpha: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_path: IMAGE_PATH.to_string(),
            ladder: LadderChoice::Standard,
            default_alpha: DEFAULT_ALPHA,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.default_alpha = clamp_alpha(config.default_alpha).unwrap_or(DEFAULT_ALPHA);
        if config.image_path.trim().is_empty() {
            config.image_path = IMAGE_PATH.to_string();
        }
        Ok(config)
    }
}

/// Clamp a selection alpha into the slider range. `None` for NaN/infinite.
pub fn clamp_alpha(alpha: f64) -> Option<f64> {
    alpha.is_finite().then(|| alpha.clamp(MIN_ALPHA, MAX_ALPHA))
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DEFAULT_ALPHA, IMAGE_PATH, LadderChoice, clamp_alpha};

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(AppConfig::from_json("{}").ok(), Some(AppConfig::default()));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = AppConfig::from_json(r#"{"ladder":"fine"}"#).ok();
        assert_eq!(
            config,
            Some(AppConfig {
                ladder: LadderChoice::Fine,
                ..AppConfig::default()
            })
        );
    }

    #[test]
    fn out_of_range_alpha_is_clamped() {
        let config = AppConfig::from_json(r#"{"default_alpha":3.0}"#).ok();
        assert_eq!(config.map(|c| c.default_alpha), Some(0.9));
    }

    #[test]
    fn blank_image_path_falls_back() {
        let config = AppConfig::from_json(r#"{"image_path":"  "}"#).ok();
        assert_eq!(config.map(|c| c.image_path), Some(IMAGE_PATH.to_string()));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ladder:").is_err());
        assert!(AppConfig::from_json(r#"{"ladder":"huge"}"#).is_err());
    }

    #[test]
    fn clamp_alpha_rejects_non_finite() {
        assert_eq!(clamp_alpha(f64::NAN), None);
        assert_eq!(clamp_alpha(0.0), Some(0.1));
        assert_eq!(clamp_alpha(DEFAULT_ALPHA), Some(DEFAULT_ALPHA));
    }
}

//! Game settings and preferences
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::consts::TICKS_PER_SECOND;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    /// Viewport width in pixels (camera follow centering)
    pub viewport_width: f32,
    /// Viewport height in pixels
    pub viewport_height: f32,

    // === Simulation ===
    /// Fixed ticks per simulated second
    pub ticks_per_second: u32,

    // === Gameplay ===
    /// Extra distance past the chase radius before a chasing enemy gives up.
    /// 0.0 lets enemies flicker between chase and patrol at the boundary.
    pub chase_hysteresis: f32,
    /// Spawn coins from `coins` map objects and track score
    pub coins_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,

            ticks_per_second: TICKS_PER_SECOND,

            chase_hysteresis: 16.0,
            coins_enabled: true,
        }
    }
}

impl Settings {
    /// Fixed timestep derived from the tick rate
    pub fn dt(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, logging and falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    fn sanitize(&mut self) {
        if self.ticks_per_second == 0 {
            log::warn!("ticks_per_second must be positive, using {}", TICKS_PER_SECOND);
            self.ticks_per_second = TICKS_PER_SECOND;
        }
        if !self.chase_hysteresis.is_finite() || self.chase_hysteresis < 0.0 {
            self.chase_hysteresis = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ticks_per_second, 60);
        assert!((settings.dt() - 1.0 / 60.0).abs() < 1e-6);
        assert!(settings.coins_enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "chase_hysteresis": 0.0 }"#).unwrap();
        assert_eq!(settings.chase_hysteresis, 0.0);
        assert_eq!(settings.viewport_width, 800.0);
        assert_eq!(settings.ticks_per_second, 60);
    }

    #[test]
    fn test_zero_tick_rate_is_replaced() {
        let settings = Settings::from_json(r#"{ "ticks_per_second": 0 }"#).unwrap();
        assert_eq!(settings.ticks_per_second, TICKS_PER_SECOND);
    }

    #[test]
    fn test_negative_hysteresis_clamped() {
        let settings = Settings::from_json(r#"{ "chase_hysteresis": -4.0 }"#).unwrap();
        assert_eq!(settings.chase_hysteresis, 0.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/fireball-quest/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(GameError::Serialization(_))
        ));
    }
}

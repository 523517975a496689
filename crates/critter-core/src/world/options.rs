//! Engine options
//!
//! Options are read from a JSON document. Every field has a default, so a
//! config file only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::errors::{EngineError, EngineResult};
use crate::consts::{DAYLIGHT_LEVEL, MAX_VIEW_DISTANCE, MONSTER_FOLLOW_DIST};
use crate::map::DistanceMode;
use crate::pathfind::PathSettings;

/// Season of the year
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Season {
    #[default]
    Spring = 0,
    Summer = 1,
    Autumn = 2,
    Winter = 3,
}

impl Season {
    /// Breeding season for creatures that care
    pub const fn is_mating_season(&self) -> bool {
        matches!(self, Season::Spring)
    }
}

/// Tunables for one engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Euclidean or Chebyshev distances
    pub distance_mode: DistanceMode,
    pub max_view_distance: i32,
    /// Look across z-levels through floor gaps
    pub fov_3d: bool,
    pub fov_3d_z_range: i32,
    /// Outdoor light level
    pub natural_light: f32,
    /// Outdoor attenuation multiplier; 1 is clear weather, fog and rain raise it
    pub weather_sight_penalty: f32,
    pub season: Season,
    /// Pets stop closing in at this range
    pub follow_distance: i32,
    /// How many creatures a single shove may cascade through
    pub push_depth: usize,
    /// Upper bound on plan/move rounds for one creature in one turn
    pub max_actions_per_turn: u32,
    /// Search limits used by every route request
    pub path: PathSettings,
    /// Scent lost per turn
    pub scent_decay: i32,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            distance_mode: DistanceMode::Roguelike,
            max_view_distance: MAX_VIEW_DISTANCE,
            fov_3d: false,
            fov_3d_z_range: 4,
            natural_light: DAYLIGHT_LEVEL,
            weather_sight_penalty: 1.0,
            season: Season::Spring,
            follow_distance: MONSTER_FOLLOW_DIST,
            push_depth: 3,
            max_actions_per_turn: 20,
            path: PathSettings::default(),
            scent_decay: 1,
            seed: None,
        }
    }
}

impl EngineOptions {
    /// Load options from a JSON file
    pub fn load_from_file(path: &Path) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_config(&contents)
    }

    /// Parse options from a JSON string and check their ranges
    pub fn parse_config(contents: &str) -> EngineResult<Self> {
        let mut options: Self = serde_json::from_str(contents)?;
        options.path.mode = options.distance_mode;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a file
    pub fn save_to_file(&self, path: &Path) -> EngineResult<()> {
        std::fs::write(path, self.to_config_string())?;
        Ok(())
    }

    /// Pretty JSON form of these options
    pub fn to_config_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    fn validate(&self) -> EngineResult<()> {
        if !(1..=MAX_VIEW_DISTANCE).contains(&self.max_view_distance) {
            return Err(EngineError::InvalidConfig(format!(
                "max_view_distance must be within 1..={MAX_VIEW_DISTANCE}, got {}",
                self.max_view_distance
            )));
        }
        if self.fov_3d_z_range < 0 {
            return Err(EngineError::InvalidConfig(
                "fov_3d_z_range must not be negative".into(),
            ));
        }
        if self.natural_light < 0.0 {
            return Err(EngineError::InvalidConfig(
                "natural_light must not be negative".into(),
            ));
        }
        if self.weather_sight_penalty < 1.0 {
            return Err(EngineError::InvalidConfig(
                "weather_sight_penalty must be at least 1".into(),
            ));
        }
        if self.max_actions_per_turn == 0 {
            return Err(EngineError::InvalidConfig(
                "max_actions_per_turn must be at least 1".into(),
            ));
        }
        if self.follow_distance < 1 {
            return Err(EngineError::InvalidConfig(
                "follow_distance must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.follow_distance, 8);
        assert_eq!(options.push_depth, 3);
        assert_eq!(options.max_view_distance, 60);
        assert!(options.season.is_mating_season());
    }

    #[test]
    fn test_parse_partial_config() {
        let options = EngineOptions::parse_config(
            r#"{ "distance_mode": "Trigonometric", "fov_3d": true, "seed": 42 }"#,
        )
        .unwrap();
        assert_eq!(options.distance_mode, DistanceMode::Trigonometric);
        assert_eq!(options.path.mode, DistanceMode::Trigonometric);
        assert!(options.fov_3d);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.follow_distance, 8);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let err = EngineOptions::parse_config(r#"{ "max_view_distance": 500 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineOptions::parse_config("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_config_string_round_trip() {
        let mut options = EngineOptions::default();
        options.season = Season::Winter;
        options.path.partial = true;
        let back = EngineOptions::parse_config(&options.to_config_string()).unwrap();
        assert_eq!(back, options);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineOptions::load_from_file(Path::new("/nonexistent/critter.json")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}

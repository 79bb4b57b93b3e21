//! Data-driven game configuration
//!
//! Stages, levels, rank times, prop spawns and sound asset names. Loaded once
//! at startup from JSON (every field optional) and validated before a session
//! is built.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::SoundId;
use crate::sim::{
    LevelDef, PropSpawn, PropTag, RankThresholds, RollSounds, Stickiness, StickyStage,
};

/// Configuration problems found at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("at least one sticky stage is required")]
    NoStages,

    #[error("at least one level is required")]
    NoLevels,

    #[error("invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Player ball and camera tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Force per unit of input axis
    pub move_speed: f32,
    /// Degrees of camera orbit per unit of mouse delta
    pub camera_sensitivity: f32,
    /// Collider radius before stage growth
    pub base_radius: f32,
    /// Camera position relative to the ball at startup
    pub camera_offset: Vec3,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            camera_sensitivity: 3.0,
            base_radius: 0.5,
            camera_offset: Vec3::new(0.0, 3.0, -6.0),
        }
    }
}

/// Sound asset names used outside the stage table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub low_roll: SoundId,
    pub high_roll: SoundId,
    pub stage_completed: SoundId,
    pub countdown: SoundId,
    pub go: SoundId,
    pub goal: SoundId,
    pub button_click: SoundId,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            low_roll: SoundId::new("low_roll"),
            high_roll: SoundId::new("high_roll"),
            stage_completed: SoundId::new("stage_completed"),
            countdown: SoundId::new("countdown_beep"),
            go: SoundId::new("countdown_go"),
            goal: SoundId::new("goal_fanfare"),
            button_click: SoundId::new("button_click"),
        }
    }
}

impl SoundConfig {
    pub fn roll_sounds(&self) -> RollSounds {
        RollSounds {
            low: self.low_roll.clone(),
            high: self.high_roll.clone(),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub ball: BallConfig,
    pub stages: Vec<StickyStage>,
    pub levels: Vec<LevelDef>,
    pub ranks: RankThresholds,
    pub props: Vec<PropSpawn>,
    pub sounds: SoundConfig,
    /// Seed for prop placement
    pub prop_seed: u64,
    /// UI screens the HUD can switch between
    pub screens: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let stage = |stickiness, speed_multiplier, radius_increase, pickup_distance_scale, sound: &str| {
            StickyStage {
                stickiness,
                speed_multiplier,
                radius_increase,
                pickup_distance_scale,
                collect_sound: SoundId::new(sound),
            }
        };
        let props = |tag, min_scale, max_scale, spawn_count, min_spawn_range, max_spawn_range| PropSpawn {
            tag,
            min_scale,
            max_scale,
            spawn_count,
            min_spawn_range,
            max_spawn_range,
        };

        Self {
            ball: BallConfig::default(),
            stages: vec![
                stage(Stickiness::Weak, 1.25, 0.0, 0.9, "collect_small"),
                stage(Stickiness::Medium, 1.5, 0.35, 0.75, "collect_medium"),
                stage(Stickiness::Strong, 1.8, 0.8, 0.6, "collect_large"),
            ],
            levels: vec![
                LevelDef {
                    stage: PropTag::Small,
                    num_to_collect: 10,
                },
                LevelDef {
                    stage: PropTag::Medium,
                    num_to_collect: 6,
                },
                LevelDef {
                    stage: PropTag::Large,
                    num_to_collect: 3,
                },
            ],
            ranks: RankThresholds {
                gold_time: 90.0,
                silver_time: 150.0,
            },
            props: vec![
                props(PropTag::Small, 0.2, 0.4, 40, 3.0, 25.0),
                props(PropTag::Medium, 0.6, 0.9, 20, 10.0, 35.0),
                props(PropTag::Large, 1.2, 1.6, 8, 20.0, 45.0),
            ],
            sounds: SoundConfig::default(),
            prop_seed: 0x5EED,
            screens: vec!["Tutorial".to_string(), "Game Complete".to_string()],
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded config from {} ({} stages, {} levels)",
            path.display(),
            config.stages.len(),
            config.levels.len()
        );
        Ok(config)
    }

    /// Reject configurations the game cannot start with. Dubious but playable
    /// values only produce warnings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        for (i, stage) in self.stages.iter().enumerate() {
            if !(0.0..=1.0).contains(&stage.pickup_distance_scale) {
                return Err(ConfigError::invalid(
                    format!("stages[{i}].pickup_distance_scale"),
                    format!("{} is outside 0..=1", stage.pickup_distance_scale),
                ));
            }
        }

        for (i, spawn) in self.props.iter().enumerate() {
            if spawn.min_spawn_range < 0.0 || spawn.min_spawn_range > spawn.max_spawn_range {
                return Err(ConfigError::invalid(
                    format!("props[{i}].spawn_range"),
                    format!("{}..{} is not a valid range", spawn.min_spawn_range, spawn.max_spawn_range),
                ));
            }
            if spawn.min_scale <= 0.0 || spawn.min_scale > spawn.max_scale {
                return Err(ConfigError::invalid(
                    format!("props[{i}].scale"),
                    format!("{}..{} is not a valid range", spawn.min_scale, spawn.max_scale),
                ));
            }
        }

        if self.ranks.gold_time >= self.ranks.silver_time {
            log::warn!(
                "gold_time ({}) should be below silver_time ({})",
                self.ranks.gold_time,
                self.ranks.silver_time
            );
        }
        if self.levels.len() > self.stages.len() {
            log::warn!(
                "{} levels but only {} stages; later levels reuse the last stage",
                self.levels.len(),
                self.stages.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "prop_seed": 9, "ball": { "move_speed": 4.0 } }"#).unwrap();
        assert_eq!(config.prop_seed, 9);
        assert_eq!(config.ball.move_speed, 4.0);
        assert_eq!(config.ball.base_radius, BallConfig::default().base_radius);
        assert_eq!(config.stages.len(), 3);
    }

    #[test]
    fn test_json_round_trip_of_stage_table() {
        let json = r#"{
            "stages": [
                { "stickiness": "Strong", "speed_multiplier": 2.0, "radius_increase": 1.0,
                  "pickup_distance_scale": 0.5, "collect_sound": "boing" }
            ],
            "levels": [ { "stage": "Large", "num_to_collect": 1 } ]
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.stages[0].stickiness, Stickiness::Strong);
        assert_eq!(config.stages[0].collect_sound.as_str(), "boing");
        assert_eq!(config.levels[0].stage, PropTag::Large);
    }

    #[test]
    fn test_empty_tables_rejected() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "stages": [] }"#),
            Err(ConfigError::NoStages)
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "levels": [] }"#),
            Err(ConfigError::NoLevels)
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let mut config = GameConfig::default();
        config.stages[1].pickup_distance_scale = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = GameConfig::default();
        config.props[0].min_spawn_range = 50.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("props[0].spawn_range"));
    }

    #[test]
    fn test_unknown_tag_is_parse_error() {
        let json = r#"{ "levels": [ { "stage": "Huge", "num_to_collect": 1 } ] }"#;
        assert!(matches!(GameConfig::from_json(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            GameConfig::load_from_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}

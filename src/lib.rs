//! Fudge Roll - A rolling-ball collection game
//!
//! Core modules:
//! - `sim`: Deterministic gameplay (stickiness stages, progression, movement, timers)
//! - `audio`: Sound channel facade keyed by asset id
//! - `hud`: HUD capability and the text HUD implementation
//! - `localization`: Keyed string tables
//! - `config`: Data-driven stage/level configuration
//! - `settings`: Player preferences

pub mod audio;
pub mod config;
pub mod hud;
pub mod localization;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (50 Hz, the usual fixed update rate)
    pub const PHYSICS_DT: f32 = 1.0 / 50.0;
    /// Maximum physics substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Ball starts counting as moving above this speed
    pub const START_MOVING_SPEED: f32 = 2.0;
    /// Ball counts as still again at or below this speed
    pub const STOP_MOVING_SPEED: f32 = 1.5;

    /// Movement multiplier before the first stage is applied
    pub const DEFAULT_MOVE_MULTIPLIER: f32 = 1.25;
    /// Camera distance scale is capped at this multiplier
    pub const MAX_CAMERA_ZOOM: f32 = 1.5;

    /// Countdown start value (3, 2, 1, Go)
    pub const COUNTDOWN_START: i32 = 3;
    /// Seconds between countdown ticks
    pub const COUNTDOWN_INTERVAL: f32 = 1.0;

    /// "Level Complete" info text duration
    pub const LEVEL_COMPLETE_TEXT_SECS: f32 = 2.0;
    /// Delay before the next collection target (or goal hint) is shown
    pub const NEXT_TARGET_DELAY_SECS: f32 = 3.0;
    /// Goal hint duration
    pub const GOAL_TEXT_SECS: f32 = 5.0;
    /// Collection target text duration
    pub const COLLECTION_TEXT_SECS: f32 = 5.0;
    /// Info text fade-out time
    pub const INFO_FADE_SECS: f32 = 0.5;
}

/// World up axis
pub const UP: Vec3 = Vec3::Y;

/// Project a vector onto the ground (XZ) plane
#[inline]
pub fn flatten_xz(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Replace `{0}`, `{1}`, ... placeholders in a template with the given arguments
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), arg);
    }
    out
}

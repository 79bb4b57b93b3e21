//! Player settings and preferences
//!
//! Persisted separately from the game configuration as a small JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::AudioMixer;
use crate::localization::DEFAULT_LANGUAGE;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// UI language code
    pub language: String,

    // === Controls ===
    /// Scales the configured camera orbit sensitivity
    pub camera_sensitivity_scale: f32,
    /// Orbit the other way for horizontal mouse movement
    pub invert_camera: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute everything
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),

            // Controls
            camera_sensitivity_scale: 1.0,
            invert_camera: false,

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Signed multiplier applied to the camera sensitivity
    pub fn effective_camera_scale(&self) -> f32 {
        let scale = self.camera_sensitivity_scale.max(0.0);
        if self.invert_camera { -scale } else { scale }
    }

    /// Push the volume preferences into a mixer
    pub fn apply_audio(&self, mixer: &mut AudioMixer) {
        mixer.set_master_volume(self.master_volume);
        mixer.set_sfx_volume(self.sfx_volume);
        mixer.set_muted(self.muted);
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings {}: {}", path.display(), e),
            },
            Err(_) => log::info!("No settings at {}", path.display()),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        assert_eq!(Settings::load("/no/such/settings.json"), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("fudge_roll_settings_{}.json", std::process::id()));
        let settings = Settings {
            language: "fr".to_string(),
            muted: true,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_camera_scale() {
        let mut settings = Settings {
            camera_sensitivity_scale: 2.0,
            ..Default::default()
        };
        assert_eq!(settings.effective_camera_scale(), 2.0);
        settings.invert_camera = true;
        assert_eq!(settings.effective_camera_scale(), -2.0);
    }

    #[test]
    fn test_apply_audio() {
        let mut mixer = AudioMixer::default();
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Default::default()
        };
        settings.apply_audio(&mut mixer);
        assert!((mixer.effective_volume() - 0.25).abs() < 1e-6);
    }
}

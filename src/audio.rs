//! Audio facade
//!
//! The host owns the actual sound playback. Gameplay only asks for a channel
//! bound to a sound asset and starts/stops it. Channels are created once per
//! asset and reused afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a sound asset (the clip name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundId(String);

impl SoundId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SoundId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A playable channel bound to one sound asset
pub trait AudioChannel {
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Channel gain (0.0 - 1.0)
    fn set_volume(&mut self, _volume: f32) {}
}

/// Creates channels for sound assets
pub trait AudioBackend {
    fn create_channel(&mut self, sound: &SoundId) -> Box<dyn AudioChannel>;
}

/// Channel that only tracks its playing flag and logs, for headless hosts
#[derive(Debug)]
pub struct SilentChannel {
    sound: SoundId,
    playing: bool,
}

impl AudioChannel for SilentChannel {
    fn play(&mut self) {
        log::debug!("play {}", self.sound);
        self.playing = true;
    }

    fn stop(&mut self) {
        if self.playing {
            log::debug!("stop {}", self.sound);
        }
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Backend producing [`SilentChannel`]s
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn create_channel(&mut self, sound: &SoundId) -> Box<dyn AudioChannel> {
        Box::new(SilentChannel {
            sound: sound.clone(),
            playing: false,
        })
    }
}

/// Audio manager for the game
///
/// Looks up channels by sound id, creating them through the backend on first
/// use, and applies master/sfx volume and mute to every channel it hands out.
pub struct AudioMixer {
    backend: Box<dyn AudioBackend>,
    channels: HashMap<SoundId, Box<dyn AudioChannel>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new(Box::new(SilentBackend))
    }
}

impl AudioMixer {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            channels: HashMap::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Make sure a channel exists for this sound, reusing an existing one
    pub fn acquire(&mut self, sound: &SoundId) {
        if self.channels.contains_key(sound) {
            return;
        }
        let mut channel = self.backend.create_channel(sound);
        channel.set_volume(self.effective_volume());
        self.channels.insert(sound.clone(), channel);
    }

    pub fn play(&mut self, sound: &SoundId) {
        self.acquire(sound);
        if let Some(channel) = self.channels.get_mut(sound) {
            channel.play();
        }
    }

    pub fn stop(&mut self, sound: &SoundId) {
        if let Some(channel) = self.channels.get_mut(sound) {
            channel.stop();
        }
    }

    /// Stop every channel (restart/teardown)
    pub fn stop_all(&mut self) {
        for channel in self.channels.values_mut() {
            channel.stop();
        }
    }

    pub fn is_playing(&self, sound: &SoundId) -> bool {
        self.channels.get(sound).is_some_and(|c| c.is_playing())
    }

    /// Number of distinct channels created so far
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.apply_volume();
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
        self.apply_volume();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn apply_volume(&mut self) {
        let vol = self.effective_volume();
        for channel in self.channels.values_mut() {
            channel.set_volume(vol);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_channel_reused_per_sound() {
        let (mut mixer, log) = recording_mixer();
        let roll = SoundId::new("low_roll");
        mixer.acquire(&roll);
        mixer.acquire(&roll);
        mixer.play(&roll);
        assert_eq!(mixer.channel_count(), 1);
        let creates = log
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count();
        assert_eq!(creates, 1);
        assert!(mixer.is_playing(&roll));
    }

    #[test]
    fn test_stop_unknown_sound_is_noop() {
        let (mut mixer, log) = recording_mixer();
        mixer.stop(&SoundId::new("never_created"));
        assert!(log.borrow().is_empty());
        assert_eq!(mixer.channel_count(), 0);
    }

    #[test]
    fn test_effective_volume() {
        let mut mixer = AudioMixer::default();
        mixer.set_master_volume(0.5);
        mixer.set_sfx_volume(2.0);
        assert!((mixer.effective_volume() - 0.5).abs() < f32::EPSILON);
        mixer.set_muted(true);
        assert_eq!(mixer.effective_volume(), 0.0);
    }
}

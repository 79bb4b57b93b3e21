//! Ball stickiness stages
//!
//! The ball can only pick up one size class of prop at a time. Each stage
//! makes it stickier, faster and bigger, and changes its rolling sound.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::movement::MotionHysteresis;
use crate::audio::{AudioMixer, SoundId};
use crate::config::ConfigError;
use crate::consts::DEFAULT_MOVE_MULTIPLIER;

/// How sticky the ball is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stickiness {
    #[default]
    Weak,
    Medium,
    Strong,
}

impl Stickiness {
    /// The one prop class this stickiness can pick up
    pub fn collectible_tag(self) -> PropTag {
        match self {
            Stickiness::Weak => PropTag::Small,
            Stickiness::Medium => PropTag::Medium,
            Stickiness::Strong => PropTag::Large,
        }
    }
}

/// Size class tag carried by collectible props
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropTag {
    Small,
    Medium,
    Large,
}

impl PropTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropTag::Small => "Small",
            PropTag::Medium => "Medium",
            PropTag::Large => "Large",
        }
    }

    /// Exact, case-sensitive tag match. Anything else is not a prop.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "Small" => Some(PropTag::Small),
            "Medium" => Some(PropTag::Medium),
            "Large" => Some(PropTag::Large),
            _ => None,
        }
    }
}

impl fmt::Display for PropTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stickiness upgrade, indexed by level number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyStage {
    pub stickiness: Stickiness,
    pub speed_multiplier: f32,
    pub radius_increase: f32,
    /// How far a picked-up prop is pulled toward the ball centre (0-1)
    pub pickup_distance_scale: f32,
    pub collect_sound: SoundId,
}

/// Which rolling loops are playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollSound {
    #[default]
    Silent,
    LowOnly,
    HighOnly,
    Both,
}

impl RollSound {
    pub fn for_state(stickiness: Stickiness, moving: bool) -> Self {
        if !moving {
            return RollSound::Silent;
        }
        match stickiness {
            Stickiness::Weak => RollSound::LowOnly,
            Stickiness::Medium => RollSound::HighOnly,
            Stickiness::Strong => RollSound::Both,
        }
    }

    pub fn low(self) -> bool {
        matches!(self, RollSound::LowOnly | RollSound::Both)
    }

    pub fn high(self) -> bool {
        matches!(self, RollSound::HighOnly | RollSound::Both)
    }
}

/// The rolling-ball sound pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollSounds {
    pub low: SoundId,
    pub high: SoundId,
}

/// Stickiness state of the player ball
#[derive(Debug, Clone)]
pub struct StickyBall {
    stages: Vec<StickyStage>,
    stage_index: usize,
    stickiness: Stickiness,
    base_radius: f32,
    effective_radius: f32,
    move_multiplier: f32,
    pickup_distance_scale: f32,
    pickup_sound: SoundId,
    roll_sounds: RollSounds,
    roll_sound: RollSound,
    motion: MotionHysteresis,
}

impl StickyBall {
    /// Build a ball over a non-empty stage list. Stage 0 is not applied yet;
    /// call [`StickyBall::set_stage`] once audio is available.
    pub fn new(
        stages: Vec<StickyStage>,
        base_radius: f32,
        roll_sounds: RollSounds,
    ) -> Result<Self, ConfigError> {
        let first = stages.first().ok_or(ConfigError::NoStages)?;
        let pickup_sound = first.collect_sound.clone();
        Ok(Self {
            stages,
            stage_index: 0,
            stickiness: Stickiness::Weak,
            base_radius,
            effective_radius: base_radius,
            move_multiplier: DEFAULT_MOVE_MULTIPLIER,
            pickup_distance_scale: 1.0,
            pickup_sound,
            roll_sounds,
            roll_sound: RollSound::Silent,
            motion: MotionHysteresis::default(),
        })
    }

    /// Clamp a requested stage index into the configured range
    pub fn clamp_index(&self, index: isize) -> usize {
        let last = self.stages.len().saturating_sub(1);
        index.clamp(0, last as isize) as usize
    }

    /// Apply a stickiness stage. Out-of-range indices are clamped.
    pub fn set_stage(&mut self, index: isize, audio: &mut AudioMixer) {
        let clamped = self.clamp_index(index);
        if clamped as isize != index {
            log::warn!(
                "Stage index {} out of range 0..{}, clamped to {}",
                index,
                self.stages.len(),
                clamped
            );
        }

        let stage = &self.stages[clamped];
        self.stage_index = clamped;
        self.stickiness = stage.stickiness;
        self.move_multiplier = stage.speed_multiplier;
        self.effective_radius = self.base_radius + stage.radius_increase;
        self.pickup_distance_scale = stage.pickup_distance_scale;

        self.pickup_sound = stage.collect_sound.clone();
        audio.acquire(&self.pickup_sound);

        log::debug!(
            "Ball stage {} ({:?}): multiplier={}, radius={}",
            clamped,
            self.stickiness,
            self.move_multiplier,
            self.effective_radius
        );

        if self.motion.is_moving() {
            self.apply_roll_sound(audio);
        }
    }

    /// Exact tag match against the current stickiness tier
    pub fn can_stick(&self, tag: &str) -> bool {
        PropTag::parse(tag) == Some(self.stickiness.collectible_tag())
    }

    /// Feed the body speed for this physics tick. Returns the new moving
    /// flag when it changed.
    pub fn sample_speed(&mut self, speed: f32, audio: &mut AudioMixer) -> Option<bool> {
        let changed = self.motion.sample(speed)?;
        self.apply_roll_sound(audio);
        Some(changed)
    }

    pub fn play_pickup(&self, audio: &mut AudioMixer) {
        audio.play(&self.pickup_sound);
    }

    /// Acquire the rolling channels up front
    pub fn acquire_sounds(&self, audio: &mut AudioMixer) {
        audio.acquire(&self.roll_sounds.low);
        audio.acquire(&self.roll_sounds.high);
    }

    /// Start/stop only the rolling loops whose state differs
    fn apply_roll_sound(&mut self, audio: &mut AudioMixer) {
        let target = RollSound::for_state(self.stickiness, self.motion.is_moving());
        let current = self.roll_sound;
        if target.low() != current.low() {
            if target.low() {
                audio.play(&self.roll_sounds.low);
            } else {
                audio.stop(&self.roll_sounds.low);
            }
        }
        if target.high() != current.high() {
            if target.high() {
                audio.play(&self.roll_sounds.high);
            } else {
                audio.stop(&self.roll_sounds.high);
            }
        }
        self.roll_sound = target;
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stickiness(&self) -> Stickiness {
        self.stickiness
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    pub fn effective_radius(&self) -> f32 {
        self.effective_radius
    }

    pub fn move_multiplier(&self) -> f32 {
        self.move_multiplier
    }

    pub fn pickup_distance_scale(&self) -> f32 {
        self.pickup_distance_scale
    }

    pub fn pickup_sound(&self) -> &SoundId {
        &self.pickup_sound
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    pub fn roll_sound(&self) -> RollSound {
        self.roll_sound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{Call, recording_mixer};
    use proptest::prelude::*;

    fn stage(stickiness: Stickiness, mult: f32, radius: f32, sound: &str) -> StickyStage {
        StickyStage {
            stickiness,
            speed_multiplier: mult,
            radius_increase: radius,
            pickup_distance_scale: 0.5,
            collect_sound: SoundId::new(sound),
        }
    }

    fn three_stage_ball() -> StickyBall {
        StickyBall::new(
            vec![
                stage(Stickiness::Weak, 1.0, 0.0, "pop_small"),
                stage(Stickiness::Medium, 1.5, 0.5, "pop_medium"),
                stage(Stickiness::Strong, 2.0, 1.0, "pop_large"),
            ],
            0.5,
            RollSounds {
                low: SoundId::new("low_roll"),
                high: SoundId::new("high_roll"),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_empty_stages_rejected() {
        let sounds = RollSounds {
            low: SoundId::new("low"),
            high: SoundId::new("high"),
        };
        assert!(matches!(
            StickyBall::new(Vec::new(), 0.5, sounds),
            Err(ConfigError::NoStages)
        ));
    }

    #[test]
    fn test_initial_state() {
        let ball = three_stage_ball();
        assert_eq!(ball.move_multiplier(), DEFAULT_MOVE_MULTIPLIER);
        assert_eq!(ball.effective_radius(), 0.5);
        assert!(!ball.is_moving());
    }

    #[test]
    fn test_set_stage_updates_ball() {
        let (mut audio, _) = recording_mixer();
        let mut ball = three_stage_ball();
        ball.set_stage(1, &mut audio);
        assert_eq!(ball.stage_index(), 1);
        assert_eq!(ball.stickiness(), Stickiness::Medium);
        assert_eq!(ball.move_multiplier(), 1.5);
        assert!((ball.effective_radius() - 1.0).abs() < 1e-6);
        assert_eq!(ball.pickup_sound().as_str(), "pop_medium");
    }

    #[test]
    fn test_can_stick_per_tier() {
        let (mut audio, _) = recording_mixer();
        let mut ball = three_stage_ball();
        let expected = [("Small", 0), ("Medium", 1), ("Large", 2)];
        for (i, _) in expected.iter().enumerate() {
            ball.set_stage(i as isize, &mut audio);
            for (tag, tier) in expected {
                assert_eq!(ball.can_stick(tag), tier == i, "stage {i} tag {tag}");
            }
        }
    }

    #[test]
    fn test_unknown_tags_never_stick() {
        let (mut audio, _) = recording_mixer();
        let mut ball = three_stage_ball();
        ball.set_stage(0, &mut audio);
        assert!(!ball.can_stick("small"));
        assert!(!ball.can_stick("Goal"));
        assert!(!ball.can_stick(""));
    }

    #[test]
    fn test_moving_hysteresis_sequence() {
        let (mut audio, _) = recording_mixer();
        let mut ball = three_stage_ball();
        ball.set_stage(0, &mut audio);
        let moving: Vec<bool> = [2.1, 1.6, 1.4]
            .into_iter()
            .map(|speed| {
                ball.sample_speed(speed, &mut audio);
                ball.is_moving()
            })
            .collect();
        assert_eq!(moving, vec![true, true, false]);
    }

    #[test]
    fn test_roll_sound_follows_stickiness() {
        let (mut audio, log) = recording_mixer();
        let mut ball = three_stage_ball();
        ball.acquire_sounds(&mut audio);
        ball.set_stage(0, &mut audio);

        ball.sample_speed(3.0, &mut audio);
        assert_eq!(ball.roll_sound(), RollSound::LowOnly);
        assert!(audio.is_playing(&SoundId::new("low_roll")));

        log.borrow_mut().clear();
        ball.set_stage(1, &mut audio);
        assert_eq!(ball.roll_sound(), RollSound::HighOnly);
        assert!(log.borrow().contains(&Call::Stop("low_roll".into())));
        assert!(log.borrow().contains(&Call::Play("high_roll".into())));

        // High loop is already running, only low restarts
        log.borrow_mut().clear();
        ball.set_stage(2, &mut audio);
        assert_eq!(ball.roll_sound(), RollSound::Both);
        assert!(!log.borrow().contains(&Call::Play("high_roll".into())));
        assert!(log.borrow().contains(&Call::Play("low_roll".into())));

        ball.sample_speed(1.0, &mut audio);
        assert_eq!(ball.roll_sound(), RollSound::Silent);
        assert!(!audio.is_playing(&SoundId::new("low_roll")));
        assert!(!audio.is_playing(&SoundId::new("high_roll")));
    }

    #[test]
    fn test_stage_change_while_still_is_silent() {
        let (mut audio, log) = recording_mixer();
        let mut ball = three_stage_ball();
        ball.set_stage(2, &mut audio);
        assert_eq!(ball.roll_sound(), RollSound::Silent);
        assert!(!log.borrow().iter().any(|c| matches!(c, Call::Play(_))));
    }

    proptest! {
        #[test]
        fn prop_set_stage_clamps(index in -100isize..100) {
            let (mut audio, _) = recording_mixer();
            let mut clamped = three_stage_ball();
            let mut reference = three_stage_ball();
            clamped.set_stage(index, &mut audio);
            reference.set_stage(index.clamp(0, 2), &mut audio);
            prop_assert_eq!(clamped.stage_index(), reference.stage_index());
            prop_assert_eq!(clamped.stickiness(), reference.stickiness());
            prop_assert_eq!(clamped.move_multiplier(), reference.move_multiplier());
            prop_assert_eq!(clamped.effective_radius(), reference.effective_radius());
        }

        #[test]
        fn prop_can_stick_exact_tag(index in 0isize..3, tag in "[A-Za-z]{0,8}") {
            let (mut audio, _) = recording_mixer();
            let mut ball = three_stage_ball();
            ball.set_stage(index, &mut audio);
            let expected = ball.stickiness().collectible_tag().as_str() == tag;
            prop_assert_eq!(ball.can_stick(&tag), expected);
        }
    }
}

//! Gameplay session driven by host callbacks
//!
//! The host owns the frame loop, the physics body and collision detection.
//! It calls into the session through [`HostHooks`] and applies whatever comes
//! back (camera pose, prop attachments, drained [`GameEvent`]s).

use glam::Vec3;

use super::movement::{CameraPose, MoveAxes, OrbitCamera, movement_force};
use super::progression::{
    CountdownDisplay, GamePhase, PlayerRank, StageOutcome, StageProgression,
};
use super::props::PropField;
use super::stickiness::{PropTag, StickyBall};
use super::timer::{Scheduler, TimerHandle};
use crate::audio::AudioMixer;
use crate::config::{ConfigError, GameConfig};
use crate::consts::*;
use crate::hud::Hud;
use crate::settings::Settings;

/// Rigid body of the player ball, owned by the host physics
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn speed(&self) -> f32;
    /// Add a force for this fixed step
    fn add_force(&mut self, force: Vec3);
}

/// Something the ball touched
#[derive(Debug, Clone, PartialEq)]
pub enum Contact {
    /// A tagged world object; only props spawned by the session can stick
    Prop { id: u32, tag: String, position: Vec3 },
    /// The finish ribbon
    Goal,
}

/// A prop that should now follow the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub prop_id: u32,
    /// Offset from the ball centre
    pub offset: Vec3,
}

/// Per-frame input sampled by the host
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Horizontal mouse delta
    pub mouse_dx: f32,
    pub ball_position: Vec3,
}

/// Gameplay events for effects the host plays
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Collected { prop_id: u32, tag: PropTag },
    /// Celebration effect at the ball position
    StageCompleted { level: usize, position: Vec3 },
    AllStagesCompleted,
    GameComplete { elapsed: f32, rank: PlayerRank },
}

/// Callbacks a host loop invokes
pub trait HostHooks {
    fn on_init(&mut self);
    /// Variable-rate frame update; returns where the camera should be
    fn on_frame(&mut self, dt: f32, input: &FrameInput) -> CameraPose;
    /// Fixed-rate physics update
    fn on_physics_tick(&mut self, dt: f32, axes: MoveAxes, body: &mut dyn PhysicsBody);
    fn on_collision(&mut self, contact: &Contact) -> Option<Attachment>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    CountdownTick,
    ShowCollectionText,
    ShowFinishText,
}

/// One play-through of the game
pub struct GameSession<H: Hud> {
    config: GameConfig,
    camera_sensitivity: f32,
    /// Pristine state restored on init/restart
    fresh_ball: StickyBall,
    fresh_progression: StageProgression,
    ball: StickyBall,
    progression: StageProgression,
    camera: OrbitCamera,
    camera_position: Vec3,
    ball_position: Vec3,
    props: PropField,
    timers: Scheduler<TimerEvent>,
    countdown_timer: Option<TimerHandle>,
    /// Part of the current frame played after "Go", credited once
    first_play_slice: Option<f32>,
    audio: AudioMixer,
    hud: H,
    events: Vec<GameEvent>,
}

impl<H: Hud> GameSession<H> {
    pub fn new(
        config: GameConfig,
        settings: &Settings,
        mut audio: AudioMixer,
        mut hud: H,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let ball = StickyBall::new(
            config.stages.clone(),
            config.ball.base_radius,
            config.sounds.roll_sounds(),
        )?;
        let progression = StageProgression::new(config.levels.clone(), config.ranks)?;

        settings.apply_audio(&mut audio);
        hud.set_language(&settings.language);

        let camera_sensitivity = config.ball.camera_sensitivity * settings.effective_camera_scale();
        let camera = OrbitCamera::new(config.ball.camera_offset, camera_sensitivity);

        Ok(Self {
            camera_sensitivity,
            fresh_ball: ball.clone(),
            fresh_progression: progression.clone(),
            ball,
            progression,
            camera_position: config.ball.camera_offset,
            camera,
            ball_position: Vec3::ZERO,
            props: PropField::default(),
            timers: Scheduler::new(),
            countdown_timer: None,
            first_play_slice: None,
            audio,
            hud,
            events: Vec::new(),
            config,
        })
    }

    pub fn ball(&self) -> &StickyBall {
        &self.ball
    }

    pub fn progression(&self) -> &StageProgression {
        &self.progression
    }

    pub fn props(&self) -> &PropField {
        &self.props
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn audio(&self) -> &AudioMixer {
        &self.audio
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Leave the tutorial screen and start the 3-2-1 countdown
    pub fn on_start_game(&mut self) {
        if self.progression.phase() != GamePhase::Countdown || self.countdown_timer.is_some() {
            return;
        }
        self.hud.show_hud(true);
        self.hud.show_screen("");
        self.progression.start_countdown();
        // First tick on the next frame, then once a second
        self.countdown_timer = Some(self.timers.every(0.0, COUNTDOWN_INTERVAL, TimerEvent::CountdownTick));
        log::info!("Countdown started");
    }

    /// Throw the run away and start over from the tutorial screen
    pub fn on_restart(&mut self) {
        self.audio.stop_all();
        self.events.clear();
        self.on_init();
        log::info!("Session restarted");
    }

    /// Switch HUD language and redraw
    pub fn on_language_changed(&mut self, language: &str) {
        self.hud.set_language(language);
        self.refresh_hud();
    }

    pub fn on_button_click(&mut self) {
        self.audio.play(&self.config.sounds.button_click);
    }

    fn refresh_hud(&mut self) {
        let elapsed = self.progression.run().elapsed_time;
        self.hud.update_hud(
            elapsed,
            self.progression.rank_for_time(elapsed),
            self.progression.remaining(),
            self.progression.current_level().stage,
        );
    }

    fn show_collection_text(&mut self) {
        let level = *self.progression.current_level();
        self.hud.show_collection_text(level.num_to_collect, level.stage);
    }

    fn handle_timer(&mut self, handle: TimerHandle, event: TimerEvent) {
        log::debug!("Timer {:?} fired at {:.2}s", event, self.timers.now());
        match event {
            TimerEvent::CountdownTick => {
                let was_playing = self.progression.can_move();
                let Some(step) = self.progression.countdown_tick() else {
                    self.timers.cancel(handle);
                    self.countdown_timer = None;
                    return;
                };
                if !was_playing && self.progression.can_move() {
                    self.first_play_slice = Some(self.timers.lateness());
                }
                self.hud.show_countdown(step.display);
                match step.display {
                    CountdownDisplay::Number(_) => self.audio.play(&self.config.sounds.countdown),
                    CountdownDisplay::Go => self.audio.play(&self.config.sounds.go),
                    CountdownDisplay::Hidden => {}
                }
                if step.finished {
                    self.timers.cancel(handle);
                    self.countdown_timer = None;
                    self.show_collection_text();
                }
            }
            TimerEvent::ShowCollectionText => self.show_collection_text(),
            TimerEvent::ShowFinishText => self.hud.show_info_text("Goal", GOAL_TEXT_SECS),
        }
    }

    fn on_stage_outcome(&mut self, outcome: StageOutcome) {
        let completed = match outcome {
            StageOutcome::Advanced { level } => level - 1,
            StageOutcome::FinishedAll => self.progression.run().current_level,
        };
        log::info!("Level {} complete", completed + 1);
        self.events.push(GameEvent::StageCompleted {
            level: completed,
            position: self.ball_position,
        });
        self.audio.play(&self.config.sounds.stage_completed);

        match outcome {
            StageOutcome::Advanced { level } => {
                self.ball.set_stage(level as isize, &mut self.audio);
                self.refresh_hud();
                self.hud.show_info_text("Level Complete", LEVEL_COMPLETE_TEXT_SECS);
                self.timers.after(NEXT_TARGET_DELAY_SECS, TimerEvent::ShowCollectionText);
            }
            StageOutcome::FinishedAll => {
                self.events.push(GameEvent::AllStagesCompleted);
                self.hud.show_info_text("Level Complete", LEVEL_COMPLETE_TEXT_SECS);
                self.timers.after(NEXT_TARGET_DELAY_SECS, TimerEvent::ShowFinishText);
            }
        }
    }

    fn on_game_complete(&mut self) {
        self.progression.finish();
        let elapsed = self.progression.run().elapsed_time;
        let rank = self.progression.rank_for_time(elapsed);
        log::info!("Game complete in {:.3}s ({})", elapsed, rank.as_str());

        self.audio.play(&self.config.sounds.goal);
        self.hud.show_game_over();
        self.hud.show_screen("Game Complete");
        self.events.push(GameEvent::GameComplete { elapsed, rank });
    }

    fn try_collect(&mut self, id: u32, tag: &str, position: Vec3) -> Option<Attachment> {
        if !self.progression.can_move() || !self.ball.can_stick(tag) {
            return None;
        }
        let prop_tag = PropTag::parse(tag)?;
        let offset = (position - self.ball_position) * self.ball.pickup_distance_scale();
        if !self.props.attach(id, offset) {
            log::debug!("Prop {} unknown or already attached", id);
            return None;
        }
        log::debug!("Prop {} ({}) attached", id, prop_tag);

        self.ball.play_pickup(&mut self.audio);
        self.events.push(GameEvent::Collected {
            prop_id: id,
            tag: prop_tag,
        });

        let outcome = self.progression.increment_collected();
        self.refresh_hud();
        if let Some(outcome) = outcome {
            self.on_stage_outcome(outcome);
        }

        Some(Attachment {
            prop_id: id,
            offset,
        })
    }
}

impl<H: Hud> HostHooks for GameSession<H> {
    fn on_init(&mut self) {
        self.timers.cancel_all();
        self.countdown_timer = None;
        self.first_play_slice = None;
        self.ball = self.fresh_ball.clone();
        self.progression = self.fresh_progression.clone();
        self.camera = OrbitCamera::new(self.config.ball.camera_offset, self.camera_sensitivity);
        self.ball_position = Vec3::ZERO;
        self.camera_position = self
            .camera
            .pose(self.ball_position, self.ball.move_multiplier())
            .position;

        self.audio.acquire(&self.config.sounds.stage_completed);
        self.ball.acquire_sounds(&mut self.audio);
        self.ball.set_stage(0, &mut self.audio);

        self.props = PropField::scatter(&self.config.props, self.config.prop_seed);

        self.refresh_hud();
        self.hud.show_countdown(self.progression.countdown_display());
        self.hud.show_hud(false);
        self.hud.show_screen("Tutorial");
        log::info!(
            "Session ready: {} levels, {} stages",
            self.progression.levels().len(),
            self.ball.stage_count()
        );
    }

    fn on_frame(&mut self, dt: f32, input: &FrameInput) -> CameraPose {
        self.timers.advance(dt);
        while let Some((handle, event)) = self.timers.pop_due() {
            self.handle_timer(handle, event);
        }

        if self.progression.can_move() {
            self.camera.orbit(input.mouse_dx);
        }
        self.ball_position = input.ball_position;
        let pose = self.camera.pose(self.ball_position, self.ball.move_multiplier());
        self.camera_position = pose.position;

        if self.progression.can_move() {
            let played = self.first_play_slice.take().map_or(dt, |late| late.min(dt));
            self.progression.add_elapsed(played);
            if self.progression.run().elapsed_time > 0.0 {
                self.refresh_hud();
            }
        }

        self.hud.update(dt);
        pose
    }

    fn on_physics_tick(&mut self, _dt: f32, axes: MoveAxes, body: &mut dyn PhysicsBody) {
        // Collisions after this step are measured from here
        self.ball_position = body.position();
        if self.progression.can_move() {
            let force = movement_force(
                body.position(),
                self.camera_position,
                axes,
                self.config.ball.move_speed,
                self.ball.move_multiplier(),
            );
            body.add_force(force);
        }

        if let Some(moving) = self.ball.sample_speed(body.speed(), &mut self.audio) {
            log::debug!("Ball {}", if moving { "rolling" } else { "stopped" });
        }
    }

    fn on_collision(&mut self, contact: &Contact) -> Option<Attachment> {
        match contact {
            Contact::Prop { id, tag, position } => self.try_collect(*id, tag, *position),
            Contact::Goal => {
                if self.progression.can_finish() {
                    self.on_game_complete();
                }
                None
            }
        }
    }
}

//! Deterministic gameplay module
//!
//! All gameplay rules live here. Nothing in this module touches the engine:
//! - Physics, rendering and input are reached through host traits
//! - Timers run on the frame clock handed in by the host
//! - Prop placement uses a seeded RNG

pub mod movement;
pub mod progression;
pub mod props;
pub mod session;
pub mod stickiness;
pub mod timer;

pub use movement::{CameraPose, MotionHysteresis, MoveAxes, OrbitCamera, movement_force};
pub use progression::{
    CountdownDisplay, CountdownStep, GamePhase, LevelDef, PlayerRank, RankThresholds, RunState,
    StageOutcome, StageProgression,
};
pub use props::{PropField, PropInstance, PropSpawn};
pub use session::{
    Attachment, Contact, FrameInput, GameEvent, GameSession, HostHooks, PhysicsBody,
};
pub use stickiness::{PropTag, RollSound, RollSounds, Stickiness, StickyBall, StickyStage};
pub use timer::{Scheduler, TimerHandle};

//! Fudge Roll headless host
//!
//! Drives the gameplay core without an engine: a point-mass ball on a flat
//! plane, an autopilot that rolls toward the next collectible, and the text
//! HUD written to the log once a second.
//!
//! Usage: `fudge-roll [config.json] [settings.json]`

use glam::Vec3;

use fudge_roll::audio::AudioMixer;
use fudge_roll::consts::*;
use fudge_roll::hud::TextHud;
use fudge_roll::localization::StringTable;
use fudge_roll::sim::{
    Contact, FrameInput, GameEvent, GamePhase, GameSession, HostHooks, MoveAxes, PhysicsBody,
};
use fudge_roll::{GameConfig, Settings, UP, flatten_xz};

/// Render frame rate of the headless loop
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this much simulated time
const MAX_RUN_SECS: f32 = 600.0;
/// Seconds spent on the tutorial screen before pressing start
const TUTORIAL_SECS: f32 = 1.0;
/// Finish ribbon location
const GOAL_POSITION: Vec3 = Vec3::new(0.0, 0.0, 55.0);
const GOAL_RADIUS: f32 = 1.5;

/// Ball body with linear drag, integrated with semi-implicit Euler
struct PointMass {
    pos: Vec3,
    vel: Vec3,
    force: Vec3,
    mass: f32,
    drag: f32,
}

impl PhysicsBody for PointMass {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn speed(&self) -> f32 {
        self.vel.length()
    }

    fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }
}

impl PointMass {
    fn integrate(&mut self, dt: f32) {
        let accel = self.force / self.mass - self.vel * self.drag;
        self.vel += accel * dt;
        self.vel.y = 0.0;
        self.pos += self.vel * dt;
        self.force = Vec3::ZERO;
    }
}

/// Steer toward the nearest wanted prop (or the goal once everything is
/// collected), expressed as camera-relative input axes
fn autopilot(session: &GameSession<TextHud>, ball: Vec3) -> MoveAxes {
    let progression = session.progression();
    let target = if progression.can_finish() {
        Some(GOAL_POSITION)
    } else {
        let wanted = progression.current_level().stage;
        session
            .props()
            .props
            .iter()
            .filter(|p| p.tag == wanted && p.attached.is_none())
            .map(|p| p.position)
            .min_by(|a, b| {
                a.distance_squared(ball)
                    .partial_cmp(&b.distance_squared(ball))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    };

    let Some(target) = target else {
        return MoveAxes::default();
    };
    let desired = flatten_xz(target - ball).normalize_or_zero();
    let forward = flatten_xz(ball - session.camera_position()).normalize_or_zero();
    let right = UP.cross(forward);
    MoveAxes::new(desired.dot(right), desired.dot(forward))
}

fn log_hud(session: &GameSession<TextHud>) {
    let hud = session.hud();
    log::info!(
        "[HUD] {} | {} | {} | {}",
        hud.timer_text,
        hud.rank_text,
        hud.count_text,
        if hud.info_opacity() > 0.0 { hud.info_text.as_str() } else { "" }
    );
}

fn run(config: GameConfig, settings: Settings) -> Result<(), fudge_roll::ConfigError> {
    let hud = TextHud::new(StringTable::default(), config.screens.clone());
    let mut session = GameSession::new(config, &settings, AudioMixer::default(), hud)?;
    session.on_init();

    let mut body = PointMass {
        pos: Vec3::ZERO,
        vel: Vec3::ZERO,
        force: Vec3::ZERO,
        mass: 1.0,
        drag: 1.5,
    };

    let mut time = 0.0_f32;
    let mut accumulator = 0.0_f32;
    let mut next_hud_log = 0.0_f32;
    let mut started = false;

    while time < MAX_RUN_SECS && session.progression().phase() != GamePhase::GameOver {
        if !started && time >= TUTORIAL_SECS {
            session.on_button_click();
            session.on_start_game();
            started = true;
        }

        let input = FrameInput {
            mouse_dx: 0.0,
            ball_position: body.pos,
        };
        let pose = session.on_frame(FRAME_DT, &input);
        log::trace!("Camera at {:.2}, looking {:.2}", pose.position, pose.look_dir);

        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= PHYSICS_DT && substeps < MAX_SUBSTEPS {
            let axes = autopilot(&session, body.pos);
            session.on_physics_tick(PHYSICS_DT, axes, &mut body);
            body.integrate(PHYSICS_DT);

            let reach = session.ball().effective_radius();
            let contacts: Vec<Contact> = session
                .props()
                .loose_within(body.pos, reach)
                .map(|p| Contact::Prop {
                    id: p.id,
                    tag: p.tag.as_str().to_string(),
                    position: p.position,
                })
                .collect();
            for contact in &contacts {
                if let Some(attachment) = session.on_collision(contact) {
                    log::debug!("Prop {} stuck at {:?}", attachment.prop_id, attachment.offset);
                }
            }
            if flatten_xz(body.pos - GOAL_POSITION).length() <= GOAL_RADIUS {
                session.on_collision(&Contact::Goal);
            }

            accumulator -= PHYSICS_DT;
            substeps += 1;
        }

        for event in session.drain_events() {
            match event {
                GameEvent::Collected { prop_id, tag } => log::debug!("Collected {} prop {}", tag, prop_id),
                GameEvent::StageCompleted { level, position } => {
                    log::info!("Stage {} completed at {:.1}", level + 1, position)
                }
                GameEvent::AllStagesCompleted => log::info!("All stages done, heading for the goal"),
                GameEvent::GameComplete { elapsed, rank } => {
                    log::info!("Finished in {:.2}s with rank {}", elapsed, rank.as_str())
                }
            }
        }

        time += FRAME_DT;
        if time >= next_hud_log {
            log_hud(&session);
            next_hud_log += 1.0;
        }
    }

    if session.progression().phase() != GamePhase::GameOver {
        log::warn!("Gave up after {:.0}s of simulated time", MAX_RUN_SECS);
    }
    log_hud(&session);
    log::info!("Props stuck to the ball: {}", session.props().attached_count());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Fudge Roll (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match GameConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    let settings = args.next().map(Settings::load).unwrap_or_default();

    if let Err(e) = run(config, settings) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

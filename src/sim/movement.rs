//! Camera-relative ball movement
//!
//! Pure math: input axes become a world-space force, mouse movement orbits
//! the camera offset around the ball, and body speed is debounced into a
//! moving/still flag.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_CAMERA_ZOOM, START_MOVING_SPEED, STOP_MOVING_SPEED};
use crate::{UP, flatten_xz};

/// Raw movement axes for one physics tick, each in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveAxes {
    pub horizontal: f32,
    pub vertical: f32,
}

impl MoveAxes {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: horizontal.clamp(-1.0, 1.0),
            vertical: vertical.clamp(-1.0, 1.0),
        }
    }
}

/// Force that rolls the ball relative to where the camera looks
///
/// Forward is the flattened camera-to-ball direction, right is `up × forward`.
/// A camera directly above the ball gives no forward direction and no force.
pub fn movement_force(
    ball_pos: Vec3,
    camera_pos: Vec3,
    axes: MoveAxes,
    move_speed: f32,
    multiplier: f32,
) -> Vec3 {
    let forward = flatten_xz(ball_pos - camera_pos).normalize_or_zero();
    let right = UP.cross(forward);

    let move_x = axes.horizontal * move_speed * multiplier;
    let move_z = axes.vertical * move_speed * multiplier;
    right * move_x + forward * move_z
}

/// Where the camera sits and looks this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Look direction (not normalized)
    pub look_dir: Vec3,
}

/// Third-person camera orbiting the ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitCamera {
    /// Camera position relative to the ball at zoom 1
    pub offset: Vec3,
    /// Degrees of orbit per unit of horizontal mouse delta
    pub sensitivity: f32,
}

impl OrbitCamera {
    pub fn new(offset: Vec3, sensitivity: f32) -> Self {
        Self {
            offset,
            sensitivity,
        }
    }

    /// Rotate the offset around world up by `mouse_dx * sensitivity` degrees
    pub fn orbit(&mut self, mouse_dx: f32) {
        let degrees = mouse_dx * self.sensitivity;
        if degrees != 0.0 {
            self.offset = Quat::from_axis_angle(UP, degrees.to_radians()) * self.offset;
        }
    }

    /// Camera pose for a ball position; bigger multipliers pull the camera
    /// back, up to [`MAX_CAMERA_ZOOM`]
    pub fn pose(&self, ball_pos: Vec3, multiplier: f32) -> CameraPose {
        CameraPose {
            position: ball_pos + self.offset * multiplier.min(MAX_CAMERA_ZOOM),
            look_dir: -self.offset + UP,
        }
    }
}

/// Moving/still flag with a dead band between the two thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionHysteresis {
    moving: bool,
}

impl MotionHysteresis {
    /// Returns the new state when it flips
    pub fn sample(&mut self, speed: f32) -> Option<bool> {
        if !self.moving && speed > START_MOVING_SPEED {
            self.moving = true;
            Some(true)
        } else if self.moving && speed <= STOP_MOVING_SPEED {
            self.moving = false;
            Some(false)
        } else {
            None
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }
}

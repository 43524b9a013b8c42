//! Windup Disc - gameplay core for a wind-up robot and its throwable disc
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (state machines, routines, power chain)
//! - `settings`: Data-driven level configuration
//! - `audio`: Sound vocabulary and looping clip bookkeeping

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{LevelSettings, RecallType, StartingPlace};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (50 Hz)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the simulation will integrate in one call
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Distance at which a moving disc counts as arrived
    pub const ARRIVAL_EPSILON: f32 = 0.01;
    /// Pause between teleports of the simple-rewind recall
    pub const SIMPLE_REWIND_DELAY: f32 = 0.25;

    /// Power floor applied at the start of a level intro walk
    pub const INTRO_MIN_POWER: f32 = 0.30;
    /// Distance at which the intro walk counts as arrived
    pub const INTRO_ARRIVAL: f32 = 0.1;
    /// How long the elevator pulls the player toward its platform
    pub const ELEVATOR_WALK_SECS: f32 = 1.0;
}

/// Position and orientation of anything placed in the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Local +Z axis in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Map a point from local to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Turn around the Y axis so that forward faces `target` (height ignored)
    pub fn look_at_flat(&mut self, target: Vec3) {
        let mut dir = target - self.position;
        dir.y = 0.0;
        if dir.length_squared() > f32::EPSILON {
            self.rotation = Quat::from_rotation_y(yaw_of(dir));
        }
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Interpolate between two angles along the shortest arc
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = normalize_angle(to - from);
    from + delta * t.clamp(0.0, 1.0)
}

/// Yaw (rotation about +Y) that points +Z along `dir`
#[inline]
pub fn yaw_of(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

/// Step `current` toward `target` by at most `max_delta` without overshooting
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let dist = to_target.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + to_target / dist * max_delta
    }
}

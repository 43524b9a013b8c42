//! Frame stepping
//!
//! One host frame runs every fixed physics step that fits into the elapsed
//! time, then a single variable-step pass: player input and power, docked
//! disc tracking, routines, and the exit door. Collision and trigger
//! callbacks may arrive between frames and apply immediately.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::routine;
use super::state::GameState;
use crate::consts::*;

/// Logical input for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Movement axes (x horizontal, y vertical), each in [-1, 1]
    pub movement: Vec2,
    /// Primary action pressed this frame (throw or recall)
    pub action: bool,
    /// Rewind held
    pub rewind: bool,
    /// Pause toggle pressed this frame
    pub pause: bool,
    /// World point under the cursor
    pub aim_target: Option<Vec3>,
}

/// Advance the game by one host frame of `dt` seconds
pub fn frame(state: &mut GameState, input: &FrameInput, dt: f32) {
    if input.pause && !state.level.completed {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
    }
    if state.paused {
        return;
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.accumulator += dt;

    let mut substeps = 0;
    while state.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        fixed_tick(state, SIM_DT);
        state.accumulator -= SIM_DT;
        substeps += 1;
    }
    if substeps == MAX_SUBSTEPS {
        // Drop the backlog rather than spiral
        state.accumulator = state.accumulator.min(SIM_DT);
    }

    frame_update(state, input, dt);
}

/// One fixed physics step
pub fn fixed_tick(state: &mut GameState, dt: f32) {
    state.fixed_update_disc(dt);
    state.fixed_update_player(dt);
}

/// The variable-step pass that follows the physics steps of a frame
pub fn frame_update(state: &mut GameState, input: &FrameInput, dt: f32) {
    state.dt = dt;
    state.time += dt;
    state.frame_count += 1;

    state.update_player(input);
    state.update_disc();
    routine::run_frame(state);
    state.update_exit_door();
}

//! Headless runner
//!
//! Plays a short scripted session in a walled box arena and logs every event
//! the core emits. Usage: `windup-disc [level.json]`, with `RUST_LOG=debug`
//! for state transitions.

use glam::{Vec2, Vec3};

use windup_disc::LevelSettings;
use windup_disc::consts::SIM_DT;
use windup_disc::sim::{DiscState, FrameInput, GameState, PlayerState, frame};

/// Half extent of the demo arena
const ARENA_HALF: f32 = 8.0;
/// Host frame time (60 fps)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Hard stop for the session
const MAX_FRAMES: u32 = 60 * 30;

/// Stand-in for the physics service: bounce the disc off the arena walls
fn arena_collisions(state: &mut GameState) {
    if state.disc.state != DiscState::Flying {
        return;
    }
    let p = state.disc.position();
    let v = state.disc.body.velocity;
    let mut reflected = v;
    if p.x.abs() > ARENA_HALF && p.x * v.x > 0.0 {
        reflected.x = -v.x;
    }
    if p.z.abs() > ARENA_HALF && p.z * v.z > 0.0 {
        reflected.z = -v.z;
    }
    if reflected != v {
        state.disc.body.velocity = reflected;
        state.on_disc_collision();
    }
}

/// Scripted input for frame `n`
fn script(state: &GameState, n: u32) -> FrameInput {
    let mut input = FrameInput {
        aim_target: Some(Vec3::new(4.0, 0.0, 8.0)),
        ..Default::default()
    };
    match state.player.state {
        PlayerState::PoweredOff => input.rewind = true,
        PlayerState::PoweredOn => match state.disc.state {
            // Pick up, then throw, then walk around until it breaks
            DiscState::Dispensed | DiscState::Attached => input.action = n % 30 == 0,
            DiscState::Flying => input.movement = Vec2::new((n as f32 * 0.05).sin(), 0.0),
            _ => {}
        },
        _ => {}
    }
    input
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => LevelSettings::load(path),
        None => LevelSettings::default(),
    };
    log::info!(
        "Windup Disc (headless) starting, recall: {}",
        settings.disc.recall_type.as_str()
    );

    let mut state = GameState::new(settings);
    state.play_game();

    let mut breaks = 0;
    for n in 0..MAX_FRAMES {
        let input = script(&state, n);
        frame(&mut state, &input, FRAME_DT);
        arena_collisions(&mut state);

        for event in state.drain_events() {
            log::info!("[{:>5.2}s] {:?}", state.time, event);
        }
        if state.disc.state == DiscState::Breaking {
            breaks += 1;
        }
        if breaks > 0 && state.disc.state == DiscState::Dispensed {
            break;
        }
    }

    log::info!(
        "Finished after {} frames ({} physics steps/s)",
        state.frame_count,
        (1.0 / SIM_DT).round()
    );
    match serde_json::to_string_pretty(&state.disc) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize disc: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

//! Gameplay simulation
//!
//! All gameplay logic lives here. This module must stay renderer-free:
//! - The host drives it through `frame` plus collision/trigger callbacks
//! - Outbound effects are `GameEvent`s, never direct calls
//! - Multi-frame behavior runs as cancellable routines

pub mod disc;
pub mod elements;
pub mod event;
pub mod hint;
pub mod level;
pub mod path;
pub mod player;
pub mod power;
pub mod routine;
pub mod state;
pub mod tick;

pub use disc::{Disc, DiscLook, DiscState, ElementalState, Mount};
pub use event::{AnimParam, AnimTrigger, GameEvent, Hint, SceneRequest};
pub use path::PathRecorder;
pub use player::{Player, PlayerState};
pub use power::{ChargeStation, PowerStation, Switch, Switchable};
pub use routine::{Owner, Routine, Step, Wait};
pub use state::GameState;
pub use tick::{FrameInput, fixed_tick, frame, frame_update};

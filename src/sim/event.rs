//! Outbound notifications
//!
//! The simulation talks to audio, animation, effects, scene loading and UI
//! only by appending events. The host drains them once per frame; nothing is
//! ever read back.

use serde::{Deserialize, Serialize};

use super::disc::DiscLook;
use crate::audio::{LoopClip, SoundEffect};

/// One-shot animation triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimTrigger {
    Throw,
    Catch,
    Recall,
    PowerDown,
    /// Elevator platform leaves the level
    ElevatorDepart,
}

/// Persistent animation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimParam {
    HasPower,
    IsMoving,
    /// Elevator platform lights
    ElevatorOn,
}

/// Scene changes the core asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneRequest {
    /// Reload the current level
    Reload,
    /// Load the level with this build index
    Advance(u32),
    /// Restart from the very first level
    First,
}

/// On-screen hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    Rewind,
    Throw,
    Recall,
}

/// Something the host should present
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    Loop { clip: LoopClip, playing: bool },
    AnimTrigger(AnimTrigger),
    AnimBool(AnimParam, bool),
    /// Disc trail effect on/off
    Trail(bool),
    /// Disc trail wiped (new flight)
    TrailCleared,
    /// Disc model opaque, faded (recalling) or hidden (broken)
    DiscLook(DiscLook),
    /// Disc emission tint, 0 = uncharged red, 1 = charged green
    DiscEmission(f32),
    /// Fire particles on the disc
    DiscOnFire(bool),
    Scene(SceneRequest),
    Hint(Option<Hint>),
    SwitchVisual { index: usize, is_on: bool },
    /// Torch flame lit or blown out
    Torch { index: usize, is_on: bool },
    ExitDoor { open: bool },
    /// The door the robot walked in through shut behind it
    EntryDoorClosed,
    /// Last level done; roll the credits
    Credits,
}

//! Sound vocabulary for the gameplay core
//!
//! The simulation never plays audio itself. It names what should be heard and
//! the host maps these names to clips.

use serde::{Deserialize, Serialize};

/// One-shot sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Disc bounced off something (index into the bounce clip list)
    Bounce(u32),
    /// Disc ran out of bounces
    DiscBreak,
    /// Disc docked in a powered charge station
    Charging,
    /// Robot finished winding up
    PowerOn,
    /// Robot ran out of power
    PowerOff,
    /// Disc thrown
    Throw,
    /// Disc caught
    Catch,
    /// Disc recalled
    Recall,
    /// Switch flipped on
    SwitchOn,
    /// Switch flipped off
    SwitchOff,
    /// Exit door powered down (opens)
    DoorOff,
}

/// Sounds that loop while a condition holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopClip {
    Walking,
    Rewinding,
    WindingDown,
}

impl LoopClip {
    fn slot(self) -> usize {
        match self {
            LoopClip::Walking => 0,
            LoopClip::Rewinding => 1,
            LoopClip::WindingDown => 2,
        }
    }
}

/// Tracks which looping clips are currently audible
///
/// `set` reports whether anything changed so callers only emit an event on
/// an actual start/pause rather than every frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopingClips {
    playing: [bool; 3],
}

impl LoopingClips {
    pub fn is_playing(&self, clip: LoopClip) -> bool {
        self.playing[clip.slot()]
    }

    /// Start or pause a clip, returning true if its state changed
    pub fn set(&mut self, clip: LoopClip, playing: bool) -> bool {
        let slot = &mut self.playing[clip.slot()];
        if *slot == playing {
            return false;
        }
        *slot = playing;
        true
    }
}

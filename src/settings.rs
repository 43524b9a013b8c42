//! Level settings and tuning
//!
//! Designers author one JSON document per level. Every section is optional;
//! anything left out takes the defaults below.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Transform;

/// How the disc returns to the player on recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecallType {
    /// Fly straight back toward the player's hand
    #[default]
    Simple,
    /// Retrace every bounce in reverse
    Rewind,
    /// Teleport back through every bounce in reverse
    SimpleRewind,
    /// Snap straight into the player's hand
    Immediate,
    /// Any name the game does not know how to recall with
    #[serde(other)]
    Unsupported,
}

impl RecallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecallType::Simple => "Simple",
            RecallType::Rewind => "Rewind",
            RecallType::SimpleRewind => "SimpleRewind",
            RecallType::Immediate => "Immediate",
            RecallType::Unsupported => "Unsupported",
        }
    }
}

/// Where the disc sits when the level loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StartingPlace {
    #[default]
    Dispenser,
    ChargingStation,
    PowerStation,
}

/// Disc tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscSettings {
    /// Flight speed (units/s)
    pub speed: f32,
    /// Speed while retracing bounces on a rewind recall
    pub recall_speed: f32,
    /// Speed while flying straight back on a simple recall
    pub return_speed: f32,
    /// Bounces survived before the disc breaks
    pub max_bounces: u32,
    /// Number of distinct bounce clips available
    pub bounce_sounds: u32,
    /// Seconds to charge from empty to full (1..=3)
    pub charging_time: f32,
    pub recall_type: RecallType,
    pub starting_place: StartingPlace,
    /// Disc starts the level fully charged
    pub starts_charged: bool,
}

impl Default for DiscSettings {
    fn default() -> Self {
        Self {
            speed: 20.0,
            recall_speed: 75.0,
            return_speed: 50.0,
            max_bounces: 5,
            bounce_sounds: 3,
            charging_time: 1.0,
            recall_type: RecallType::Simple,
            starting_place: StartingPlace::Dispenser,
            starts_charged: false,
        }
    }
}

/// Player tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Walking speed (units/s)
    pub move_speed: f32,
    /// How fast the robot turns toward its movement direction
    pub turn_rate: f32,
    /// Seconds to wind up from empty to full
    pub rewind_seconds: f32,
    /// Seconds to wind down from full to empty
    pub unwind_seconds: f32,
    pub power_on_delay: f32,
    /// Delay between the throw animation and the disc leaving the hand
    pub launch_delay: f32,
    /// Time for the throw animation to finish before control returns
    pub throw_delay: f32,
    pub catch_delay: f32,
    /// Hand position relative to the robot
    pub holder_offset: Vec3,
    /// Where a thrown disc spawns relative to the robot
    pub launch_offset: Vec3,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            turn_rate: 15.0,
            rewind_seconds: 2.0,
            unwind_seconds: 30.0,
            power_on_delay: 0.20,
            launch_delay: 0.25,
            throw_delay: 1.0,
            catch_delay: 0.25,
            holder_offset: Vec3::new(0.4, 1.0, 0.3),
            launch_offset: Vec3::new(0.0, 1.0, 1.0),
        }
    }
}

/// Per-level progression and layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelInfo {
    /// Build index of this level (0 = first)
    pub index: u32,
    /// Number of levels in the game
    pub count: u32,
    /// Charge state the disc respawns with after breaking
    pub charged_on_break: bool,
    pub player_start: Vec3,
    /// Where the intro walk ends
    pub player_end: Vec3,
    /// Seconds a hint condition must hold before the hint shows
    pub hint_reveal_delay: f32,
}

impl Default for LevelInfo {
    fn default() -> Self {
        Self {
            index: 0,
            count: 1,
            charged_on_break: false,
            player_start: Vec3::ZERO,
            player_end: Vec3::new(0.0, 0.0, 2.0),
            hint_reveal_delay: 3.0,
        }
    }
}

/// A charge station placement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeStationSettings {
    pub mount: Transform,
    pub powered: bool,
}

/// A power station placement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerStationSettings {
    pub mount: Transform,
    pub powered: bool,
}

/// Single-press switches latch; toggles flip every press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SwitchKind {
    #[default]
    SinglePress,
    Toggle,
}

/// Something a switch drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchTargetRef {
    ChargeStation,
    /// Index into `LevelSettings::switch_targets`
    Target(usize),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchSettings {
    pub kind: SwitchKind,
    pub is_on: bool,
    pub targets: Vec<SwitchTargetRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindSettings {
    /// Direction the wind blows
    pub direction: Vec3,
    pub push_power: f32,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            direction: Vec3::Z,
            push_power: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchSettings {
    pub is_on: bool,
}

impl Default for TorchSettings {
    fn default() -> Self {
        Self { is_on: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevatorSettings {
    /// Where the player is pulled to once aboard
    pub target: Vec3,
    /// Seconds of the rising animation before the level reloads
    pub rising_time: f32,
}

impl Default for ElevatorSettings {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            rising_time: 1.0,
        }
    }
}

/// Complete level description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub disc: DiscSettings,
    pub player: PlayerSettings,
    pub level: LevelInfo,
    /// Disc dispenser mount point
    pub dispenser: Transform,
    pub charge_station: Option<ChargeStationSettings>,
    pub power_station: Option<PowerStationSettings>,
    pub switches: Vec<SwitchSettings>,
    /// Initial on/off state of each generic switch target
    pub switch_targets: Vec<bool>,
    pub winds: Vec<WindSettings>,
    pub torches: Vec<TorchSettings>,
    pub elevator: Option<ElevatorSettings>,
    /// Level has an exit door wired to the power station
    pub exit_door: bool,
}

impl LevelSettings {
    /// Parse a level document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a level document from disk, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded level settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Invalid level settings in {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Could not read {}: {err} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Charging time clamped to the supported range
    pub fn charging_time(&self) -> f32 {
        self.disc.charging_time.clamp(1.0, 3.0)
    }
}

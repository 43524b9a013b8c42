//! Game state and the routine host
//!
//! `GameState` owns every entity of a loaded level and wires them together:
//! stations and the scheduler are built first, then the disc and the player.
//! Entities never look each other up; all cross-entity behavior goes through
//! methods on `GameState`.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::disc::{Disc, DiscRoutine, DiscState, Mount};
use super::elements::{Torch, WindVolume};
use super::event::{AnimParam, AnimTrigger, GameEvent, Hint};
use super::hint::HintRoutine;
use super::level::{LevelProgress, LevelRoutine};
use super::player::{Player, PlayerRoutine, PlayerState};
use super::power::{ChargeStation, ExitDoor, PowerStation, Switch, SwitchTarget, Switchable};
use super::routine::{self, Owner, Routine, RoutineHost, Scheduler, Step, Ticket};
use crate::Transform;
use crate::audio::{LoopClip, SoundEffect};
use crate::settings::{ElevatorSettings, LevelSettings, RecallType, StartingPlace};

/// Minimal rigid body: the external physics service owns collisions, the
/// core only sets velocities and reads positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Body {
    pub transform: Transform,
    pub velocity: Vec3,
    /// Collisions and trigger volumes only report while this is set
    pub detect_collisions: bool,
}

impl Body {
    pub fn at(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn halt(&mut self) {
        self.detect_collisions = false;
        self.velocity = Vec3::ZERO;
    }

    /// Advance position by current velocity
    pub fn integrate(&mut self, dt: f32) {
        self.transform.position += self.velocity * dt;
    }
}

/// Every routine the game runs
#[derive(Debug)]
pub enum Behavior {
    Disc(DiscRoutine),
    Player(PlayerRoutine),
    Level(LevelRoutine),
    Hint(HintRoutine),
}

impl Routine<GameState> for Behavior {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        match self {
            Behavior::Disc(r) => r.resume(ctx),
            Behavior::Player(r) => r.resume(ctx),
            Behavior::Level(r) => r.resume(ctx),
            Behavior::Hint(r) => r.resume(ctx),
        }
    }
}

/// Complete state of one loaded level
#[derive(Debug)]
pub struct GameState {
    pub settings: LevelSettings,
    pub disc: Disc,
    pub player: Player,
    /// Disc dispenser mount point
    pub dispenser: Transform,
    pub charge_station: Option<ChargeStation>,
    pub power_station: Option<PowerStation>,
    pub switches: Vec<Switch>,
    pub switch_targets: Vec<SwitchTarget>,
    pub winds: Vec<WindVolume>,
    pub torches: Vec<Torch>,
    pub exit_door: Option<ExitDoor>,
    pub elevator: Option<ElevatorSettings>,
    pub level: LevelProgress,
    /// Camera orientation; movement input is relative to it
    pub camera: Quat,
    pub paused: bool,
    /// Hint currently on screen
    pub hint: Option<Hint>,
    /// Seconds of unpaused frame time
    pub time: f32,
    pub frame_count: u64,
    /// Outbound notifications since the last drain
    pub events: Vec<GameEvent>,
    pub(crate) dt: f32,
    pub(crate) accumulator: f32,
    level_generation: u32,
    hint_generations: [u32; 3],
    scheduler: Scheduler<GameState, Behavior>,
}

impl GameState {
    /// Build a level from its settings
    pub fn new(settings: LevelSettings) -> Self {
        let settings = validate(settings);

        let charge_station = settings
            .charge_station
            .as_ref()
            .map(|s| ChargeStation::new(s.mount, s.powered));
        let power_station = settings
            .power_station
            .as_ref()
            .map(|s| PowerStation::new(s.mount, s.powered));

        let mut state = Self {
            dispenser: settings.dispenser,
            charge_station,
            power_station,
            switches: settings.switches.iter().map(Switch::from_settings).collect(),
            switch_targets: settings
                .switch_targets
                .iter()
                .map(|&is_on| SwitchTarget { is_on })
                .collect(),
            winds: settings.winds.iter().map(WindVolume::from_settings).collect(),
            torches: settings
                .torches
                .iter()
                .map(|t| Torch { is_on: t.is_on })
                .collect(),
            exit_door: None,
            elevator: settings.elevator.clone(),
            level: LevelProgress::from_settings(&settings.level),
            camera: Quat::IDENTITY,
            paused: false,
            hint: None,
            time: 0.0,
            frame_count: 0,
            events: Vec::new(),
            dt: 0.0,
            accumulator: 0.0,
            level_generation: 0,
            hint_generations: [0; 3],
            scheduler: Scheduler::default(),
            disc: Disc::new(),
            player: Player::new(&settings.player, settings.level.player_start),
            settings,
        };

        // Switches push their designer-chosen state before anything docks
        for i in 0..state.switches.len() {
            let targets = state.switches[i].targets.clone();
            let is_on = state.switches[i].is_on;
            state.fan_out(&targets, is_on);
        }

        if state.settings.exit_door {
            let powered = state
                .power_station
                .as_ref()
                .is_some_and(PowerStation::is_powered_on);
            state.exit_door = Some(ExitDoor {
                station_powered: powered,
            });
        }

        state.place_disc();
        state.change_player_state(PlayerState::Disabled);
        state.start_hints();

        log::info!(
            "Level {} ready (recall: {})",
            state.level.index,
            state.settings.disc.recall_type.as_str()
        );
        state
    }

    fn place_disc(&mut self) {
        let charged = self.settings.disc.starts_charged;
        self.set_disc_charged(charged);

        match self.settings.disc.starting_place {
            StartingPlace::Dispenser => self.change_disc_state(DiscState::Dispensed),
            StartingPlace::ChargingStation => {
                if let Some(station) = self.charge_station.as_mut() {
                    station.set_state(charged);
                }
                self.change_disc_state(DiscState::Charging);
            }
            StartingPlace::PowerStation => self.change_disc_state(DiscState::Connected),
        }
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current world transform of a mount point, if the level has it
    pub fn mount_transform(&self, mount: Mount) -> Option<Transform> {
        match mount {
            Mount::Player => Some(self.player.mount_point()),
            Mount::Dispenser => Some(self.dispenser),
            Mount::ChargeStation => self.charge_station.as_ref().map(|s| s.mount),
            Mount::PowerStation => self.power_station.as_ref().map(|s| s.mount),
        }
    }

    /// Number of routines parked for `owner`
    pub fn routines_for(&self, owner: Owner) -> usize {
        self.scheduler.count_for(owner)
    }

    pub(crate) fn start_routine(&mut self, owner: Owner, behavior: Behavior) {
        routine::start(self, owner, behavior);
    }

    pub(crate) fn play(&mut self, sound: SoundEffect) {
        self.events.push(GameEvent::Sound(sound));
    }

    pub(crate) fn trigger(&mut self, trigger: AnimTrigger) {
        self.events.push(GameEvent::AnimTrigger(trigger));
    }

    pub(crate) fn anim_bool(&mut self, param: AnimParam, value: bool) {
        self.events.push(GameEvent::AnimBool(param, value));
    }

    /// Start or pause one of the player's looping clips
    pub(crate) fn set_loop(&mut self, clip: LoopClip, playing: bool) {
        if self.player.loops.set(clip, playing) {
            self.events.push(GameEvent::Loop { clip, playing });
        }
    }

    pub(crate) fn show_hint(&mut self, hint: Option<Hint>) {
        if self.hint != hint {
            self.hint = hint;
            self.events.push(GameEvent::Hint(hint));
        }
    }
}

/// Log configuration problems and fall back to something playable
fn validate(mut settings: LevelSettings) -> LevelSettings {
    if settings.disc.bounce_sounds == 0 {
        log::error!("Disc has no bounce sounds configured - bounces will be silent");
    }
    if settings.disc.recall_type == RecallType::Unsupported {
        log::error!("Disc recall type has no recall routine - recalls will do nothing");
    }
    match settings.disc.starting_place {
        StartingPlace::ChargingStation if settings.charge_station.is_none() => {
            log::error!("Disc starts in a charge station but the level has none");
            settings.disc.starting_place = StartingPlace::Dispenser;
        }
        StartingPlace::PowerStation if settings.power_station.is_none() => {
            log::error!("Disc starts in a power station but the level has none");
            settings.disc.starting_place = StartingPlace::Dispenser;
        }
        _ => {}
    }
    if settings.level.count == 0 {
        log::warn!("Level count of zero - treating this as the only level");
        settings.level.count = 1;
    }
    settings
}

impl RoutineHost for GameState {
    type Routine = Behavior;

    fn scheduler_mut(&mut self) -> &mut Scheduler<Self, Behavior> {
        &mut self.scheduler
    }

    fn issue_ticket(&mut self, owner: Owner) -> Ticket {
        let slot = match owner {
            Owner::Disc => &mut self.disc.generation,
            Owner::Player => &mut self.player.generation,
            Owner::Level => &mut self.level_generation,
            Owner::Hint(i) => &mut self.hint_generations[usize::from(i) % 3],
        };
        *slot = slot.wrapping_add(1);
        Ticket {
            owner,
            generation: *slot,
        }
    }

    fn is_live(&self, ticket: Ticket) -> bool {
        let current = match ticket.owner {
            Owner::Disc => self.disc.generation,
            Owner::Player => self.player.generation,
            Owner::Level => self.level_generation,
            Owner::Hint(i) => self.hint_generations[usize::from(i) % 3],
        };
        current == ticket.generation
    }

    fn frame_dt(&self) -> f32 {
        self.dt
    }

    fn frame_index(&self) -> u64 {
        self.frame_count
    }
}

//! Level progression
//!
//! Completion, advancing to the next scene, rewinding to the first level and
//! the elevator exit. Scene loading itself belongs to the host; the core only
//! asks for it and refuses to ask twice.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::event::{AnimParam, AnimTrigger, GameEvent, SceneRequest};
use super::player::PlayerState;
use super::routine::{Owner, Routine, Step, Wait};
use super::state::{Behavior, GameState};
use crate::audio::SoundEffect;
use crate::consts::ELEVATOR_WALK_SECS;
use crate::move_towards;
use crate::settings::LevelInfo;

/// Where the game stands in its sequence of levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgress {
    pub index: u32,
    pub count: u32,
    pub completed: bool,
    /// A scene request or the arrival that follows it is outstanding
    pub scene_loading: bool,
    /// Request the host has not yet reported as loaded
    pub pending_scene: Option<SceneRequest>,
    pub charged_on_break: bool,
    pub start: Vec3,
    pub end: Vec3,
}

impl LevelProgress {
    pub fn from_settings(info: &LevelInfo) -> Self {
        Self {
            index: info.index,
            count: info.count.max(1),
            completed: false,
            scene_loading: false,
            pending_scene: None,
            charged_on_break: info.charged_on_break,
            start: info.player_start,
            end: info.player_end,
        }
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.count
    }
}

impl GameState {
    /// Main menu "play": hand the robot to the player, unpowered
    pub fn play_game(&mut self) {
        self.change_player_state(PlayerState::PoweredOff);
    }

    /// Walk the robot in from this level's start to its end point
    pub fn begin_level_intro(&mut self) {
        let (start, end) = (self.level.start, self.level.end);
        self.start_level_intro(start, end);
    }

    /// Player reached the level-completion volume
    pub fn on_player_enter_level_end(&mut self) {
        if self.player.updates_disabled() {
            return;
        }
        self.level.completed = true;
        if self.level.scene_loading {
            return;
        }
        log::info!("Level {} completed", self.level.index);
        self.change_player_state(PlayerState::LevelCompleted);

        if self.level.is_last() {
            self.events.push(GameEvent::Credits);
            self.change_player_state(PlayerState::GameCompleted);
        } else {
            let next = self.level.index + 1;
            self.request_scene(SceneRequest::Advance(next));
        }
    }

    /// Restart from the first level
    pub fn rewind_game(&mut self) {
        if self.level.scene_loading {
            return;
        }
        self.request_scene(SceneRequest::First);
        self.change_player_state(PlayerState::GameRewinded);
    }

    fn request_scene(&mut self, request: SceneRequest) {
        self.level.scene_loading = true;
        self.level.pending_scene = Some(request);
        self.events.push(GameEvent::Scene(request));
    }

    /// Host finished loading the scene described by `info`
    ///
    /// After an advance the robot walks in and the entry closes behind it
    /// before another scene can be requested.
    pub fn scene_loaded(&mut self, info: &LevelInfo) {
        let request = self.level.pending_scene.take();
        log::info!("Scene loaded: level {} ({request:?})", info.index);
        self.settings.level = info.clone();
        self.level = LevelProgress::from_settings(info);

        match request {
            Some(SceneRequest::Advance(_)) => {
                self.level.scene_loading = true;
                self.start_routine(
                    Owner::Level,
                    Behavior::Level(LevelRoutine::Arrival(ArrivalStage::Intro)),
                );
            }
            Some(SceneRequest::First) => {
                let mut start = self.level.start;
                start.y = self.player.body.position().y;
                self.player.body.transform.position = start;
            }
            Some(SceneRequest::Reload) | None => {}
        }
        self.start_hints();
    }

    /// Player stepped onto the elevator platform
    pub fn on_player_enter_elevator(&mut self) {
        if self.elevator.is_none() {
            log::error!("Player entered an elevator that is not part of this level");
            return;
        }
        self.start_routine(
            Owner::Level,
            Behavior::Level(LevelRoutine::Elevator(ElevatorStage::Board)),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalStage {
    Intro,
    CloseEntry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElevatorStage {
    Board,
    Pull { remaining: f32 },
    Rise,
    Leave,
}

/// Routines the level runs
#[derive(Debug)]
pub enum LevelRoutine {
    /// Walk-in after a level advance
    Arrival(ArrivalStage),
    Elevator(ElevatorStage),
}

impl Routine<GameState> for LevelRoutine {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        match self {
            LevelRoutine::Arrival(stage) => arrival_step(stage, ctx),
            LevelRoutine::Elevator(stage) => elevator_step(stage, ctx),
        }
    }
}

fn intro_finished(ctx: &GameState) -> bool {
    ctx.player.state == PlayerState::PoweredOn
}

fn arrival_step(stage: &mut ArrivalStage, ctx: &mut GameState) -> Step<GameState> {
    match *stage {
        ArrivalStage::Intro => {
            ctx.begin_level_intro();
            *stage = ArrivalStage::CloseEntry;
            Step::Yield(Wait::Until(intro_finished))
        }
        ArrivalStage::CloseEntry => {
            ctx.play(SoundEffect::DoorOff);
            ctx.events.push(GameEvent::EntryDoorClosed);
            ctx.level.scene_loading = false;
            Step::Done
        }
    }
}

fn elevator_step(stage: &mut ElevatorStage, ctx: &mut GameState) -> Step<GameState> {
    let Some(elevator) = ctx.elevator.clone() else {
        return Step::Done;
    };
    match *stage {
        ElevatorStage::Board => {
            ctx.anim_bool(AnimParam::ElevatorOn, true);
            ctx.change_player_state(PlayerState::LevelCompleted);
            *stage = ElevatorStage::Pull {
                remaining: ELEVATOR_WALK_SECS,
            };
            Step::Yield(Wait::NextFrame)
        }
        ElevatorStage::Pull { remaining } => {
            if remaining <= 0.0 {
                *stage = ElevatorStage::Rise;
                return elevator_step(stage, ctx);
            }
            let step = ctx.settings.player.move_speed * ctx.dt;
            let position = ctx.player.body.position();
            ctx.player.body.transform.position = move_towards(position, elevator.target, step);
            *stage = ElevatorStage::Pull {
                remaining: remaining - ctx.dt,
            };
            Step::Yield(Wait::NextFrame)
        }
        ElevatorStage::Rise => {
            ctx.trigger(AnimTrigger::ElevatorDepart);
            *stage = ElevatorStage::Leave;
            Step::Yield(Wait::Seconds(elevator.rising_time))
        }
        ElevatorStage::Leave => {
            ctx.events.push(GameEvent::Scene(SceneRequest::Reload));
            Step::Done
        }
    }
}

//! Player state machine
//!
//! The wind-up robot. Power winds down continuously and is wound back up by
//! holding rewind while idle. Throwing, recalling, catching, powering on and
//! the level intro are player-owned routines; any state change cancels the
//! one in flight.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::disc::DiscState;
use super::event::{AnimParam, AnimTrigger};
use super::routine::{Owner, Routine, RoutineHost, Step, Wait};
use super::state::{Behavior, Body, GameState};
use super::tick::FrameInput;
use crate::audio::{LoopClip, LoopingClips, SoundEffect};
use crate::consts::{INTRO_ARRIVAL, INTRO_MIN_POWER};
use crate::settings::PlayerSettings;
use crate::{Transform, lerp_angle, move_towards, yaw_of};

/// Player states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// Waiting for the game to start
    Disabled,
    PoweredOff,
    PoweringOn,
    PoweredOn,
    Throwing,
    Recalling,
    BatteryCaught,
    LevelCompleted,
    GameCompleted,
    /// Sent back to the first level; resolves to PoweredOff on entry
    GameRewinded,
}

/// The wind-up robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub state: PlayerState,
    /// Wind-up power in [0, 1]
    pub power: f32,
    pub inputs_disabled: bool,
    pub body: Body,
    /// Current facing angle about +Y
    pub yaw: f32,
    /// Movement input captured this frame (x lateral, z forward)
    pub movement: Vec3,
    /// Whether a flying disc entering the catch volume is caught
    pub catch_trigger_enabled: bool,
    /// World point the robot aims throws at
    pub aim_target: Option<Vec3>,
    pub loops: LoopingClips,
    pub is_moving: bool,
    holder_offset: Vec3,
    launch_offset: Vec3,
    #[serde(skip)]
    pub(crate) generation: u32,
}

impl Player {
    pub fn new(settings: &PlayerSettings, start: Vec3) -> Self {
        Self {
            state: PlayerState::Disabled,
            power: 0.0,
            inputs_disabled: true,
            body: Body::at(start),
            yaw: 0.0,
            movement: Vec3::ZERO,
            catch_trigger_enabled: false,
            aim_target: None,
            loops: LoopingClips::default(),
            is_moving: false,
            holder_offset: settings.holder_offset,
            launch_offset: settings.launch_offset,
            generation: 0,
        }
    }

    pub fn is_powered_on(&self) -> bool {
        self.power > 0.0
            && !matches!(self.state, PlayerState::PoweredOff | PlayerState::PoweringOn)
    }

    /// States in which the robot neither reads input nor winds down
    pub fn updates_disabled(&self) -> bool {
        matches!(
            self.state,
            PlayerState::Disabled
                | PlayerState::GameCompleted
                | PlayerState::GameRewinded
                | PlayerState::LevelCompleted
        )
    }

    /// Where a held disc sits
    pub fn mount_point(&self) -> Transform {
        let t = &self.body.transform;
        Transform {
            position: t.transform_point(self.holder_offset),
            rotation: t.rotation,
        }
    }

    /// Where a thrown disc leaves the hand
    pub fn launch_point(&self) -> Vec3 {
        self.body.transform.transform_point(self.launch_offset)
    }

    pub fn forward(&self) -> Vec3 {
        self.body.transform.forward()
    }

    /// Turn to face `target` on the ground plane
    pub fn face(&mut self, target: Vec3) {
        let mut dir = target - self.body.position();
        dir.y = 0.0;
        if dir.length_squared() > f32::EPSILON {
            self.yaw = yaw_of(dir);
            self.body.transform.rotation = Quat::from_rotation_y(self.yaw);
        }
    }
}

impl GameState {
    /// Move the player into `state` and apply its entry side effects
    pub fn change_player_state(&mut self, state: PlayerState) {
        log::debug!("Player {:?} -> {:?}", self.player.state, state);
        self.player.state = state;
        self.issue_ticket(Owner::Player);
        self.set_loop(LoopClip::Walking, false);

        match state {
            PlayerState::PoweredOff | PlayerState::GameCompleted => {
                self.player.inputs_disabled = true;
                self.player.catch_trigger_enabled = false;
                self.anim_bool(AnimParam::HasPower, false);
                self.set_moving(false);
                if state == PlayerState::GameCompleted {
                    self.trigger(AnimTrigger::PowerDown);
                }
                // A catch cut short still leaves the disc in hand
                if self.disc.state == DiscState::Caught {
                    self.change_disc_state(DiscState::Attached);
                }
            }
            PlayerState::PoweringOn => {
                self.start_routine(
                    Owner::Player,
                    Behavior::Player(PlayerRoutine::PoweringOn { waited: false }),
                );
            }
            PlayerState::PoweredOn => {
                self.player.inputs_disabled = false;
                self.anim_bool(AnimParam::HasPower, true);
            }
            PlayerState::Throwing => {
                self.start_routine(
                    Owner::Player,
                    Behavior::Player(PlayerRoutine::Throw(ThrowStage::Aim)),
                );
            }
            PlayerState::Recalling => {
                self.start_routine(
                    Owner::Player,
                    Behavior::Player(PlayerRoutine::Recall(RecallStage::Start)),
                );
            }
            PlayerState::LevelCompleted => self.player.inputs_disabled = true,
            PlayerState::GameRewinded => {
                self.player.power = 0.0;
                let mut start = self.level.start;
                start.y = self.player.body.position().y;
                self.player.body.transform.position = start;
                self.change_player_state(PlayerState::PoweredOff);
            }
            PlayerState::Disabled | PlayerState::BatteryCaught => {}
        }
    }

    fn set_moving(&mut self, moving: bool) {
        if self.player.is_moving != moving {
            self.player.is_moving = moving;
            self.anim_bool(AnimParam::IsMoving, moving);
        }
    }

    /// Frame work for the player: power model and input
    pub(crate) fn update_player(&mut self, input: &FrameInput) {
        if self.player.updates_disabled() {
            return;
        }
        self.player.movement = Vec3::ZERO;
        self.player.aim_target = input.aim_target.or(self.player.aim_target);

        match self.player.state {
            PlayerState::PoweredOff => {
                if input.rewind {
                    self.rewind();
                } else {
                    self.unwind();
                }
            }
            PlayerState::PoweredOn => {
                let movement = movement_vector(input.movement);
                self.player.movement = movement;
                self.set_loop(LoopClip::Walking, movement.x != 0.0);

                if movement == Vec3::ZERO && !input.action && input.rewind {
                    self.rewind();
                } else {
                    self.unwind();
                }

                if self.player.state != PlayerState::PoweredOn {
                    return;
                }

                if input.action {
                    match self.disc.state {
                        DiscState::Dispensed | DiscState::Charged | DiscState::Flying => {
                            self.change_player_state(PlayerState::Recalling);
                        }
                        DiscState::Attached => self.change_player_state(PlayerState::Throwing),
                        _ => {}
                    }
                }
            }
            _ => self.unwind(),
        }

        let moving = self.player.movement.x != 0.0;
        self.set_moving(moving);
    }

    /// Wind up: gain power while rewind is held
    fn rewind(&mut self) {
        self.set_loop(LoopClip::WindingDown, false);
        let full = self.player.power >= 1.0;
        self.set_loop(LoopClip::Rewinding, !full);

        let rate = 1.0 / self.settings.player.rewind_seconds;
        self.player.power = (self.player.power + rate * self.dt).min(1.0);
        if self.player.power >= 1.0 && self.player.state == PlayerState::PoweredOff {
            self.change_player_state(PlayerState::PoweringOn);
        }
    }

    /// Wind down: lose power; running out powers the robot off
    fn unwind(&mut self) {
        self.set_loop(LoopClip::Rewinding, false);
        let empty = self.player.power <= 0.0;
        self.set_loop(LoopClip::WindingDown, !empty);

        let rate = 1.0 / self.settings.player.unwind_seconds;
        self.player.power = (self.player.power - rate * self.dt).max(0.0);
        if self.player.power <= 0.0 && self.player.state != PlayerState::PoweredOff {
            self.trigger(AnimTrigger::PowerDown);
            self.play(SoundEffect::PowerOff);
            self.change_player_state(PlayerState::PoweredOff);
        }
    }

    /// Physics-step work for the player: turn and walk
    pub(crate) fn fixed_update_player(&mut self, dt: f32) {
        if self.player.updates_disabled()
            || self.player.inputs_disabled
            || self.player.state != PlayerState::PoweredOn
        {
            return;
        }
        let movement = self.player.movement;
        if movement == Vec3::ZERO {
            return;
        }

        let target = movement.x.atan2(movement.z);
        let turn = self.settings.player.turn_rate * dt;
        self.player.yaw = lerp_angle(self.player.yaw, target, turn);
        self.player.body.transform.rotation = Quat::from_rotation_y(self.player.yaw);

        // Only the lateral axis translates the robot
        let mut dir = self.camera * Vec3::new(movement.x, 0.0, 0.0);
        dir.y = 0.0;
        self.player.body.transform.position += dir * self.settings.player.move_speed * dt;
    }

    /// Start the catch sequence, optionally turning to the disc first
    pub fn trigger_catching(&mut self, look_at_disc: bool) {
        self.start_routine(
            Owner::Player,
            Behavior::Player(PlayerRoutine::Catch {
                look_at_disc,
                stage: CatchStage::Start,
            }),
        );
    }

    /// Warp to `start` and walk to `end`, then hand over control
    pub fn start_level_intro(&mut self, start: Vec3, end: Vec3) {
        self.start_routine(
            Owner::Player,
            Behavior::Player(PlayerRoutine::LevelIntro {
                start,
                end,
                stage: IntroStage::Warp,
            }),
        );
    }

    /// Aim ray of the next throw (origin, direction) while the disc is in hand
    pub fn throw_preview(&self) -> Option<(Vec3, Vec3)> {
        if self.player.inputs_disabled
            || self.player.state != PlayerState::PoweredOn
            || self.disc.state != DiscState::Attached
        {
            return None;
        }
        let position = self.player.body.position();
        let start = Vec3::new(position.x, self.player.launch_point().y, position.z);
        let mut direction = match self.player.aim_target {
            Some(target) => target - position,
            None => self.player.forward(),
        };
        direction.y = 0.0;
        let direction = direction.try_normalize()?;
        Some((start, direction))
    }
}

fn movement_vector(axis: Vec2) -> Vec3 {
    Vec3::new(axis.x, 0.0, axis.y)
}

fn has_power(ctx: &GameState) -> bool {
    ctx.player.power > 0.0
}

fn recall_settled(ctx: &GameState) -> bool {
    !ctx.player.is_powered_on() || ctx.disc.state == DiscState::Attached
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowStage {
    Aim,
    Animate,
    Launch,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallStage {
    Start,
    FaceDisc,
    Animate,
    Announce,
    Arrive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchStage {
    Start,
    Extend,
    Secure,
    Settle,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroStage {
    Warp,
    Walk,
    Arrive,
}

/// Routines the player runs
#[derive(Debug)]
pub enum PlayerRoutine {
    PoweringOn { waited: bool },
    Throw(ThrowStage),
    Recall(RecallStage),
    Catch { look_at_disc: bool, stage: CatchStage },
    LevelIntro { start: Vec3, end: Vec3, stage: IntroStage },
}

impl Routine<GameState> for PlayerRoutine {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        match self {
            PlayerRoutine::PoweringOn { waited } => {
                if !*waited {
                    *waited = true;
                    ctx.play(SoundEffect::PowerOn);
                    ctx.anim_bool(AnimParam::HasPower, true);
                    return Step::Yield(Wait::Seconds(ctx.settings.player.power_on_delay));
                }
                ctx.change_player_state(PlayerState::PoweredOn);
                Step::Done
            }
            PlayerRoutine::Throw(stage) => throw_step(stage, ctx),
            PlayerRoutine::Recall(stage) => recall_step(stage, ctx),
            PlayerRoutine::Catch {
                look_at_disc,
                stage,
            } => catch_step(*look_at_disc, stage, ctx),
            PlayerRoutine::LevelIntro { start, end, stage } => intro_step(*start, *end, stage, ctx),
        }
    }
}

fn throw_step(stage: &mut ThrowStage, ctx: &mut GameState) -> Step<GameState> {
    match *stage {
        ThrowStage::Aim => {
            if let Some(target) = ctx.player.aim_target {
                ctx.player.face(target);
            }
            *stage = ThrowStage::Animate;
            Step::Yield(Wait::NextFrame)
        }
        ThrowStage::Animate => {
            ctx.play(SoundEffect::Throw);
            ctx.trigger(AnimTrigger::Throw);
            *stage = ThrowStage::Launch;
            Step::Yield(Wait::Seconds(ctx.settings.player.launch_delay))
        }
        ThrowStage::Launch => {
            if !has_power(ctx) {
                return Step::Done;
            }
            ctx.change_disc_state(DiscState::Fired);
            *stage = ThrowStage::Finish;
            Step::Yield(Wait::Seconds(ctx.settings.player.throw_delay))
        }
        ThrowStage::Finish => {
            if has_power(ctx) {
                ctx.player.catch_trigger_enabled = true;
                ctx.change_player_state(PlayerState::PoweredOn);
            }
            Step::Done
        }
    }
}

fn recall_step(stage: &mut RecallStage, ctx: &mut GameState) -> Step<GameState> {
    match *stage {
        RecallStage::Start => {
            ctx.player.catch_trigger_enabled = false;
            ctx.change_disc_state(DiscState::Recalled);
            *stage = RecallStage::FaceDisc;
            Step::Yield(Wait::NextFrame)
        }
        RecallStage::FaceDisc => {
            let target = ctx.disc.position();
            ctx.player.face(target);
            *stage = RecallStage::Animate;
            Step::Yield(Wait::NextFrame)
        }
        RecallStage::Animate => {
            ctx.trigger(AnimTrigger::Recall);
            *stage = RecallStage::Announce;
            Step::Yield(Wait::NextFrame)
        }
        RecallStage::Announce => {
            if ctx.player.is_powered_on() {
                ctx.play(SoundEffect::Recall);
            }
            *stage = RecallStage::Arrive;
            Step::Yield(Wait::Until(recall_settled))
        }
        RecallStage::Arrive => {
            if ctx.player.is_powered_on() {
                ctx.trigger_catching(false);
            }
            Step::Done
        }
    }
}

fn catch_step(look_at_disc: bool, stage: &mut CatchStage, ctx: &mut GameState) -> Step<GameState> {
    loop {
        match *stage {
            CatchStage::Start => {
                ctx.player.catch_trigger_enabled = false;
                *stage = CatchStage::Extend;
                if look_at_disc {
                    let target = ctx.disc.position();
                    ctx.player.face(target);
                    return Step::Yield(Wait::NextFrame);
                }
            }
            CatchStage::Extend => {
                ctx.trigger(AnimTrigger::Catch);
                *stage = CatchStage::Secure;
                return Step::Yield(Wait::NextFrame);
            }
            CatchStage::Secure => {
                *stage = CatchStage::Settle;
                if ctx.disc.state != DiscState::Attached {
                    ctx.change_disc_state(DiscState::Attached);
                    return Step::Yield(Wait::NextFrame);
                }
            }
            CatchStage::Settle => {
                *stage = CatchStage::Finish;
                if ctx.player.is_powered_on() {
                    ctx.play(SoundEffect::Catch);
                    return Step::Yield(Wait::Seconds(ctx.settings.player.catch_delay));
                }
            }
            CatchStage::Finish => {
                if ctx.player.is_powered_on() {
                    ctx.change_player_state(PlayerState::PoweredOn);
                }
                return Step::Done;
            }
        }
    }
}

fn intro_step(
    start: Vec3,
    end: Vec3,
    stage: &mut IntroStage,
    ctx: &mut GameState,
) -> Step<GameState> {
    let height = ctx.player.body.position().y;
    let end = Vec3::new(end.x, height, end.z);
    match *stage {
        IntroStage::Warp => {
            ctx.anim_bool(AnimParam::HasPower, true);
            ctx.set_moving(true);
            ctx.player.power = ctx.player.power.max(INTRO_MIN_POWER);
            ctx.player.body.halt();
            ctx.player.body.transform.position = Vec3::new(start.x, height, start.z);
            *stage = IntroStage::Walk;
            Step::Yield(Wait::NextFrame)
        }
        IntroStage::Walk => {
            let position = ctx.player.body.position();
            if position.distance(end) > INTRO_ARRIVAL {
                let step = ctx.settings.player.move_speed * ctx.dt;
                ctx.player.body.transform.position = move_towards(position, end, step);
                return Step::Yield(Wait::NextFrame);
            }
            ctx.player.body.transform.position = end;
            ctx.player.body.detect_collisions = true;
            *stage = IntroStage::Arrive;
            Step::Yield(Wait::NextFrame)
        }
        IntroStage::Arrive => {
            ctx.set_moving(false);
            ctx.change_player_state(PlayerState::PoweredOn);
            Step::Done
        }
    }
}

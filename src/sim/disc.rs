//! Disc state machine
//!
//! `change_disc_state` is the only way the disc changes state. It clears the
//! elemental state, cancels whatever routine the disc was running and applies
//! the entry side effects of the new state. Recall, charging and breaking are
//! routines owned by the disc.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::path::PathRecorder;
use super::routine::{Owner, Routine, RoutineHost, Step, Wait};
use super::state::{Behavior, Body, GameState};
use crate::audio::SoundEffect;
use crate::consts::{ARRIVAL_EPSILON, SIMPLE_REWIND_DELAY};
use crate::move_towards;
use crate::settings::RecallType;

/// Disc states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscState {
    /// Sitting in the dispenser
    Dispensed,
    /// In the player's hand
    Attached,
    /// Entered the player's catch volume
    Caught,
    /// Thrown; launches on the next physics step
    Fired,
    Flying,
    /// Returning to the player
    Recalled,
    /// Out of bounces
    Breaking,
    /// Docked in the power station
    Connected,
    /// Docked in a powered charge station
    Charging,
    /// Fully charged, still in the charge station
    Charged,
}

impl DiscState {
    /// States that track a mount point every frame
    pub fn is_docked(&self) -> bool {
        matches!(
            self,
            DiscState::Dispensed
                | DiscState::Attached
                | DiscState::Connected
                | DiscState::Charging
                | DiscState::Charged
        )
    }
}

/// Orthogonal elemental flag, cleared on every state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementalState {
    #[default]
    None,
    Fire,
}

/// Places the disc can dock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mount {
    Player,
    Dispenser,
    ChargeStation,
    PowerStation,
}

/// How the disc model is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscLook {
    Opaque,
    /// Semi-transparent while being recalled
    Faded,
    /// Broken
    Hidden,
}

/// The throwable disc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disc {
    pub state: DiscState,
    pub elemental: ElementalState,
    pub body: Body,
    /// Charge progress in [0, 1]
    pub charge_level: f32,
    charged: bool,
    pub bounce_count: u32,
    pub path: PathRecorder,
    /// Mount point tracked while docked
    pub attach_target: Option<Mount>,
    /// Wind volume the disc is currently inside
    pub wind: Option<usize>,
    pub look: DiscLook,
    /// Emission tint (0 = red, 1 = green)
    pub emission: f32,
    #[serde(skip)]
    pub(crate) generation: u32,
}

impl Default for Disc {
    fn default() -> Self {
        Self::new()
    }
}

impl Disc {
    pub fn new() -> Self {
        Self {
            state: DiscState::Dispensed,
            elemental: ElementalState::None,
            body: Body::default(),
            charge_level: 0.0,
            charged: false,
            bounce_count: 0,
            path: PathRecorder::default(),
            attach_target: None,
            wind: None,
            look: DiscLook::Opaque,
            emission: 0.0,
            generation: 0,
        }
    }

    /// A full charge level always counts as charged
    pub fn is_charged(&self) -> bool {
        self.charged || self.charge_level >= 1.0
    }

    pub fn set_charged(&mut self, charged: bool) {
        self.charged = charged;
        self.charge_level = if charged { 1.0 } else { 0.0 };
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }
}

/// Flight velocity: constant speed along the current heading plus any push
pub fn flight_velocity(velocity: Vec3, speed: f32, push: Vec3) -> Vec3 {
    velocity.normalize_or_zero() * speed + push
}

/// Bounce clip for the bounce that follows `bounces_so_far` earlier ones
pub fn bounce_sound_index(bounces_so_far: u32, clip_count: u32) -> Option<u32> {
    if clip_count == 0 {
        None
    } else {
        Some(bounces_so_far.min(clip_count - 1))
    }
}

impl GameState {
    /// Move the disc into `state` and apply its entry side effects
    pub fn change_disc_state(&mut self, state: DiscState) {
        log::debug!("Disc {:?} -> {:?}", self.disc.state, state);
        self.disc.state = state;
        self.set_disc_elemental(ElementalState::None);
        self.issue_ticket(Owner::Disc);

        if state.is_docked() {
            self.disc.bounce_count = 0;
            self.disc.wind = None;
        } else {
            self.disc.attach_target = None;
        }

        match state {
            DiscState::Dispensed => self.attach_disc(Mount::Dispenser),
            DiscState::Attached => self.attach_disc(Mount::Player),
            DiscState::Connected => self.attach_disc(Mount::PowerStation),
            DiscState::Caught => {
                self.disc.body.halt();
                self.trigger_catching(true);
            }
            DiscState::Charging => {
                self.start_routine(
                    Owner::Disc,
                    Behavior::Disc(DiscRoutine::Charging(ChargingRoutine::default())),
                );
            }
            DiscState::Fired => {
                self.events.push(GameEvent::Trail(true));
                self.events.push(GameEvent::TrailCleared);
            }
            DiscState::Recalled => {
                self.disc.body.halt();
                self.disc.body.transform.rotation = Quat::IDENTITY;
                self.dispatch_recall();
            }
            DiscState::Breaking => {
                self.start_routine(
                    Owner::Disc,
                    Behavior::Disc(DiscRoutine::Break(BreakRoutine::default())),
                );
            }
            DiscState::Flying | DiscState::Charged => {}
        }
    }

    pub(crate) fn set_disc_charged(&mut self, charged: bool) {
        self.disc.set_charged(charged);
        self.set_disc_emission(if charged { 1.0 } else { 0.0 });
    }

    pub(crate) fn set_disc_elemental(&mut self, elemental: ElementalState) {
        if self.disc.elemental != elemental {
            self.disc.elemental = elemental;
            self.events
                .push(GameEvent::DiscOnFire(elemental == ElementalState::Fire));
        }
    }

    fn set_disc_look(&mut self, look: DiscLook) {
        if self.disc.look != look {
            self.disc.look = look;
            self.events.push(GameEvent::DiscLook(look));
        }
    }

    fn set_disc_emission(&mut self, emission: f32) {
        self.disc.emission = emission;
        self.events.push(GameEvent::DiscEmission(emission));
    }

    /// Halt the disc and snap it onto `mount`
    fn attach_disc(&mut self, mount: Mount) {
        self.disc.body.halt();
        match self.mount_transform(mount) {
            Some(transform) => {
                self.disc.body.transform = transform;
                self.disc.attach_target = Some(mount);
            }
            None => {
                log::error!("Disc cannot attach: level has no {mount:?}");
                self.disc.attach_target = None;
            }
        }
        self.events.push(GameEvent::TrailCleared);
        self.events.push(GameEvent::Trail(false));
        self.set_disc_look(DiscLook::Opaque);
    }

    fn dispatch_recall(&mut self) {
        let routine = match self.settings.disc.recall_type {
            RecallType::Simple => DiscRoutine::SimpleReturn(SimpleReturn::default()),
            RecallType::Rewind => DiscRoutine::Rewind(RewindRecall::default()),
            RecallType::SimpleRewind => DiscRoutine::SimpleRewind(SimpleRewindRecall::default()),
            RecallType::Immediate => {
                self.change_disc_state(DiscState::Attached);
                return;
            }
            RecallType::Unsupported => {
                log::error!("Recall type has no recall routine - disc stays recalled");
                return;
            }
        };
        self.start_routine(Owner::Disc, Behavior::Disc(routine));
    }

    /// Launch a fired disc from the player's hand
    fn launch_disc(&mut self) {
        let origin = self.player.mount_point().position;
        let launch = self.player.launch_point();
        let forward = self.player.forward();

        self.disc.path.begin(origin);
        self.disc.bounce_count = 0;
        self.disc.attach_target = None;
        self.disc.wind = None;
        self.disc.body.transform.position = launch;
        self.disc.body.transform.rotation = self.player.body.transform.rotation;
        self.disc.body.detect_collisions = true;
        self.disc.body.velocity = forward * self.settings.disc.speed;
        self.events.push(GameEvent::TrailCleared);

        // Straight to Flying: launching is not a transition of its own
        self.disc.state = DiscState::Flying;
        log::debug!("Disc launched from {launch}");
    }

    /// Physics-step work for the disc
    pub(crate) fn fixed_update_disc(&mut self, dt: f32) {
        match self.disc.state {
            DiscState::Fired => self.launch_disc(),
            DiscState::Flying => {
                let push = self
                    .disc
                    .wind
                    .and_then(|i| self.winds.get(i))
                    .map_or(Vec3::ZERO, |w| w.force());
                self.disc.body.velocity =
                    flight_velocity(self.disc.body.velocity, self.settings.disc.speed, push);
            }
            _ => {}
        }
        self.disc.body.integrate(dt);
    }

    /// Frame work for the disc: docked discs follow their mount
    pub(crate) fn update_disc(&mut self) {
        if !self.disc.state.is_docked() {
            return;
        }
        self.disc.bounce_count = 0;
        if let Some(transform) = self.disc.attach_target.and_then(|m| self.mount_transform(m)) {
            self.disc.body.transform = transform;
        }
    }

    /// The physics service reports the disc hit something
    pub fn on_disc_collision(&mut self) {
        if self.disc.state != DiscState::Flying {
            return;
        }
        let position = self.disc.position();
        self.disc.path.record(position);

        let previous = self.disc.bounce_count;
        self.disc.bounce_count += 1;
        if self.disc.bounce_count > self.settings.disc.max_bounces {
            log::debug!("Disc out of bounces after {}", self.disc.bounce_count);
            self.change_disc_state(DiscState::Breaking);
        } else if let Some(index) = bounce_sound_index(previous, self.settings.disc.bounce_sounds)
        {
            self.play(SoundEffect::Bounce(index));
        }
    }

    /// Disc entered the player's catch volume
    pub fn on_disc_enter_catch_trigger(&mut self) {
        if self.disc.state != DiscState::Flying
            || !self.player.catch_trigger_enabled
            || !self.player.is_powered_on()
        {
            return;
        }
        self.disc.body.halt();
        self.change_disc_state(DiscState::Caught);
    }
}

/// Routines the disc runs
#[derive(Debug)]
pub enum DiscRoutine {
    Break(BreakRoutine),
    SimpleReturn(SimpleReturn),
    Rewind(RewindRecall),
    SimpleRewind(SimpleRewindRecall),
    Charging(ChargingRoutine),
}

impl Routine<GameState> for DiscRoutine {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        match self {
            DiscRoutine::Break(r) => r.resume(ctx),
            DiscRoutine::SimpleReturn(r) => r.resume(ctx),
            DiscRoutine::Rewind(r) => r.resume(ctx),
            DiscRoutine::SimpleRewind(r) => r.resume(ctx),
            DiscRoutine::Charging(r) => r.resume(ctx),
        }
    }
}

/// Fade out, seed the respawn charge, then go back to the dispenser
#[derive(Debug, Default)]
pub struct BreakRoutine {
    faded: bool,
}

impl Routine<GameState> for BreakRoutine {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        if !self.faded {
            self.faded = true;
            ctx.play(SoundEffect::DiscBreak);
            ctx.set_disc_look(DiscLook::Hidden);
            let charged = ctx.level.charged_on_break;
            ctx.set_disc_charged(charged);
            return Step::Yield(Wait::NextFrame);
        }
        ctx.change_disc_state(DiscState::Dispensed);
        Step::Done
    }
}

/// Fly straight back to the player's hand
#[derive(Debug, Default)]
pub struct SimpleReturn {
    started: bool,
}

impl Routine<GameState> for SimpleReturn {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        if !self.started {
            self.started = true;
            ctx.set_disc_look(DiscLook::Faded);
            ctx.disc.body.halt();
        } else {
            let target = ctx.player.mount_point().position;
            let step = ctx.settings.disc.return_speed * ctx.dt;
            ctx.disc.body.transform.position = move_towards(ctx.disc.position(), target, step);
        }

        let target = ctx.player.mount_point().position;
        let powered = ctx.player.is_powered_on();
        if powered && ctx.disc.position().distance(target) > ARRIVAL_EPSILON {
            return Step::Yield(Wait::NextFrame);
        }

        if powered {
            ctx.change_disc_state(DiscState::Attached);
        } else {
            // Nobody to catch it: keep going toward the robot at flight speed
            let mut dir = ctx.player.body.position() - ctx.disc.position();
            dir.y = 0.0;
            ctx.disc.body.detect_collisions = true;
            ctx.disc.body.velocity = dir.normalize_or_zero() * ctx.settings.disc.speed;
            ctx.change_disc_state(DiscState::Flying);
        }
        Step::Done
    }
}

/// Retrace the flight in reverse, ending in the player's hand
#[derive(Debug, Default)]
pub struct RewindRecall {
    route: Vec<Vec3>,
    next: usize,
    started: bool,
}

impl Routine<GameState> for RewindRecall {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        if !self.started {
            self.started = true;
            ctx.set_disc_look(DiscLook::Faded);
            ctx.player.inputs_disabled = true;
            ctx.disc.body.halt();
            let home = ctx.player.mount_point().position;
            self.route = ctx.disc.path.take_rewind_route(home);
        } else if let Some(&dest) = self.route.get(self.next) {
            let step = ctx.settings.disc.recall_speed * ctx.dt;
            ctx.disc.body.transform.position = move_towards(ctx.disc.position(), dest, step);
        }

        while let Some(&dest) = self.route.get(self.next) {
            if ctx.disc.position().distance(dest) > ARRIVAL_EPSILON {
                return Step::Yield(Wait::NextFrame);
            }
            self.next += 1;
        }

        ctx.change_disc_state(DiscState::Attached);
        Step::Done
    }
}

/// Teleport back through the flight in reverse
#[derive(Debug, Default)]
pub struct SimpleRewindRecall {
    route: Vec<Vec3>,
    next: usize,
    started: bool,
}

impl Routine<GameState> for SimpleRewindRecall {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        if !self.started {
            self.started = true;
            ctx.set_disc_look(DiscLook::Faded);
            ctx.disc.body.halt();
            self.route = ctx.disc.path.take_reversed();
        }

        if let Some(&point) = self.route.get(self.next) {
            self.next += 1;
            ctx.disc.body.transform.position = point;
            return Step::Yield(Wait::Seconds(SIMPLE_REWIND_DELAY));
        }

        ctx.change_disc_state(DiscState::Attached);
        Step::Done
    }
}

/// Fill the disc's charge while docked in a powered station
#[derive(Debug, Default)]
pub struct ChargingRoutine {
    started: bool,
}

impl Routine<GameState> for ChargingRoutine {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        if !self.started {
            self.started = true;
            ctx.attach_disc(Mount::ChargeStation);
            if ctx.disc.attach_target.is_none() {
                return Step::Done;
            }
            ctx.disc.charge_level = if ctx.disc.is_charged() { 1.0 } else { 0.0 };
            ctx.play(SoundEffect::Charging);
        } else {
            let rate = 1.0 / ctx.settings.charging_time();
            ctx.disc.charge_level += rate * ctx.dt;
            let emission = ctx.disc.emission;
            let tint = emission + (1.0 - emission) * ctx.disc.charge_level.min(1.0);
            ctx.set_disc_emission(tint);
        }

        if ctx.disc.charge_level < 1.0 {
            return Step::Yield(Wait::NextFrame);
        }

        ctx.set_disc_charged(true);
        ctx.change_disc_state(DiscState::Charged);
        Step::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::{ChargeStationSettings, LevelSettings};
    use crate::sim::player::PlayerState;
    use crate::sim::tick::{FrameInput, frame};

    fn flying_state(settings: LevelSettings) -> GameState {
        let mut state = GameState::new(settings);
        state.player.power = 1.0;
        state.change_player_state(PlayerState::PoweredOn);
        state.change_disc_state(DiscState::Attached);
        state.change_disc_state(DiscState::Fired);
        frame(&mut state, &FrameInput::default(), SIM_DT);
        state
    }

    fn run_frames(state: &mut GameState, frames: usize) {
        for _ in 0..frames {
            frame(state, &FrameInput::default(), SIM_DT);
        }
    }

    #[test]
    fn test_fired_launches_on_next_physics_step() {
        let mut state = GameState::new(LevelSettings::default());
        state.player.power = 1.0;
        state.change_player_state(PlayerState::PoweredOn);
        state.change_disc_state(DiscState::Attached);
        state.change_disc_state(DiscState::Fired);
        assert_eq!(state.disc.state, DiscState::Fired);
        assert_eq!(state.disc.body.velocity, Vec3::ZERO);

        frame(&mut state, &FrameInput::default(), SIM_DT);
        assert_eq!(state.disc.state, DiscState::Flying);
        let speed = state.disc.body.velocity.length();
        assert!((speed - state.settings.disc.speed).abs() < 1e-3);
        assert!(state.disc.body.velocity.normalize().dot(state.player.forward()) > 0.999);
        assert_eq!(state.disc.path.len(), 1);
    }

    #[test]
    fn test_flight_speed_is_constant() {
        let mut state = flying_state(LevelSettings::default());
        state.disc.body.velocity = Vec3::new(3.0, 0.0, 4.0) * 100.0;
        run_frames(&mut state, 1);
        assert!((state.disc.body.velocity.length() - state.settings.disc.speed).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_sounds_and_break_routing() {
        let mut state = flying_state(LevelSettings::default());
        state.drain_events();

        state.on_disc_collision();
        assert_eq!(state.disc.bounce_count, 1);
        assert!(state.events.contains(&GameEvent::Sound(SoundEffect::Bounce(0))));

        for _ in 0..4 {
            state.on_disc_collision();
        }
        assert_eq!(state.disc.state, DiscState::Flying);
        assert_eq!(state.disc.bounce_count, 5);
        // Three clips configured: later bounces reuse the last one
        assert!(state.events.contains(&GameEvent::Sound(SoundEffect::Bounce(2))));

        state.on_disc_collision();
        assert_eq!(state.disc.state, DiscState::Breaking);
        assert_eq!(state.disc.look, DiscLook::Hidden);

        run_frames(&mut state, 1);
        assert_eq!(state.disc.state, DiscState::Dispensed);
        assert_eq!(state.disc.look, DiscLook::Opaque);
        assert_eq!(state.disc.bounce_count, 0);
        assert!(!state.disc.is_charged());
    }

    #[test]
    fn test_break_seeds_charge_from_level() {
        let mut settings = LevelSettings::default();
        settings.level.charged_on_break = true;
        let mut state = flying_state(settings);
        state.change_disc_state(DiscState::Breaking);
        run_frames(&mut state, 1);
        assert_eq!(state.disc.state, DiscState::Dispensed);
        assert!(state.disc.is_charged());
    }

    #[test]
    fn test_collision_ignored_unless_flying() {
        let mut state = GameState::new(LevelSettings::default());
        state.on_disc_collision();
        assert_eq!(state.disc.bounce_count, 0);
        assert!(state.disc.path.is_empty());
    }

    #[test]
    fn test_state_change_clears_fire() {
        let mut state = flying_state(LevelSettings::default());
        state.set_disc_elemental(ElementalState::Fire);
        state.change_disc_state(DiscState::Recalled);
        assert_eq!(state.disc.elemental, ElementalState::None);
    }

    #[test]
    fn test_simple_recall_returns_to_hand() {
        let mut state = flying_state(LevelSettings::default());
        run_frames(&mut state, 10);
        state.change_disc_state(DiscState::Recalled);
        assert_eq!(state.disc.look, DiscLook::Faded);

        for _ in 0..200 {
            if state.disc.state == DiscState::Attached {
                break;
            }
            state.player.power = 1.0;
            run_frames(&mut state, 1);
        }
        assert_eq!(state.disc.state, DiscState::Attached);
        let hand = state.player.mount_point().position;
        assert!(state.disc.position().distance(hand) < 1e-3);
    }

    #[test]
    fn test_simple_recall_without_power_keeps_flying() {
        let mut state = flying_state(LevelSettings::default());
        run_frames(&mut state, 10);
        state.change_disc_state(DiscState::Recalled);
        state.player.power = 0.0;
        run_frames(&mut state, 1);
        assert_eq!(state.disc.state, DiscState::Flying);
        assert!(state.disc.body.detect_collisions);
        assert!(state.disc.body.velocity.length() > 0.0);
    }

    #[test]
    fn test_rewind_recall_retraces_path() {
        let mut settings = LevelSettings::default();
        settings.disc.recall_type = RecallType::Rewind;
        let mut state = flying_state(settings);
        let home = state.player.mount_point().position;

        let bounces = [Vec3::new(0.0, 1.0, 6.0), Vec3::new(3.0, 1.0, 6.0)];
        for b in bounces {
            state.disc.body.transform.position = b;
            state.on_disc_collision();
        }
        state.disc.body.transform.position = Vec3::new(3.0, 1.0, 2.0);
        state.change_disc_state(DiscState::Recalled);
        assert!(state.player.inputs_disabled);

        // Record the order the disc reaches each waypoint
        let mut visited = Vec::new();
        for _ in 0..400 {
            if state.disc.state == DiscState::Attached {
                break;
            }
            run_frames(&mut state, 1);
            let p = state.disc.position();
            for target in [bounces[1], bounces[0], home] {
                if p.distance(target) < 1e-3 && visited.last() != Some(&target) {
                    visited.push(target);
                }
            }
        }
        assert_eq!(state.disc.state, DiscState::Attached);
        assert_eq!(visited, vec![bounces[1], bounces[0], home]);
    }

    #[test]
    fn test_simple_rewind_teleports_with_delay() {
        let mut settings = LevelSettings::default();
        settings.disc.recall_type = RecallType::SimpleRewind;
        let mut state = flying_state(settings);
        let bounce = Vec3::new(2.0, 1.0, 5.0);
        state.disc.body.transform.position = bounce;
        state.on_disc_collision();
        state.disc.body.transform.position = Vec3::new(9.0, 1.0, 9.0);

        state.change_disc_state(DiscState::Recalled);
        // First teleport happens immediately, to the newest point
        assert_eq!(state.disc.position(), bounce);

        // 0.25 s at 50 Hz is 13 frames before the next teleport lands
        run_frames(&mut state, 12);
        assert_eq!(state.disc.position(), bounce);
        run_frames(&mut state, 40);
        assert_eq!(state.disc.state, DiscState::Attached);
    }

    #[test]
    fn test_simple_rewind_gaps_are_equal_when_recalled_by_input() {
        let mut settings = LevelSettings::default();
        settings.disc.recall_type = RecallType::SimpleRewind;
        let mut state = flying_state(settings);
        for bounce in [Vec3::new(2.0, 1.0, 5.0), Vec3::new(-2.0, 1.0, 8.0)] {
            state.disc.body.transform.position = bounce;
            state.on_disc_collision();
        }
        state.disc.body.transform.position = Vec3::new(9.0, 1.0, 9.0);

        let press = FrameInput {
            action: true,
            ..Default::default()
        };
        frame(&mut state, &press, SIM_DT);
        assert_eq!(state.player.state, PlayerState::Recalling);
        assert_eq!(state.disc.position(), Vec3::new(-2.0, 1.0, 8.0));

        // Frames at which the disc teleported or landed in hand
        let mut marks = vec![0];
        let mut last = state.disc.position();
        for n in 1..=80 {
            state.player.power = 1.0;
            frame(&mut state, &FrameInput::default(), SIM_DT);
            let attached = state.disc.state == DiscState::Attached;
            if state.disc.position() != last || attached {
                marks.push(n);
                last = state.disc.position();
            }
            if attached {
                break;
            }
        }
        let gaps: Vec<_> = marks.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(gaps, vec![13, 13, 13]);
    }

    #[test]
    fn test_immediate_recall_attaches() {
        let mut settings = LevelSettings::default();
        settings.disc.recall_type = RecallType::Immediate;
        let mut state = flying_state(settings);
        state.change_disc_state(DiscState::Recalled);
        assert_eq!(state.disc.state, DiscState::Attached);
        assert_eq!(state.disc.attach_target, Some(Mount::Player));
    }

    #[test]
    fn test_unsupported_recall_noops() {
        let mut settings = LevelSettings::default();
        settings.disc.recall_type = RecallType::Unsupported;
        let mut state = flying_state(settings);
        state.change_disc_state(DiscState::Recalled);
        let before = state.disc.position();
        run_frames(&mut state, 20);
        assert_eq!(state.disc.state, DiscState::Recalled);
        assert_eq!(state.disc.position(), before);
        assert_eq!(state.routines_for(Owner::Disc), 0);
    }

    #[test]
    fn test_charging_fills_over_configured_time() {
        let mut settings = LevelSettings::default();
        settings.charge_station = Some(ChargeStationSettings {
            powered: true,
            ..Default::default()
        });
        settings.disc.charging_time = 1.0;
        let mut state = flying_state(settings);

        state.on_disc_enter_charge_station();
        assert_eq!(state.disc.state, DiscState::Charging);
        assert_eq!(state.disc.attach_target, Some(Mount::ChargeStation));
        assert_eq!(state.disc.charge_level, 0.0);

        run_frames(&mut state, 25);
        assert_eq!(state.disc.state, DiscState::Charging);
        assert!(state.disc.charge_level > 0.4 && state.disc.charge_level < 0.6);
        assert!(!state.disc.is_charged());

        run_frames(&mut state, 30);
        assert_eq!(state.disc.state, DiscState::Charged);
        assert_eq!(state.disc.charge_level, 1.0);
        assert!(state.disc.is_charged());
    }

    #[test]
    fn test_docked_disc_follows_mount() {
        let mut state = GameState::new(LevelSettings::default());
        state.change_disc_state(DiscState::Attached);
        state.player.body.transform.position = Vec3::new(5.0, 0.0, 5.0);
        state.disc.bounce_count = 3;
        state.update_disc();
        assert_eq!(state.disc.position(), state.player.mount_point().position);
        assert_eq!(state.disc.bounce_count, 0);
    }

    #[test]
    fn test_bounce_sound_index_clamps() {
        assert_eq!(bounce_sound_index(0, 3), Some(0));
        assert_eq!(bounce_sound_index(7, 3), Some(2));
        assert_eq!(bounce_sound_index(0, 0), None);
    }
}

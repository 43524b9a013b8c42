//! Whole-session scenarios driven through the public API

use glam::{Vec2, Vec3};
use proptest::prelude::*;

use windup_disc::consts::SIM_DT;
use windup_disc::settings::{ChargeStationSettings, PowerStationSettings};
use windup_disc::sim::{DiscState, FrameInput, GameEvent, GameState, PlayerState, frame};
use windup_disc::{LevelSettings, RecallType, Transform};

fn run(state: &mut GameState, input: &FrameInput, frames: usize) {
    for _ in 0..frames {
        frame(state, input, SIM_DT);
    }
}

fn press() -> FrameInput {
    FrameInput {
        action: true,
        ..Default::default()
    }
}

/// Level started, robot wound up and holding the disc
fn holding_disc(settings: LevelSettings) -> GameState {
    let mut state = GameState::new(settings);
    state.play_game();
    let rewind = FrameInput {
        rewind: true,
        ..Default::default()
    };
    run(&mut state, &rewind, 110);
    run(&mut state, &FrameInput::default(), 15);
    assert_eq!(state.player.state, PlayerState::PoweredOn);

    // Recall from the dispenser puts it in hand
    run(&mut state, &press(), 1);
    run(&mut state, &FrameInput::default(), 40);
    assert_eq!(state.disc.state, DiscState::Attached);
    assert_eq!(state.player.state, PlayerState::PoweredOn);
    state
}

fn throw(state: &mut GameState) {
    run(state, &press(), 1);
    for _ in 0..100 {
        if state.player.state == PlayerState::PoweredOn {
            break;
        }
        run(state, &FrameInput::default(), 1);
    }
    assert_eq!(state.disc.state, DiscState::Flying);
    assert_eq!(state.player.state, PlayerState::PoweredOn);
    assert!(state.player.catch_trigger_enabled);
}

#[test]
fn throw_bounce_break_and_redispense() {
    let mut settings = LevelSettings::default();
    settings.dispenser = Transform::from_position(Vec3::new(-2.0, 1.0, 0.0));
    let mut state = holding_disc(settings);
    throw(&mut state);
    state.drain_events();

    for _ in 0..5 {
        state.on_disc_collision();
        run(&mut state, &FrameInput::default(), 2);
        assert_eq!(state.disc.state, DiscState::Flying);
    }
    state.on_disc_collision();
    assert_eq!(state.disc.state, DiscState::Breaking);

    run(&mut state, &FrameInput::default(), 2);
    assert_eq!(state.disc.state, DiscState::Dispensed);
    assert_eq!(state.disc.position(), Vec3::new(-2.0, 1.0, 0.0));
    assert_eq!(state.disc.bounce_count, 0);
    assert!(!state.disc.is_charged());
}

#[test]
fn every_recall_type_returns_disc_to_hand() {
    for recall_type in [
        RecallType::Simple,
        RecallType::Rewind,
        RecallType::SimpleRewind,
        RecallType::Immediate,
    ] {
        let mut settings = LevelSettings::default();
        settings.disc.recall_type = recall_type;
        let mut state = holding_disc(settings);
        throw(&mut state);

        state.disc.body.transform.position = Vec3::new(3.0, 1.0, 9.0);
        state.on_disc_collision();
        run(&mut state, &FrameInput::default(), 5);

        run(&mut state, &press(), 1);
        assert_eq!(state.player.state, PlayerState::Recalling, "{recall_type:?}");
        for _ in 0..300 {
            state.player.power = 1.0;
            run(&mut state, &FrameInput::default(), 1);
            if state.player.state == PlayerState::PoweredOn {
                break;
            }
        }
        assert_eq!(state.disc.state, DiscState::Attached, "{recall_type:?}");
        assert_eq!(state.player.state, PlayerState::PoweredOn, "{recall_type:?}");
        let hand = state.player.mount_point().position;
        assert!(state.disc.position().distance(hand) < 1e-3, "{recall_type:?}");
    }
}

#[test]
fn charge_then_power_the_exit_door() {
    let mut settings = LevelSettings::default();
    settings.disc.charging_time = 2.0;
    settings.charge_station = Some(ChargeStationSettings {
        mount: Transform::from_position(Vec3::new(0.0, 1.0, 10.0)),
        powered: true,
    });
    settings.power_station = Some(PowerStationSettings {
        mount: Transform::from_position(Vec3::new(10.0, 1.0, 0.0)),
        powered: false,
    });
    settings.exit_door = true;
    let mut state = holding_disc(settings);
    throw(&mut state);

    state.on_disc_enter_charge_station();
    assert_eq!(state.disc.state, DiscState::Charging);
    run(&mut state, &FrameInput::default(), 105);
    assert_eq!(state.disc.state, DiscState::Charged);

    // Recall the charged disc and throw it into the power station
    run(&mut state, &press(), 1);
    run(&mut state, &FrameInput::default(), 60);
    assert_eq!(state.disc.state, DiscState::Attached);
    assert!(state.disc.is_charged());
    throw(&mut state);
    state.drain_events();

    state.on_disc_enter_power_station();
    assert_eq!(state.disc.state, DiscState::Connected);
    run(&mut state, &FrameInput::default(), 1);
    assert!(state.drain_events().contains(&GameEvent::ExitDoor { open: true }));
    assert_eq!(state.disc.position(), Vec3::new(10.0, 1.0, 0.0));
}

#[test]
fn settings_round_trip_through_json() {
    let json = r#"{
        "disc": { "recall_type": "Rewind", "max_bounces": 2 },
        "level": { "index": 1, "count": 4 }
    }"#;
    let settings = LevelSettings::from_json(json).unwrap();
    let state = GameState::new(settings);
    assert_eq!(state.settings.disc.recall_type, RecallType::Rewind);
    assert_eq!(state.settings.disc.max_bounces, 2);
    assert_eq!(state.settings.disc.speed, 20.0);
    assert_eq!(state.level.index, 1);
}

fn frame_input() -> impl Strategy<Value = FrameInput> {
    (-1i8..=1, any::<bool>(), any::<bool>()).prop_map(|(x, action, rewind)| FrameInput {
        movement: Vec2::new(f32::from(x), 0.0),
        action,
        rewind,
        ..Default::default()
    })
}

proptest! {
    #[test]
    fn power_stays_in_range(inputs in prop::collection::vec(frame_input(), 1..400)) {
        let mut state = GameState::new(LevelSettings::default());
        state.play_game();
        for input in &inputs {
            let before = state.player.power;
            let was_off = state.player.state == PlayerState::PoweredOff;
            frame(&mut state, input, SIM_DT);
            let power = state.player.power;
            prop_assert!((0.0..=1.0).contains(&power));
            if power == 0.0 && before > 0.0 {
                prop_assert_eq!(state.player.state, PlayerState::PoweredOff);
            }
            if was_off && before < 1.0 && power == 1.0 {
                prop_assert_eq!(state.player.state, PlayerState::PoweringOn);
            }
        }
    }

    #[test]
    fn bounce_limit_routes_to_breaking(max_bounces in 0u32..8, hits in 0u32..12) {
        let mut settings = LevelSettings::default();
        settings.disc.max_bounces = max_bounces;
        let mut state = GameState::new(settings);
        state.disc.state = DiscState::Flying;
        state.disc.body.detect_collisions = true;
        for _ in 0..hits {
            state.on_disc_collision();
        }
        if hits > max_bounces {
            prop_assert_eq!(state.disc.state, DiscState::Breaking);
        } else {
            prop_assert_eq!(state.disc.state, DiscState::Flying);
            prop_assert_eq!(state.disc.bounce_count, hits);
        }
    }
}

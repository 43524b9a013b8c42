//! Power propagation between stations
//!
//! Charge station -> disc -> power station, plus switches that fan an on/off
//! signal out to anything [`Switchable`]. This module is plain state and
//! notification; the disc owns every routine that charging involves.

use serde::{Deserialize, Serialize};

use super::disc::DiscState;
use super::event::GameEvent;
use super::state::GameState;
use crate::Transform;
use crate::audio::SoundEffect;
use crate::settings::{SwitchKind, SwitchSettings, SwitchTargetRef};

/// Anything a switch can turn on or off
pub trait Switchable {
    fn set_state(&mut self, is_on: bool);
}

/// Lets a docked disc charge while powered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeStation {
    pub mount: Transform,
    powered_on: bool,
}

impl ChargeStation {
    pub fn new(mount: Transform, powered_on: bool) -> Self {
        Self { mount, powered_on }
    }

    pub fn is_powered_on(&self) -> bool {
        self.powered_on
    }
}

impl Switchable for ChargeStation {
    fn set_state(&mut self, is_on: bool) {
        self.powered_on = is_on;
    }
}

/// Latches on for good once a charged disc docks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerStation {
    pub mount: Transform,
    powered_on: bool,
}

impl PowerStation {
    pub fn new(mount: Transform, powered_on: bool) -> Self {
        Self { mount, powered_on }
    }

    pub fn is_powered_on(&self) -> bool {
        self.powered_on
    }

    /// One-way: nothing in the game turns a power station back off
    fn latch(&mut self) {
        self.powered_on = true;
    }
}

/// A generic on/off device driven by switches (lights, gates, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchTarget {
    pub is_on: bool,
}

impl Switchable for SwitchTarget {
    fn set_state(&mut self, is_on: bool) {
        self.is_on = is_on;
    }
}

/// A button the disc can hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    pub kind: SwitchKind,
    pub is_on: bool,
    pub targets: Vec<SwitchTargetRef>,
    has_changed: bool,
}

impl Switch {
    pub fn from_settings(settings: &SwitchSettings) -> Self {
        Self {
            kind: settings.kind,
            is_on: settings.is_on,
            targets: settings.targets.clone(),
            has_changed: false,
        }
    }

    /// Flip the switch; returns the new state, or None if it is latched
    pub fn press(&mut self) -> Option<bool> {
        if self.kind == SwitchKind::SinglePress && self.has_changed {
            return None;
        }
        self.has_changed = true;
        self.is_on = !self.is_on;
        Some(self.is_on)
    }
}

/// Door that opens once the power station is on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExitDoor {
    pub station_powered: bool,
}

impl GameState {
    /// Disc entered the charge station volume
    pub fn on_disc_enter_charge_station(&mut self) {
        if !self.disc.body.detect_collisions {
            return;
        }
        let powered = self
            .charge_station
            .as_ref()
            .is_some_and(ChargeStation::is_powered_on);
        if powered {
            self.change_disc_state(DiscState::Charging);
        }
    }

    /// Disc entered the power station volume
    pub fn on_disc_enter_power_station(&mut self) {
        if !self.disc.body.detect_collisions || !self.disc.is_charged() {
            return;
        }
        let Some(station) = self.power_station.as_mut() else {
            log::error!("Disc reached a power station that is not part of this level");
            return;
        };
        station.latch();
        log::info!("Power station is now on");
        self.change_disc_state(DiscState::Connected);
    }

    /// Disc hit switch `index`
    pub fn on_disc_enter_switch(&mut self, index: usize) {
        if !self.disc.body.detect_collisions {
            return;
        }
        self.press_switch(index);
    }

    /// Press switch `index` and propagate its new state
    pub fn press_switch(&mut self, index: usize) {
        let Some(switch) = self.switches.get_mut(index) else {
            log::warn!("No switch {index} in this level");
            return;
        };
        let Some(is_on) = switch.press() else {
            return;
        };
        let targets = switch.targets.clone();

        self.events.push(GameEvent::Sound(if is_on {
            SoundEffect::SwitchOn
        } else {
            SoundEffect::SwitchOff
        }));
        self.events.push(GameEvent::SwitchVisual { index, is_on });
        self.fan_out(&targets, is_on);
    }

    /// Push `is_on` to every target
    pub(crate) fn fan_out(&mut self, targets: &[SwitchTargetRef], is_on: bool) {
        for &target in targets {
            match self.switchable_mut(target) {
                Some(receiver) => receiver.set_state(is_on),
                None => log::error!("Switch target {target:?} is missing"),
            }
        }
    }

    fn switchable_mut(&mut self, target: SwitchTargetRef) -> Option<&mut dyn Switchable> {
        match target {
            SwitchTargetRef::ChargeStation => self
                .charge_station
                .as_mut()
                .map(|s| s as &mut dyn Switchable),
            SwitchTargetRef::Target(i) => self
                .switch_targets
                .get_mut(i)
                .map(|t| t as &mut dyn Switchable),
        }
    }

    /// Mirror the power station onto the exit door
    pub(crate) fn update_exit_door(&mut self) {
        let station_powered = self
            .power_station
            .as_ref()
            .is_some_and(PowerStation::is_powered_on);
        let Some(door) = self.exit_door.as_mut() else {
            return;
        };
        if door.station_powered == station_powered {
            return;
        }
        door.station_powered = station_powered;
        if station_powered {
            self.events.push(GameEvent::Sound(SoundEffect::DoorOff));
        }
        self.events.push(GameEvent::ExitDoor {
            open: station_powered,
        });
    }
}

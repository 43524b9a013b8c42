//! Wind volumes and torches
//!
//! Torches set a passing disc on fire; wind blows torches and burning discs
//! out and bends the disc's flight while it is inside. The host reports
//! volume overlaps only when nothing blocks the wind's line of sight.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::disc::ElementalState;
use super::event::GameEvent;
use super::state::GameState;
use crate::settings::WindSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindVolume {
    pub direction: Vec3,
    pub push_power: f32,
}

impl WindVolume {
    pub fn from_settings(settings: &WindSettings) -> Self {
        Self {
            direction: settings.direction.normalize_or_zero(),
            push_power: settings.push_power,
        }
    }

    /// Push applied to a flying disc each physics step
    pub fn force(&self) -> Vec3 {
        self.direction * self.push_power
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torch {
    pub is_on: bool,
}

impl GameState {
    /// Disc is inside wind volume `index` (reported every step it overlaps)
    pub fn on_disc_in_wind(&mut self, index: usize) {
        if !self.disc.body.detect_collisions {
            return;
        }
        if index >= self.winds.len() {
            log::warn!("No wind volume {index} in this level");
            return;
        }
        if self.disc.elemental == ElementalState::Fire {
            self.set_disc_elemental(ElementalState::None);
        }
        self.disc.wind = Some(index);
    }

    pub fn on_disc_exit_wind(&mut self, index: usize) {
        if self.disc.wind == Some(index) {
            self.disc.wind = None;
        }
    }

    /// Torch `index` is inside a wind volume
    pub fn on_torch_in_wind(&mut self, index: usize) {
        self.set_torch(index, false);
    }

    /// Disc passed through torch `index`
    pub fn on_disc_enter_torch(&mut self, index: usize) {
        if !self.disc.body.detect_collisions {
            return;
        }
        let Some(torch) = self.torches.get(index) else {
            log::warn!("No torch {index} in this level");
            return;
        };
        if self.disc.elemental == ElementalState::Fire {
            self.set_torch(index, true);
        } else if torch.is_on {
            self.set_disc_elemental(ElementalState::Fire);
        }
    }

    fn set_torch(&mut self, index: usize, is_on: bool) {
        let Some(torch) = self.torches.get_mut(index) else {
            return;
        };
        if torch.is_on != is_on {
            torch.is_on = is_on;
            self.events.push(GameEvent::Torch { index, is_on });
        }
    }
}

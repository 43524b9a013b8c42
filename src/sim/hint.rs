//! Tutorial hints
//!
//! Each hint watches one condition. Once the condition has held through the
//! reveal delay the hint shows, and it hides again when the condition ends.
//! Hints only run on the early levels.

use super::disc::DiscState;
use super::event::Hint;
use super::routine::{Owner, Routine, Step, Wait};
use super::state::{Behavior, GameState};

impl Hint {
    /// Levels before this index show the hint
    fn level_limit(&self) -> u32 {
        match self {
            Hint::Rewind => 1,
            Hint::Throw => 2,
            Hint::Recall => 3,
        }
    }

    fn channel(&self) -> u8 {
        match self {
            Hint::Rewind => 0,
            Hint::Throw => 1,
            Hint::Recall => 2,
        }
    }

    fn applies(&self, ctx: &GameState) -> bool {
        match self {
            Hint::Rewind => needs_rewind(ctx),
            Hint::Throw => disc_throwable(ctx),
            Hint::Recall => disc_recallable(ctx),
        }
    }

    fn condition(&self) -> fn(&GameState) -> bool {
        match self {
            Hint::Rewind => needs_rewind,
            Hint::Throw => disc_throwable,
            Hint::Recall => disc_recallable,
        }
    }

    fn cleared(&self) -> fn(&GameState) -> bool {
        match self {
            Hint::Rewind => is_powered,
            Hint::Throw => not_throwable,
            Hint::Recall => not_recallable,
        }
    }
}

fn needs_rewind(ctx: &GameState) -> bool {
    !ctx.player.is_powered_on()
}

fn is_powered(ctx: &GameState) -> bool {
    ctx.player.is_powered_on()
}

fn not_throwable(ctx: &GameState) -> bool {
    !disc_throwable(ctx)
}

fn not_recallable(ctx: &GameState) -> bool {
    !disc_recallable(ctx)
}

fn disc_throwable(ctx: &GameState) -> bool {
    ctx.player.is_powered_on() && ctx.disc.state == DiscState::Attached
}

fn disc_recallable(ctx: &GameState) -> bool {
    ctx.player.is_powered_on()
        && matches!(ctx.disc.state, DiscState::Dispensed | DiscState::Charged)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HintStage {
    Watch,
    Reveal,
    Showing,
}

/// Watches one hint's condition for the rest of the level
#[derive(Debug)]
pub struct HintRoutine {
    hint: Hint,
    stage: HintStage,
}

impl HintRoutine {
    pub fn new(hint: Hint) -> Self {
        Self {
            hint,
            stage: HintStage::Watch,
        }
    }
}

impl Routine<GameState> for HintRoutine {
    fn resume(&mut self, ctx: &mut GameState) -> Step<GameState> {
        if ctx.level.index >= self.hint.level_limit() {
            return Step::Done;
        }
        match self.stage {
            HintStage::Watch => {
                self.stage = HintStage::Reveal;
                Step::Yield(Wait::Until(self.hint.condition()))
            }
            HintStage::Reveal => {
                self.stage = HintStage::Showing;
                Step::Yield(Wait::Seconds(ctx.settings.level.hint_reveal_delay))
            }
            HintStage::Showing => {
                if ctx.hint == Some(self.hint) {
                    // Condition ended while showing
                    ctx.show_hint(None);
                    self.stage = HintStage::Reveal;
                    return Step::Yield(Wait::Until(self.hint.condition()));
                }
                if self.hint.applies(ctx) {
                    ctx.show_hint(Some(self.hint));
                    return Step::Yield(Wait::Until(self.hint.cleared()));
                }
                // Lapsed during the delay: start watching again
                self.stage = HintStage::Reveal;
                Step::Yield(Wait::Until(self.hint.condition()))
            }
        }
    }
}

impl GameState {
    pub(crate) fn start_hints(&mut self) {
        self.show_hint(None);
        for hint in [Hint::Rewind, Hint::Throw, Hint::Recall] {
            if self.level.index < hint.level_limit() {
                self.start_routine(
                    Owner::Hint(hint.channel()),
                    Behavior::Hint(HintRoutine::new(hint)),
                );
            }
        }
    }
}

//! Three-item settings menu.

use super::{draw_prompt, ensure_holder, Context, Machine, RtcOutcome};
use crate::{CharDisplay, Inputs, Mode, Shared, TokenError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    Init,
    WaitForOwnership,
    /// Wait for Left/Right to be released
    ButtonDebounce,
    Item1,
    Item1Wait,
    Item2,
    Item2Wait,
    Item3,
    Item3Wait,
    HandoffToAlarm,
    HandoffToTempUnit,
    HandoffToHourFormat,
    HandoffToClock,
}

impl MenuState {
    /// Sub-mode a handoff state gives the token to.
    fn handoff_target(self) -> Option<Mode> {
        match self {
            MenuState::HandoffToAlarm => Some(Mode::Alarm),
            MenuState::HandoffToTempUnit => Some(Mode::Temp),
            MenuState::HandoffToHourFormat => Some(Mode::Hour),
            _ => None,
        }
    }
}

pub struct Menu {
    state: MenuState,
}

impl Menu {
    pub fn new() -> Self {
        Self {
            state: MenuState::Init,
        }
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for Menu {
    type State = MenuState;

    fn state(&self) -> MenuState {
        self.state
    }

    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> MenuState {
        use MenuState::*;

        match self.state {
            Init => WaitForOwnership,
            WaitForOwnership if shared.tokens.holds(Mode::Menu) => ButtonDebounce,
            WaitForOwnership => WaitForOwnership,
            ButtonDebounce if inputs.left || inputs.right => ButtonDebounce,
            ButtonDebounce => Item1,
            Item1 => Item1Wait,
            Item1Wait => {
                if inputs.left && !inputs.right && !inputs.down {
                    HandoffToAlarm
                } else if inputs.right && !inputs.left && !inputs.down {
                    HandoffToClock
                } else if inputs.down_only() {
                    Item2
                } else {
                    Item1Wait
                }
            }
            Item2 => Item2Wait,
            Item2Wait => {
                if inputs.left_only() {
                    HandoffToTempUnit
                } else if inputs.right_only() {
                    HandoffToClock
                } else if inputs.up_only() {
                    Item1
                } else if inputs.down_only() {
                    Item3
                } else {
                    Item2Wait
                }
            }
            Item3 => Item3Wait,
            // last item, Down goes nowhere
            Item3Wait => {
                if inputs.left_only() {
                    HandoffToHourFormat
                } else if inputs.right_only() {
                    HandoffToClock
                } else if inputs.up_only() {
                    Item2
                } else {
                    Item3Wait
                }
            }
            HandoffToClock => WaitForOwnership,
            // back from a sub-mode: wait for the button that cancelled it
            state @ (HandoffToAlarm | HandoffToTempUnit | HandoffToHourFormat) => {
                if shared.tokens.holds(Mode::Menu) {
                    ButtonDebounce
                } else if shared.tokens.holds(Mode::Clock) {
                    WaitForOwnership
                } else {
                    state
                }
            }
        }
    }

    fn enter<D: CharDisplay>(
        &mut self,
        next: MenuState,
        from: MenuState,
        cx: &mut Context<'_, D>,
        _outcome: RtcOutcome,
    ) -> Result<(), TokenError> {
        if next != from {
            trace!("menu: {:?} -> {:?}", from, next);
        }
        self.state = next;

        match next {
            MenuState::Item1 => {
                ensure_holder(cx.shared, Mode::Menu)?;
                draw_prompt(cx.display, "Menu", "1. Alarm <-");
            }
            MenuState::Item2 => {
                ensure_holder(cx.shared, Mode::Menu)?;
                draw_prompt(cx.display, "1. Alarm", "2. F/C <-");
            }
            MenuState::Item3 => {
                ensure_holder(cx.shared, Mode::Menu)?;
                draw_prompt(cx.display, "2. F/C", "3. 12/24H <-");
            }
            MenuState::HandoffToClock => {
                cx.display.clear();
                cx.shared.tokens.transfer(Mode::Menu, Mode::Clock)?;
            }
            state => {
                if let Some(target) = state.handoff_target() {
                    if cx.shared.tokens.holds(Mode::Menu) {
                        cx.shared.tokens.transfer(Mode::Menu, target)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = MenuState::Init;
    }
}

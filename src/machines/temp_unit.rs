//! Fahrenheit / Celsius picker.

use super::{draw_prompt, ensure_holder, Context, Machine, RtcOutcome};
use crate::{CharDisplay, Inputs, Mode, Shared, TempUnit, TokenError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempUnitState {
    Init,
    WaitForOwnership,
    ButtonDebounce,
    Choice,
    /// Fahrenheit
    CommitLeft,
    /// Celsius
    CommitRight,
}

pub struct TempUnitSet {
    state: TempUnitState,
}

impl TempUnitSet {
    pub fn new() -> Self {
        Self {
            state: TempUnitState::Init,
        }
    }
}

impl Default for TempUnitSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for TempUnitSet {
    type State = TempUnitState;

    fn state(&self) -> TempUnitState {
        self.state
    }

    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> TempUnitState {
        use TempUnitState::*;

        match self.state {
            Init => WaitForOwnership,
            WaitForOwnership if shared.tokens.holds(Mode::Temp) => ButtonDebounce,
            WaitForOwnership => WaitForOwnership,
            ButtonDebounce if inputs.left || inputs.right => ButtonDebounce,
            ButtonDebounce => Choice,
            Choice if inputs.left_only() => CommitLeft,
            Choice if inputs.right_only() => CommitRight,
            Choice => Choice,
            CommitLeft | CommitRight => WaitForOwnership,
        }
    }

    fn enter<D: CharDisplay>(
        &mut self,
        next: TempUnitState,
        from: TempUnitState,
        cx: &mut Context<'_, D>,
        _outcome: RtcOutcome,
    ) -> Result<(), TokenError> {
        if next != from {
            trace!("temp unit: {:?} -> {:?}", from, next);
        }
        self.state = next;

        let unit = match next {
            TempUnitState::ButtonDebounce if from != TempUnitState::ButtonDebounce => {
                ensure_holder(cx.shared, Mode::Temp)?;
                draw_prompt(cx.display, "L:Fahrenheit", "R:Celsius");
                return Ok(());
            }
            TempUnitState::CommitLeft => TempUnit::Fahrenheit,
            TempUnitState::CommitRight => TempUnit::Celsius,
            _ => return Ok(()),
        };

        cx.shared.tokens.transfer(Mode::Temp, Mode::Clock)?;
        cx.shared.settings.temp_unit = unit;
        info!("temperature unit set to {:?}", unit);
        cx.display.clear();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = TempUnitState::Init;
    }
}

//! Tick-driven mode machines.
//!
//! Every machine advances once per tick in two steps: [`Machine::next_state`]
//! picks the next state from the inputs and the shared state without side
//! effects, then [`Machine::enter`] runs the action of that state. RTC work the
//! action depends on is announced up front through [`Machine::request`] so the
//! caller can run it on a blocking or an async bus before the action runs.

use core::fmt::Debug;

use crate::{CharDisplay, Config, HourFormat, Inputs, Mode, Shared, TokenError};

pub mod alarm_set;
pub mod clock;
pub mod hour_format;
pub mod menu;
pub mod signal;
pub mod temp_unit;

pub use alarm_set::{AlarmSet, AlarmSetState};
pub use clock::{ClockDisplay, ClockState};
pub use hour_format::{HourFormatSet, HourFormatState};
pub use menu::{Menu, MenuState};
pub use signal::{AlarmSignal, SignalState};
pub use temp_unit::{TempUnitSet, TempUnitState};

/// RTC work needed before a state's action can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcRequest {
    /// Read time and temperature into the shared cache
    RefreshTime,
    /// Re-express the peripheral's hours register in the given format
    ConvertHourFormat(HourFormat),
}

/// Result of an [`RtcRequest`], handed to the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcOutcome {
    NotRequested,
    Completed,
    Failed,
}

/// What an action may touch.
pub struct Context<'a, D> {
    pub inputs: &'a Inputs,
    pub shared: &'a mut Shared,
    pub display: &'a mut D,
    pub config: &'a Config,
}

pub trait Machine {
    type State: Copy + PartialEq + Debug;

    fn state(&self) -> Self::State;

    /// Next state for the given inputs. Pure.
    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> Self::State;

    /// RTC work the action of `next` needs, if any.
    fn request(&self, _next: Self::State, _shared: &Shared) -> Option<RtcRequest> {
        None
    }

    /// Moves to `next` and runs its action. `from` is the state left behind.
    fn enter<D: CharDisplay>(
        &mut self,
        next: Self::State,
        from: Self::State,
        cx: &mut Context<'_, D>,
        outcome: RtcOutcome,
    ) -> Result<(), TokenError>;

    /// Back to `Init`.
    fn reset(&mut self);
}

/// Fails unless `mode` holds the token.
pub(crate) fn ensure_holder(shared: &Shared, mode: Mode) -> Result<(), TokenError> {
    if shared.tokens.holds(mode) {
        Ok(())
    } else {
        Err(TokenError::NotHolder {
            from: mode,
            holder: shared.tokens.holder(),
        })
    }
}

/// Draws a two-line prompt on a cleared screen.
pub(crate) fn draw_prompt<D: CharDisplay>(display: &mut D, first: &str, second: &str) {
    display.clear();
    display.write_str(1, first);
    display.write_str(17, second);
}

/// Writes `value` as two digits at `position`.
pub(crate) fn draw_two_digits<D: CharDisplay>(display: &mut D, position: u8, value: u8) {
    display.write_char(position, digit(value / 10));
    display.write_char(position.saturating_add(1), digit(value % 10));
}

fn digit(value: u8) -> char {
    char::from_digit(u32::from(value % 10), 10).unwrap_or('?')
}

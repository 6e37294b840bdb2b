//! Clock view: time, temperature and date.

use core::fmt::Write;

use heapless::String;

use super::{ensure_holder, Context, Machine, RtcOutcome, RtcRequest};
use crate::codec::decode_temperature;
use crate::time::weekday_label;
use crate::{CharDisplay, HourFormat, Inputs, Mode, Shared, TokenError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    Init,
    /// Refresh the cache and redraw
    ActiveDisplay,
    /// Wait for Left or the refresh timeout
    ButtonDebounceWait,
    /// Token handed to the menu, wait for it to come back
    HandoffToMenu,
}

pub struct ClockDisplay {
    state: ClockState,
    idle_ticks: u16,
    refresh_ticks: u16,
}

impl ClockDisplay {
    pub fn new(refresh_ticks: u16) -> Self {
        Self {
            state: ClockState::Init,
            idle_ticks: 0,
            refresh_ticks,
        }
    }

    fn render<D: CharDisplay>(display: &mut D, shared: &Shared) {
        let time = &shared.time;
        let settings = &shared.settings;

        let mut top: String<16> = String::new();
        let mut bottom: String<16> = String::new();

        let meridiem = match (settings.hour_format, time.meridiem) {
            (HourFormat::TwelveHour, Some(meridiem)) => meridiem.label(),
            _ => "  ",
        };
        let temperature = decode_temperature(shared.temperature, settings.temp_unit);
        let top_ok = write!(
            top,
            "{:02}:{:02}{}{:>3}{}",
            time.hour,
            time.minute,
            meridiem,
            temperature,
            settings.temp_unit.symbol()
        );
        let bottom_ok = write!(
            bottom,
            "{:02}/{:02}/20{:02} {}",
            time.month,
            time.date,
            time.year,
            weekday_label(time.weekday)
        );
        if top_ok.is_err() || bottom_ok.is_err() {
            warn!("clock: display line truncated");
        }

        display.clear();
        display.write_str(1, &top);
        display.write_str(17, &bottom);
    }
}

impl Machine for ClockDisplay {
    type State = ClockState;

    fn state(&self) -> ClockState {
        self.state
    }

    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> ClockState {
        match self.state {
            ClockState::Init => ClockState::ActiveDisplay,
            ClockState::ActiveDisplay => ClockState::ButtonDebounceWait,
            ClockState::ButtonDebounceWait => {
                if inputs.left_only() {
                    ClockState::HandoffToMenu
                } else if self.idle_ticks >= self.refresh_ticks {
                    ClockState::ActiveDisplay
                } else {
                    ClockState::ButtonDebounceWait
                }
            }
            ClockState::HandoffToMenu => {
                if shared.tokens.holds(Mode::Clock) {
                    ClockState::ActiveDisplay
                } else {
                    ClockState::HandoffToMenu
                }
            }
        }
    }

    fn request(&self, next: ClockState, _shared: &Shared) -> Option<RtcRequest> {
        match next {
            ClockState::ActiveDisplay => Some(RtcRequest::RefreshTime),
            _ => None,
        }
    }

    fn enter<D: CharDisplay>(
        &mut self,
        next: ClockState,
        from: ClockState,
        cx: &mut Context<'_, D>,
        outcome: RtcOutcome,
    ) -> Result<(), TokenError> {
        if next != from {
            trace!("clock: {:?} -> {:?}", from, next);
        }
        self.state = next;

        match next {
            ClockState::Init => {}
            ClockState::ActiveDisplay => {
                self.idle_ticks = 0;
                ensure_holder(cx.shared, Mode::Clock)?;
                // a failed periodic refresh leaves the screen as it is
                if outcome == RtcOutcome::Failed && from == ClockState::ButtonDebounceWait {
                    debug!("clock: refresh skipped, RTC unavailable");
                    return Ok(());
                }
                Self::render(cx.display, cx.shared);
            }
            ClockState::ButtonDebounceWait => {
                self.idle_ticks = self.idle_ticks.saturating_add(1);
            }
            ClockState::HandoffToMenu => {
                if cx.shared.tokens.holds(Mode::Clock) {
                    cx.shared.tokens.transfer(Mode::Clock, Mode::Menu)?;
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = ClockState::Init;
        self.idle_ticks = 0;
    }
}

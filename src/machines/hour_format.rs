//! 12-hour / 24-hour picker.
//!
//! Committing a format converts the peripheral's hours register first. The
//! setting and any armed alarm only change once the RTC has been converted, so
//! the cached time and the display preference never drift apart for longer
//! than one refresh.

use super::{draw_prompt, ensure_holder, Context, Machine, RtcOutcome, RtcRequest};
use crate::{CharDisplay, HourFormat, Inputs, Mode, Shared, TokenError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormatState {
    Init,
    WaitForOwnership,
    ButtonDebounce,
    Choice,
    /// 12-hour
    CommitLeft,
    /// 24-hour
    CommitRight,
}

impl HourFormatState {
    fn chosen(self) -> Option<HourFormat> {
        match self {
            HourFormatState::CommitLeft => Some(HourFormat::TwelveHour),
            HourFormatState::CommitRight => Some(HourFormat::TwentyFourHour),
            _ => None,
        }
    }
}

pub struct HourFormatSet {
    state: HourFormatState,
}

impl HourFormatSet {
    pub fn new() -> Self {
        Self {
            state: HourFormatState::Init,
        }
    }
}

impl Default for HourFormatSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for HourFormatSet {
    type State = HourFormatState;

    fn state(&self) -> HourFormatState {
        self.state
    }

    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> HourFormatState {
        use HourFormatState::*;

        match self.state {
            Init => WaitForOwnership,
            WaitForOwnership if shared.tokens.holds(Mode::Hour) => ButtonDebounce,
            WaitForOwnership => WaitForOwnership,
            ButtonDebounce if inputs.left || inputs.right => ButtonDebounce,
            ButtonDebounce => Choice,
            Choice if inputs.left_only() => CommitLeft,
            Choice if inputs.right_only() => CommitRight,
            Choice => Choice,
            CommitLeft | CommitRight => WaitForOwnership,
        }
    }

    fn request(&self, next: HourFormatState, shared: &Shared) -> Option<RtcRequest> {
        // only the holder may write the RTC
        if !shared.tokens.holds(Mode::Hour) {
            return None;
        }
        next.chosen().map(RtcRequest::ConvertHourFormat)
    }

    fn enter<D: CharDisplay>(
        &mut self,
        next: HourFormatState,
        from: HourFormatState,
        cx: &mut Context<'_, D>,
        outcome: RtcOutcome,
    ) -> Result<(), TokenError> {
        if next != from {
            trace!("hour format: {:?} -> {:?}", from, next);
        }
        self.state = next;

        if next == HourFormatState::ButtonDebounce && from != HourFormatState::ButtonDebounce {
            ensure_holder(cx.shared, Mode::Hour)?;
            draw_prompt(cx.display, "L:12H", "R:24H");
            return Ok(());
        }
        let Some(format) = next.chosen() else {
            return Ok(());
        };

        cx.shared.tokens.transfer(Mode::Hour, Mode::Clock)?;
        match outcome {
            RtcOutcome::Completed => {
                cx.shared.settings.hour_format = format;
                cx.shared.alarm = cx.shared.alarm.map(|alarm| alarm.in_format(format));
                info!("hour format set to {:?}", format);
            }
            _ => {
                warn!(
                    "hour format: RTC conversion failed, keeping {:?}",
                    cx.shared.settings.hour_format
                );
            }
        }
        cx.display.clear();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = HourFormatState::Init;
    }
}

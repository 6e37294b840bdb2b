//! Alarm editor.
//!
//! Edits a private draft field by field: hour, minute and, in 12-hour format,
//! the meridiem. Up/Down change the field under the cursor, Left moves on and
//! commits after the last field, Right moves back and cancels from the first
//! field. The shared alarm is only written on commit.

use super::{draw_prompt, draw_two_digits, ensure_holder, Context, Machine, RtcOutcome};
use crate::{AlarmSetting, CharDisplay, HourFormat, Inputs, Meridiem, Mode, Shared, TokenError};

const HOUR_POSITION: u8 = 17;
const MINUTE_POSITION: u8 = 20;
const MERIDIEM_POSITION: u8 = 22;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmSetState {
    Init,
    WaitForOwnership,
    ButtonDebounce,
    ShowHour,
    EditHour,
    IncrementHour,
    DecrementHour,
    ShowMinute,
    EditMinute,
    IncrementMinute,
    DecrementMinute,
    ShowMeridiem,
    EditMeridiem,
    ToggleMeridiem,
    Commit,
    Cancel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Key {
    Left,
    Right,
    Up,
    Down,
}

// Exactly one of the four directions.
fn single_key(inputs: &Inputs) -> Option<Key> {
    match (inputs.left, inputs.right, inputs.up, inputs.down) {
        (true, false, false, false) => Some(Key::Left),
        (false, true, false, false) => Some(Key::Right),
        (false, false, true, false) => Some(Key::Up),
        (false, false, false, true) => Some(Key::Down),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Draft {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            hour: 12,
            minute: 0,
            meridiem: Meridiem::Am,
        }
    }
}

fn increment_hour(hour: u8, format: HourFormat) -> u8 {
    match format {
        HourFormat::TwelveHour if hour >= 12 => 1,
        HourFormat::TwentyFourHour if hour >= 23 => 0,
        _ => hour + 1,
    }
}

fn decrement_hour(hour: u8, format: HourFormat) -> u8 {
    match format {
        HourFormat::TwelveHour if hour <= 1 => 12,
        HourFormat::TwentyFourHour if hour == 0 => 23,
        _ => hour - 1,
    }
}

fn increment_minute(minute: u8) -> u8 {
    if minute >= 59 {
        0
    } else {
        minute + 1
    }
}

fn decrement_minute(minute: u8) -> u8 {
    if minute == 0 {
        59
    } else {
        minute - 1
    }
}

pub struct AlarmSet {
    state: AlarmSetState,
    draft: Draft,
}

impl AlarmSet {
    pub fn new() -> Self {
        Self {
            state: AlarmSetState::Init,
            draft: Draft::default(),
        }
    }

    /// Draft as it would be committed in `format`.
    pub fn draft(&self, format: HourFormat) -> AlarmSetting {
        AlarmSetting {
            hour: self.draft.hour,
            minute: self.draft.minute,
            meridiem: match format {
                HourFormat::TwelveHour => Some(self.draft.meridiem),
                HourFormat::TwentyFourHour => None,
            },
        }
    }
}

impl Default for AlarmSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for AlarmSet {
    type State = AlarmSetState;

    fn state(&self) -> AlarmSetState {
        self.state
    }

    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> AlarmSetState {
        use AlarmSetState::*;

        let key = single_key(inputs);
        match self.state {
            Init => WaitForOwnership,
            WaitForOwnership if shared.tokens.holds(Mode::Alarm) => ButtonDebounce,
            WaitForOwnership => WaitForOwnership,
            ButtonDebounce if inputs.left || inputs.right => ButtonDebounce,
            ButtonDebounce => EditHour,

            ShowHour => EditHour,
            IncrementHour | DecrementHour => ShowHour,
            EditHour => match key {
                Some(Key::Left) => ShowMinute,
                Some(Key::Right) => Cancel,
                Some(Key::Up) => IncrementHour,
                Some(Key::Down) => DecrementHour,
                None => EditHour,
            },

            ShowMinute => EditMinute,
            IncrementMinute | DecrementMinute => ShowMinute,
            EditMinute => match key {
                Some(Key::Left) => match shared.settings.hour_format {
                    HourFormat::TwentyFourHour => Commit,
                    HourFormat::TwelveHour => ShowMeridiem,
                },
                Some(Key::Right) => ShowHour,
                Some(Key::Up) => IncrementMinute,
                Some(Key::Down) => DecrementMinute,
                None => EditMinute,
            },

            ShowMeridiem => EditMeridiem,
            ToggleMeridiem => ShowMeridiem,
            EditMeridiem => {
                if key == Some(Key::Left) {
                    Commit
                } else if key == Some(Key::Right) {
                    ShowMinute
                } else if inputs.up_only() || inputs.down_only() {
                    ToggleMeridiem
                } else {
                    EditMeridiem
                }
            }

            Commit | Cancel => WaitForOwnership,
        }
    }

    fn enter<D: CharDisplay>(
        &mut self,
        next: AlarmSetState,
        from: AlarmSetState,
        cx: &mut Context<'_, D>,
        _outcome: RtcOutcome,
    ) -> Result<(), TokenError> {
        use AlarmSetState::*;

        if next != from {
            trace!("alarm set: {:?} -> {:?}", from, next);
        }
        self.state = next;
        let format = cx.shared.settings.hour_format;

        match next {
            Init | WaitForOwnership | EditHour | EditMinute | EditMeridiem => {}
            ButtonDebounce => {
                if from != ButtonDebounce {
                    ensure_holder(cx.shared, Mode::Alarm)?;
                    self.draft = Draft::default();
                    let draft = match format {
                        HourFormat::TwentyFourHour => "12:00",
                        HourFormat::TwelveHour => "12:00AM",
                    };
                    draw_prompt(cx.display, "Set Alarm", draft);
                    cx.display.set_cursor(HOUR_POSITION);
                }
            }
            ShowHour => {
                ensure_holder(cx.shared, Mode::Alarm)?;
                draw_two_digits(cx.display, HOUR_POSITION, self.draft.hour);
                cx.display.set_cursor(HOUR_POSITION);
            }
            IncrementHour => self.draft.hour = increment_hour(self.draft.hour, format),
            DecrementHour => self.draft.hour = decrement_hour(self.draft.hour, format),
            ShowMinute => {
                ensure_holder(cx.shared, Mode::Alarm)?;
                draw_two_digits(cx.display, MINUTE_POSITION, self.draft.minute);
                cx.display.set_cursor(MINUTE_POSITION);
            }
            IncrementMinute => self.draft.minute = increment_minute(self.draft.minute),
            DecrementMinute => self.draft.minute = decrement_minute(self.draft.minute),
            ShowMeridiem => {
                ensure_holder(cx.shared, Mode::Alarm)?;
                cx.display
                    .write_str(MERIDIEM_POSITION, self.draft.meridiem.label());
                cx.display.set_cursor(MERIDIEM_POSITION);
            }
            ToggleMeridiem => self.draft.meridiem = self.draft.meridiem.toggled(),
            Commit => {
                let alarm = self.draft(format);
                cx.shared.tokens.transfer(Mode::Alarm, Mode::Clock)?;
                info!("alarm set: armed {:?}", alarm);
                cx.shared.alarm = Some(alarm);
                cx.display.clear();
            }
            Cancel => {
                cx.shared.tokens.transfer(Mode::Alarm, Mode::Menu)?;
                debug!("alarm set: cancelled");
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = AlarmSetState::Init;
        self.draft = Draft::default();
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::{Harness, DOWN, LEFT, NONE, RIGHT, UP};
    use super::*;

    /// Editor with the token, editing the hour.
    fn editing(h: &mut Harness) -> AlarmSet {
        let mut alarm = AlarmSet::new();
        h.tick(&mut alarm, NONE);
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::ButtonDebounce);
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::EditHour);
        alarm
    }

    fn press(h: &mut Harness, alarm: &mut AlarmSet, inputs: Inputs) -> AlarmSetState {
        h.tick(alarm, inputs);
        // one tick to apply, one to redraw and land back in edit
        h.tick(alarm, NONE);
        h.tick(alarm, NONE)
    }

    #[test]
    fn test_prompt_and_default_draft() {
        let mut h = Harness::new(Mode::Alarm);
        let alarm = editing(&mut h);
        assert_eq!(h.display.line(1), "Set Alarm       ");
        assert_eq!(h.display.line(2), "12:00AM         ");
        assert_eq!(h.display.cursor, Some(17));
        assert_eq!(
            alarm.draft(HourFormat::TwelveHour),
            AlarmSetting {
                hour: 12,
                minute: 0,
                meridiem: Some(Meridiem::Am)
            }
        );
    }

    #[test]
    fn test_prompt_twenty_four_hour() {
        let mut h = Harness::new(Mode::Alarm);
        h.shared.settings.hour_format = HourFormat::TwentyFourHour;
        editing(&mut h);
        assert_eq!(h.display.line(2), "12:00           ");
    }

    #[test]
    fn test_hour_wraps_twelve_hour() {
        let mut h = Harness::new(Mode::Alarm);
        let mut alarm = editing(&mut h);

        // 12 -> 1
        assert_eq!(press(&mut h, &mut alarm, UP), AlarmSetState::EditHour);
        assert_eq!(alarm.draft.hour, 1);
        assert_eq!(h.display.text(17, 2), "01");
        // 1 -> 12
        press(&mut h, &mut alarm, DOWN);
        assert_eq!(alarm.draft.hour, 12);
        assert_eq!(h.display.text(17, 2), "12");
    }

    #[test]
    fn test_hour_wraps_twenty_four_hour() {
        assert_eq!(increment_hour(23, HourFormat::TwentyFourHour), 0);
        assert_eq!(decrement_hour(0, HourFormat::TwentyFourHour), 23);
        assert_eq!(increment_hour(11, HourFormat::TwentyFourHour), 12);
        assert_eq!(increment_hour(12, HourFormat::TwelveHour), 1);
        assert_eq!(decrement_hour(1, HourFormat::TwelveHour), 12);
    }

    #[test]
    fn test_minute_wraps() {
        assert_eq!(decrement_minute(0), 59);
        assert_eq!(increment_minute(59), 0);
        assert_eq!(increment_minute(7), 8);
    }

    #[test]
    fn test_commit_twelve_hour() {
        let mut h = Harness::new(Mode::Alarm);
        let mut alarm = editing(&mut h);

        press(&mut h, &mut alarm, UP); // 1
        press(&mut h, &mut alarm, UP); // 2
        assert_eq!(h.tick(&mut alarm, LEFT), AlarmSetState::ShowMinute);
        assert_eq!(h.display.cursor, Some(20));
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::EditMinute);
        press(&mut h, &mut alarm, DOWN); // 59
        assert_eq!(h.display.text(20, 2), "59");

        assert_eq!(h.tick(&mut alarm, LEFT), AlarmSetState::ShowMeridiem);
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::EditMeridiem);
        assert_eq!(press(&mut h, &mut alarm, DOWN), AlarmSetState::EditMeridiem);
        assert_eq!(h.display.text(22, 2), "PM");

        assert_eq!(h.tick(&mut alarm, LEFT), AlarmSetState::Commit);
        assert_eq!(
            h.shared.alarm,
            Some(AlarmSetting {
                hour: 2,
                minute: 59,
                meridiem: Some(Meridiem::Pm)
            })
        );
        assert!(h.shared.tokens.holds(Mode::Clock));
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::WaitForOwnership);
    }

    #[test]
    fn test_commit_twenty_four_hour_skips_meridiem() {
        let mut h = Harness::new(Mode::Alarm);
        h.shared.settings.hour_format = HourFormat::TwentyFourHour;
        let mut alarm = editing(&mut h);

        press(&mut h, &mut alarm, DOWN); // 11
        h.tick(&mut alarm, LEFT);
        h.tick(&mut alarm, NONE);
        assert_eq!(h.tick(&mut alarm, LEFT), AlarmSetState::Commit);
        assert_eq!(
            h.shared.alarm,
            Some(AlarmSetting {
                hour: 11,
                minute: 0,
                meridiem: None
            })
        );
    }

    #[test]
    fn test_right_steps_back_then_cancels() {
        let mut h = Harness::new(Mode::Alarm);
        let mut alarm = editing(&mut h);

        h.tick(&mut alarm, LEFT);
        h.tick(&mut alarm, NONE);
        assert_eq!(h.tick(&mut alarm, RIGHT), AlarmSetState::ShowHour);
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::EditHour);
        assert_eq!(h.tick(&mut alarm, RIGHT), AlarmSetState::Cancel);
        assert!(h.shared.tokens.holds(Mode::Menu));
        assert_eq!(h.shared.alarm, None);
    }

    #[test]
    fn test_right_on_meridiem_returns_to_minute() {
        let mut h = Harness::new(Mode::Alarm);
        let mut alarm = editing(&mut h);

        h.tick(&mut alarm, LEFT);
        h.tick(&mut alarm, NONE);
        assert_eq!(h.tick(&mut alarm, LEFT), AlarmSetState::ShowMeridiem);
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::EditMeridiem);

        assert_eq!(h.tick(&mut alarm, RIGHT), AlarmSetState::ShowMinute);
        assert_eq!(h.display.cursor, Some(20));
        assert_eq!(h.tick(&mut alarm, NONE), AlarmSetState::EditMinute);
        assert_eq!(h.shared.alarm, None);
        assert!(h.shared.tokens.holds(Mode::Alarm));

        // editing continues from the minute field
        assert_eq!(press(&mut h, &mut alarm, UP), AlarmSetState::EditMinute);
        assert_eq!(h.display.text(20, 2), "01");
    }

    #[test]
    fn test_chorded_input_ignored() {
        let mut h = Harness::new(Mode::Alarm);
        let mut alarm = editing(&mut h);
        let chord = Inputs {
            up: true,
            left: true,
            ..Inputs::NONE
        };
        assert_eq!(h.tick(&mut alarm, chord), AlarmSetState::EditHour);
        assert_eq!(alarm.draft.hour, 12);
    }

    #[test]
    fn test_new_session_resets_draft() {
        let mut h = Harness::new(Mode::Alarm);
        let mut alarm = editing(&mut h);
        press(&mut h, &mut alarm, UP);
        h.tick(&mut alarm, RIGHT); // cancel
        h.tick(&mut alarm, NONE);

        h.shared.tokens.transfer(Mode::Menu, Mode::Alarm).unwrap();
        h.tick(&mut alarm, NONE);
        assert_eq!(alarm.draft.hour, 12);
    }
}

//! Time-keeping register burst and its decoded form.
//!
//! The DS3231 keeps the time in 7 consecutive BCD registers (seconds,
//! minutes, hours, weekday, date, month, year). [`RawTime`] is one burst of
//! those registers, [`TimeSample`] the decoded values the clock displays and
//! compares against the alarm.
//!
//! Decoding never fails: malformed BCD decodes nibble-wise and an out-of-range
//! weekday is kept as-is so the display can show a fallback label. Encoding
//! from a chrono `NaiveDateTime` validates the year, which the peripheral
//! stores as two digits.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::codec::{bcd_decode, bcd_encode, decode_hours, encode_hours, to_twelve_hour};
use crate::{HourFormat, Hours, Meridiem, Month};

/// Weekday names for codes 1 (Sunday) to 7 (Saturday).
pub const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Shown instead of a weekday name when the weekday register is out of range.
pub const UNKNOWN_WEEKDAY: &str = "???";

/// Display name for a weekday register value.
pub fn weekday_label(code: u8) -> &'static str {
    code.checked_sub(1)
        .and_then(|index| WEEKDAY_NAMES.get(usize::from(index)))
        .copied()
        .unwrap_or(UNKNOWN_WEEKDAY)
}

/// One burst of the 7 time-keeping registers, in register order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RawTime {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: Hours,
    pub weekday: u8,
    pub date: u8,
    pub month: Month,
    pub year: u8,
}

impl From<[u8; 7]> for RawTime {
    fn from(data: [u8; 7]) -> Self {
        RawTime {
            seconds: data[0],
            minutes: data[1],
            hours: Hours::from(data[2]),
            weekday: data[3],
            date: data[4],
            month: Month::from(data[5]),
            year: data[6],
        }
    }
}

impl From<&RawTime> for [u8; 7] {
    fn from(raw: &RawTime) -> [u8; 7] {
        [
            raw.seconds,
            raw.minutes,
            raw.hours.into(),
            raw.weekday,
            raw.date,
            raw.month.into(),
            raw.year,
        ]
    }
}

/// Errors that can occur converting a calendar value to register contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// The year is before 2000
    YearNotAfter1999,
    /// The year is after 2099; only two year digits are kept
    YearNotBefore2100,
}

/// Decoded time as last read from the peripheral.
///
/// `meridiem` is present exactly when the peripheral's hours register is in
/// 12-hour mode, independent of the application's display preference.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeSample {
    /// 0-23, or 1-12 when `meridiem` is set
    pub hour: u8,
    pub meridiem: Option<Meridiem>,
    pub minute: u8,
    pub second: u8,
    /// 1 (Sunday) to 7 (Saturday) on a healthy peripheral
    pub weekday: u8,
    pub date: u8,
    pub month: u8,
    /// Two-digit year, 0-99
    pub year: u8,
}

impl TimeSample {
    /// Format the hour was decoded in.
    pub fn format(&self) -> HourFormat {
        match self.meridiem {
            Some(_) => HourFormat::TwelveHour,
            None => HourFormat::TwentyFourHour,
        }
    }

    /// Builds a sample from a calendar value, expressed in `format`.
    ///
    /// # Errors
    ///
    /// Returns a [`TimeError`] if the year is outside 2000-2099.
    pub fn from_datetime(
        datetime: &NaiveDateTime,
        format: HourFormat,
    ) -> Result<Self, TimeError> {
        let year = datetime.year();
        if year < 2000 {
            error!("Year {} is too early! must be greater than 1999", year);
            return Err(TimeError::YearNotAfter1999);
        }
        if year > 2099 {
            error!("Year {} is too late! must be before 2100", year);
            return Err(TimeError::YearNotBefore2100);
        }

        // chrono values below are bounded (hour < 24, minute < 60, ...)
        let hour = datetime.hour() as u8;
        let (hour, meridiem) = match format {
            HourFormat::TwentyFourHour => (hour, None),
            HourFormat::TwelveHour => {
                let (hour, meridiem) = to_twelve_hour(hour);
                (hour, Some(meridiem))
            }
        };

        Ok(TimeSample {
            hour,
            meridiem,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
            weekday: datetime.weekday().number_from_sunday() as u8,
            date: datetime.day() as u8,
            month: datetime.month() as u8,
            year: (year - 2000) as u8,
        })
    }
}

impl From<RawTime> for TimeSample {
    fn from(raw: RawTime) -> Self {
        let (hour, meridiem) = decode_hours(raw.hours);
        let sample = TimeSample {
            hour,
            meridiem,
            minute: bcd_decode(raw.minutes & 0x7F),
            second: bcd_decode(raw.seconds & 0x7F),
            weekday: raw.weekday,
            date: bcd_decode(raw.date & 0x3F),
            month: bcd_decode(raw.month.month_bcd()),
            year: bcd_decode(raw.year),
        };
        trace!("raw_hour={:?} sample={:?}", raw.hours, sample);
        sample
    }
}

impl From<&TimeSample> for RawTime {
    fn from(sample: &TimeSample) -> Self {
        RawTime {
            seconds: bcd_encode(sample.second),
            minutes: bcd_encode(sample.minute),
            hours: encode_hours(sample.hour, sample.meridiem),
            weekday: sample.weekday,
            date: bcd_encode(sample.date),
            month: Month::from(bcd_encode(sample.month)),
            year: bcd_encode(sample.year),
        }
    }
}

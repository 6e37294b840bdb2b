//! Application state shared by the mode machines.

use crate::codec::{to_twelve_hour, to_twenty_four_hour};
use crate::{HourFormat, Meridiem, TempUnit, Temperature, TimeSample, Tokens};

/// Display preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FormatSettings {
    pub hour_format: HourFormat,
    pub temp_unit: TempUnit,
}

/// An armed alarm.
///
/// `meridiem` is set exactly when the alarm is expressed in 12-hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSetting {
    pub hour: u8,
    pub minute: u8,
    pub meridiem: Option<Meridiem>,
}

impl AlarmSetting {
    pub fn format(&self) -> HourFormat {
        match self.meridiem {
            Some(_) => HourFormat::TwelveHour,
            None => HourFormat::TwentyFourHour,
        }
    }

    /// The same instant of day expressed in `format`.
    #[must_use]
    pub fn in_format(self, format: HourFormat) -> Self {
        match (self.meridiem, format) {
            (Some(meridiem), HourFormat::TwentyFourHour) => AlarmSetting {
                hour: to_twenty_four_hour(self.hour, meridiem),
                meridiem: None,
                ..self
            },
            (None, HourFormat::TwelveHour) => {
                let (hour, meridiem) = to_twelve_hour(self.hour);
                AlarmSetting {
                    hour,
                    meridiem: Some(meridiem),
                    ..self
                }
            }
            _ => self,
        }
    }

    /// Whether `time` falls in the alarm's minute. Seconds are ignored.
    pub fn matches(&self, time: &TimeSample) -> bool {
        let alarm = self.in_format(time.format());
        alarm.hour == time.hour && alarm.minute == time.minute && alarm.meridiem == time.meridiem
    }
}

/// State shared by every machine, owned by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shared {
    /// Last successfully read time
    pub time: TimeSample,
    /// Last successfully read temperature
    pub temperature: Temperature,
    pub settings: FormatSettings,
    /// `None` while unarmed
    pub alarm: Option<AlarmSetting>,
    pub tokens: Tokens,
    /// Sensor pulses counted while the alarm is sounding
    pub heartbeat: u8,
}

impl Shared {
    pub fn new(settings: FormatSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}

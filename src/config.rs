//! Startup configuration.

use crate::{HourFormat, TempUnit};

/// Analog joystick axis split into Up/Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickThresholds {
    /// Readings strictly above this count as Up
    pub up_above: u16,
    /// Readings strictly below this count as Down
    pub down_below: u16,
}

impl JoystickThresholds {
    /// Returns `(up, down)` for an axis reading.
    pub fn classify(&self, reading: u16) -> (bool, bool) {
        (reading > self.up_above, reading < self.down_below)
    }
}

impl Default for JoystickThresholds {
    fn default() -> Self {
        Self {
            up_above: 750,
            down_below: 200,
        }
    }
}

/// Alarm clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Tick period of the interactive machines in milliseconds
    pub interactive_period_ms: u32,
    /// Tick period of the alarm signal machine in milliseconds
    pub signal_period_ms: u32,
    /// Clock view redraws after this many idle ticks
    pub refresh_ticks: u16,
    /// Heartbeat pulses that silence a ringing alarm (strictly more than this)
    pub heartbeat_threshold: u8,
    /// Hour format applied to the RTC at startup
    pub hour_format: HourFormat,
    /// Temperature unit at startup
    pub temp_unit: TempUnit,
    pub joystick: JoystickThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interactive_period_ms: 200,
            signal_period_ms: 500,
            refresh_ticks: 150,
            heartbeat_threshold: 6,
            hour_format: HourFormat::TwelveHour,
            temp_unit: TempUnit::Fahrenheit,
            joystick: JoystickThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joystick_classify() {
        let thresholds = JoystickThresholds::default();
        assert_eq!(thresholds.classify(512), (false, false));
        assert_eq!(thresholds.classify(751), (true, false));
        assert_eq!(thresholds.classify(750), (false, false));
        assert_eq!(thresholds.classify(199), (false, true));
        assert_eq!(thresholds.classify(200), (false, false));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.hour_format, HourFormat::TwelveHour);
        assert_eq!(config.temp_unit, TempUnit::Fahrenheit);
        assert!(config.signal_period_ms > config.interactive_period_ms);
    }
}

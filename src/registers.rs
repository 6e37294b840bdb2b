//! Register map and bitfield register types for the DS3231 RTC.
//!
//! Only the registers the alarm clock touches are modelled: the seven
//! time-keeping registers read and written as one burst, the hours register
//! on its own (for 12/24-hour reconciliation) and the temperature MSB.

use bitfield::bitfield;

/// Register addresses used by the alarm clock.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59), start of every time burst
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Day of week register (1-7)
    Weekday = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12) with century flag
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Temperature MSB register (signed whole degrees Celsius)
    MSBTemp = 0x11,
}

/// Hour format, both as stored in bit 6 of the hours register and as the
/// application's display preference.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    #[default]
    TwelveHour = 1,
}

impl From<u8> for HourFormat {
    /// Creates an `HourFormat` from the hours register mode bit.
    fn from(v: u8) -> Self {
        match v & 0x01 {
            0 => HourFormat::TwentyFourHour,
            _ => HourFormat::TwelveHour,
        }
    }
}

impl From<HourFormat> for u8 {
    fn from(v: HourFormat) -> Self {
        v as u8
    }
}

/// AM/PM indicator. Only meaningful while the hours register is in 12-hour
/// mode, where it lives in bit 5.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridiem {
    #[default]
    Am = 0,
    Pm = 1,
}

impl Meridiem {
    /// Two-letter display label.
    pub fn label(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }

    /// The other half of the day.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

impl From<u8> for Meridiem {
    fn from(v: u8) -> Self {
        match v & 0x01 {
            0 => Meridiem::Am,
            _ => Meridiem::Pm,
        }
    }
}

impl From<Meridiem> for u8 {
    fn from(v: Meridiem) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Hours register with format selection and BCD encoding.
    ///
    /// The two hour ranges overlap on purpose: in 12-hour mode bit 5 is the
    /// PM flag and the hour occupies bits 4..0, in 24-hour mode bit 5 is the
    /// "twenty hours" digit and the hour occupies bits 5..0.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Hours(u8);
    impl Debug;
    /// Hour format selected on the peripheral
    pub from into HourFormat, format, set_format: 6, 6;
    /// PM flag (12-hour mode only)
    pub from into Meridiem, meridiem, set_meridiem: 5, 5;
    /// BCD hour, 12-hour mode (1-12)
    pub twelve_hour_bcd, set_twelve_hour_bcd: 4, 0;
    /// BCD hour, 24-hour mode (0-23)
    pub twenty_four_hour_bcd, set_twenty_four_hour_bcd: 5, 0;
}
from_register_u8!(Hours);

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        match self.format() {
            HourFormat::TwentyFourHour => {
                defmt::write!(f, "Hours({=u8:x} 24h)", self.twenty_four_hour_bcd());
            }
            HourFormat::TwelveHour => {
                defmt::write!(
                    f,
                    "Hours({=u8:x} {})",
                    self.twelve_hour_bcd(),
                    self.meridiem().label()
                );
            }
        }
    }
}

bitfield! {
    /// Month register (1-12) with century flag and BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Month(u8);
    impl Debug;
    /// Century flag, set by the peripheral when the year rolls past 99
    pub century, set_century: 7;
    /// BCD month (1-12)
    pub month_bcd, set_month_bcd: 4, 0;
}
from_register_u8!(Month);

#[cfg(feature = "defmt")]
impl defmt::Format for Month {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Month({=u8:x}", self.month_bcd());
        if self.century() {
            defmt::write!(f, ", century");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Temperature register (integer part).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Temperature(u8);
    impl Debug;
    /// Temperature in whole degrees Celsius (-128 to +127)
    pub i8, celsius, set_celsius: 7, 0;
}
from_register_u8!(Temperature);

#[cfg(feature = "defmt")]
impl defmt::Format for Temperature {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Temperature({}°C)", self.celsius());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_format_conversions() {
        assert_eq!(HourFormat::from(0), HourFormat::TwentyFourHour);
        assert_eq!(HourFormat::from(1), HourFormat::TwelveHour);
        assert_eq!(u8::from(HourFormat::TwentyFourHour), 0);
        assert_eq!(u8::from(HourFormat::TwelveHour), 1);
    }

    #[test]
    fn test_meridiem_conversions() {
        assert_eq!(Meridiem::from(0), Meridiem::Am);
        assert_eq!(Meridiem::from(1), Meridiem::Pm);
        assert_eq!(Meridiem::Am.toggled(), Meridiem::Pm);
        assert_eq!(Meridiem::Pm.toggled(), Meridiem::Am);
        assert_eq!(Meridiem::Pm.label(), "PM");
    }

    #[test]
    fn test_hours_register_twelve_hour_fields() {
        // 11 PM in 12-hour mode: mode bit, PM bit, BCD 11
        let hours = Hours::from(0x71);
        assert_eq!(hours.format(), HourFormat::TwelveHour);
        assert_eq!(hours.meridiem(), Meridiem::Pm);
        assert_eq!(hours.twelve_hour_bcd(), 0x11);
        assert_eq!(u8::from(hours), 0x71);
    }

    #[test]
    fn test_hours_register_twenty_four_hour_fields() {
        // 23:xx in 24-hour mode uses bit 5 as the twenty-hours digit
        let hours = Hours::from(0x23);
        assert_eq!(hours.format(), HourFormat::TwentyFourHour);
        assert_eq!(hours.twenty_four_hour_bcd(), 0x23);
    }

    #[test]
    fn test_hours_register_setters() {
        let mut hours = Hours::default();
        hours.set_format(HourFormat::TwelveHour);
        hours.set_meridiem(Meridiem::Pm);
        hours.set_twelve_hour_bcd(0x12);
        assert_eq!(hours.0, 0x72);

        let mut hours = Hours::default();
        hours.set_twenty_four_hour_bcd(0x19);
        assert_eq!(hours.0, 0x19);
        assert_eq!(hours.format(), HourFormat::TwentyFourHour);
    }

    #[test]
    fn test_month_register_conversions() {
        let month = Month::from(0x92);
        assert!(month.century());
        assert_eq!(month.month_bcd(), 0x12);
        assert_eq!(u8::from(month), 0x92);
    }

    #[test]
    fn test_temperature_register_conversions() {
        assert_eq!(Temperature::from(0x19).celsius(), 25);
        assert_eq!(Temperature::from(0xF6).celsius(), -10);
        let mut temp = Temperature::default();
        temp.set_celsius(-1);
        assert_eq!(u8::from(temp), 0xFF);
    }
}

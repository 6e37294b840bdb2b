//! BCD and hour-format conversions for the DS3231 registers.
//!
//! Everything here is pure: the functions take raw register values and return
//! raw register values or decoded numbers. Decoding is permissive, encoding
//! expects callers to range-check.

use crate::{HourFormat, Hours, Meridiem, Temperature};

/// Temperature display unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TempUnit {
    /// Unit glyph shown after the temperature.
    pub fn symbol(self) -> char {
        match self {
            TempUnit::Fahrenheit => 'F',
            TempUnit::Celsius => 'C',
        }
    }
}

/// Packs a decimal value (0-99) into tens/units nibbles.
///
/// Values outside 0-99 produce an unspecified byte.
pub fn bcd_encode(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Unpacks a BCD byte. Any byte is accepted; nibbles above 9 are decoded
/// as-is.
pub fn bcd_decode(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Converts a 12-hour clock reading to 0-23.
pub fn to_twenty_four_hour(hour: u8, meridiem: Meridiem) -> u8 {
    match (hour, meridiem) {
        (12, Meridiem::Am) => 0,
        (12, Meridiem::Pm) => 12,
        (h, Meridiem::Am) => h,
        (h, Meridiem::Pm) => h.saturating_add(12),
    }
}

/// Converts a 0-23 hour to a 12-hour clock reading.
pub fn to_twelve_hour(hour: u8) -> (u8, Meridiem) {
    match hour {
        0 => (12, Meridiem::Am),
        1..=11 => (hour, Meridiem::Am),
        12 => (12, Meridiem::Pm),
        h => (h - 12, Meridiem::Pm),
    }
}

/// Decodes the hours register in whatever format the peripheral is in.
///
/// Returns the hour and, in 12-hour mode, the meridiem.
pub fn decode_hours(hours: Hours) -> (u8, Option<Meridiem>) {
    match hours.format() {
        HourFormat::TwelveHour => (
            bcd_decode(hours.twelve_hour_bcd()),
            Some(hours.meridiem()),
        ),
        HourFormat::TwentyFourHour => (bcd_decode(hours.twenty_four_hour_bcd()), None),
    }
}

/// Encodes an hour into the hours register. A meridiem selects 12-hour mode.
pub fn encode_hours(hour: u8, meridiem: Option<Meridiem>) -> Hours {
    let mut value = Hours::default();
    match meridiem {
        Some(meridiem) => {
            value.set_format(HourFormat::TwelveHour);
            value.set_meridiem(meridiem);
            value.set_twelve_hour_bcd(bcd_encode(hour));
        }
        None => {
            value.set_format(HourFormat::TwentyFourHour);
            value.set_twenty_four_hour_bcd(bcd_encode(hour));
        }
    }
    value
}

/// Re-expresses the hours register in `requested` format.
///
/// Returns the register unchanged if it already is in that format. The
/// result has to be written back to the peripheral: its mode bit decides how
/// the hour is counted and reported from then on.
pub fn convert_hour_format(hours: Hours, requested: HourFormat) -> Hours {
    if hours.format() == requested {
        return hours;
    }
    match decode_hours(hours) {
        (hour, Some(meridiem)) => encode_hours(to_twenty_four_hour(hour, meridiem), None),
        (hour, None) => {
            let (hour, meridiem) = to_twelve_hour(hour);
            encode_hours(hour, Some(meridiem))
        }
    }
}

/// Converts the temperature MSB to a display value in `unit`.
///
/// Fahrenheit is `round(celsius * 1.8) + 32`, rounding half away from zero.
pub fn decode_temperature(raw: Temperature, unit: TempUnit) -> i16 {
    let celsius = i16::from(raw.celsius());
    match unit {
        TempUnit::Celsius => celsius,
        TempUnit::Fahrenheit => {
            // tenths of a degree
            let scaled = celsius * 18;
            let rounded = if scaled >= 0 {
                (scaled + 5) / 10
            } else {
                (scaled - 5) / 10
            };
            rounded + 32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_roundtrip_all_decimal_values() {
        for d in 0..=99u8 {
            assert_eq!(bcd_decode(bcd_encode(d)), d, "value {d}");
        }
    }

    #[test]
    fn test_bcd_known_values() {
        assert_eq!(bcd_encode(0), 0x00);
        assert_eq!(bcd_encode(9), 0x09);
        assert_eq!(bcd_encode(10), 0x10);
        assert_eq!(bcd_encode(59), 0x59);
        assert_eq!(bcd_decode(0x45), 45);
    }

    #[test]
    fn test_bcd_decode_is_permissive() {
        // malformed nibbles are decoded without validation
        assert_eq!(bcd_decode(0xFF), 165);
        assert_eq!(bcd_decode(0x1A), 20);
    }

    #[test]
    fn test_twelve_hour_mapping_edges() {
        assert_eq!(to_twelve_hour(0), (12, Meridiem::Am));
        assert_eq!(to_twelve_hour(11), (11, Meridiem::Am));
        assert_eq!(to_twelve_hour(12), (12, Meridiem::Pm));
        assert_eq!(to_twelve_hour(13), (1, Meridiem::Pm));
        assert_eq!(to_twelve_hour(23), (11, Meridiem::Pm));

        assert_eq!(to_twenty_four_hour(12, Meridiem::Am), 0);
        assert_eq!(to_twenty_four_hour(12, Meridiem::Pm), 12);
        assert_eq!(to_twenty_four_hour(1, Meridiem::Am), 1);
        assert_eq!(to_twenty_four_hour(11, Meridiem::Pm), 23);
    }

    #[test]
    fn test_convert_is_noop_in_same_format() {
        let twelve = Hours::from(0x52); // 12 AM
        assert_eq!(convert_hour_format(twelve, HourFormat::TwelveHour), twelve);
        let twenty_four = Hours::from(0x17);
        assert_eq!(
            convert_hour_format(twenty_four, HourFormat::TwentyFourHour),
            twenty_four
        );
    }

    #[test]
    fn test_convert_noon_pm_to_twenty_four_hour() {
        // 12 PM stays 12, neither 0 nor 24
        let converted = convert_hour_format(Hours::from(0x72), HourFormat::TwentyFourHour);
        assert_eq!(u8::from(converted), 0x12);
        assert_eq!(decode_hours(converted), (12, None));
    }

    #[test]
    fn test_convert_midnight_both_ways() {
        let converted = convert_hour_format(Hours::from(0x52), HourFormat::TwentyFourHour);
        assert_eq!(u8::from(converted), 0x00);

        let converted = convert_hour_format(Hours::from(0x00), HourFormat::TwelveHour);
        assert_eq!(u8::from(converted), 0x52);
        assert_eq!(decode_hours(converted), (12, Some(Meridiem::Am)));
    }

    #[test]
    fn test_convert_afternoon_to_twelve_hour() {
        let converted = convert_hour_format(Hours::from(0x15), HourFormat::TwelveHour);
        assert_eq!(u8::from(converted), 0x63); // 3 PM
    }

    #[test]
    fn test_convert_roundtrip_from_twenty_four_hour() {
        for hour in 0..24u8 {
            let raw = encode_hours(hour, None);
            let twelve = convert_hour_format(raw, HourFormat::TwelveHour);
            assert_eq!(twelve.format(), HourFormat::TwelveHour);
            let back = convert_hour_format(twelve, HourFormat::TwentyFourHour);
            assert_eq!(back, raw, "hour {hour}");
        }
    }

    #[test]
    fn test_convert_roundtrip_from_twelve_hour() {
        for meridiem in [Meridiem::Am, Meridiem::Pm] {
            for hour in 1..=12u8 {
                let raw = encode_hours(hour, Some(meridiem));
                let twenty_four = convert_hour_format(raw, HourFormat::TwentyFourHour);
                assert_eq!(twenty_four.format(), HourFormat::TwentyFourHour);
                let back = convert_hour_format(twenty_four, HourFormat::TwelveHour);
                assert_eq!(back, raw, "hour {hour} {meridiem:?}");
            }
        }
    }

    #[test]
    fn test_decode_temperature() {
        assert_eq!(decode_temperature(Temperature::from(25), TempUnit::Celsius), 25);
        assert_eq!(decode_temperature(Temperature::from(25), TempUnit::Fahrenheit), 77);
        assert_eq!(decode_temperature(Temperature::from(0), TempUnit::Fahrenheit), 32);
        // 22 * 1.8 = 39.6 rounds up
        assert_eq!(decode_temperature(Temperature::from(22), TempUnit::Fahrenheit), 72);
        // -10 * 1.8 = -18
        assert_eq!(decode_temperature(Temperature::from(0xF6), TempUnit::Fahrenheit), 14);
        // -1 * 1.8 = -1.8 rounds to -2
        assert_eq!(decode_temperature(Temperature::from(0xFF), TempUnit::Fahrenheit), 30);
        assert_eq!(decode_temperature(Temperature::from(0xF6), TempUnit::Celsius), -10);
    }
}

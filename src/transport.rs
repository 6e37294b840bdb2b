//! Register-level transport to the RTC.
//!
//! [`Rtc`] is the boundary the clock core talks to: one burst read or write
//! of the time registers, and single-register access to the hours and
//! temperature registers. [`Ds3231`] implements it over a blocking
//! `embedded-hal` I2C bus, retrying each transaction a bounded number of times
//! before reporting a single failure.

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;
use paste::paste;

use crate::{Error, HourFormat, Hours, RawTime, RegAddr, Temperature, TimeSample};

/// Default 7-bit I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Retries after the first failed attempt of a transaction.
pub const DEFAULT_RETRIES: u8 = 2;

/// Register operations the clock core needs from the RTC.
///
/// Every call is one bus transaction and is atomic from the caller's point of
/// view; retrying is the implementation's job.
pub trait Rtc {
    type Error: core::fmt::Debug;

    /// Reads the 7 time registers in one burst starting at the seconds register.
    fn read_time(&mut self) -> Result<RawTime, Self::Error>;

    /// Writes the 7 time registers in one burst starting at the seconds register.
    fn write_time(&mut self, raw: &RawTime) -> Result<(), Self::Error>;

    /// Reads the temperature MSB register.
    fn read_temperature(&mut self) -> Result<Temperature, Self::Error>;

    /// Reads the hours register on its own.
    fn read_hours(&mut self) -> Result<Hours, Self::Error>;

    /// Writes the hours register on its own.
    fn write_hours(&mut self, hours: Hours) -> Result<(), Self::Error>;
}

/// DS3231 on a blocking I2C bus.
pub struct Ds3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    retries: u8,
}

impl<I2C: I2c> Ds3231<I2C> {
    /// Creates a new driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x68)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Sets how many times a failed transaction is retried.
    #[must_use]
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn with_retry<T>(
        &mut self,
        mut op: impl FnMut(&mut I2C, u8) -> Result<T, I2C::Error>,
    ) -> Result<T, Error<I2C::Error>> {
        let mut attempt = 0;
        loop {
            match op(&mut self.i2c, self.address) {
                Ok(value) => return Ok(value),
                Err(_) if attempt < self.retries => {
                    attempt += 1;
                    warn!("RTC: transaction failed, retry {}/{}", attempt, self.retries);
                }
                Err(e) => {
                    warn!("RTC: transaction aborted after {} attempts", attempt + 1);
                    return Err(Error::Bus(e));
                }
            }
        }
    }

    /// Sets the time registers from a calendar value, with the hours register
    /// in `format`.
    ///
    /// # Errors
    /// * `Error::Time` if the year cannot be stored
    /// * `Error::Bus` if the burst write fails
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
        format: HourFormat,
    ) -> Result<(), Error<I2C::Error>> {
        let sample = TimeSample::from_datetime(datetime, format).map_err(Error::Time)?;
        debug!("RTC: setting time {:?}", sample);
        self.write_time(&RawTime::from(&sample))
    }
}

// Single-register access
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> Ds3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, Error<I2C::Error>> {
                        let mut data = [0];
                        self.with_retry(|i2c, address| {
                            i2c.write_read(address, &[$regaddr as u8], &mut data)
                        })?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), Error<I2C::Error>> {
                        let byte: u8 = value.into();
                        self.with_retry(|i2c, address| {
                            i2c.write(address, &[$regaddr as u8, byte])
                        })
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (hour, RegAddr::Hours, Hours),
    (temperature, RegAddr::MSBTemp, Temperature)
);

impl<I2C: I2c> Rtc for Ds3231<I2C> {
    type Error = Error<I2C::Error>;

    fn read_time(&mut self) -> Result<RawTime, Self::Error> {
        let mut data = [0; 7];
        self.with_retry(|i2c, address| {
            i2c.write_read(address, &[RegAddr::Seconds as u8], &mut data)
        })?;
        Ok(data.into())
    }

    fn write_time(&mut self, raw: &RawTime) -> Result<(), Self::Error> {
        let data: [u8; 7] = raw.into();
        let frame = [
            RegAddr::Seconds as u8,
            data[0],
            data[1],
            data[2],
            data[3],
            data[4],
            data[5],
            data[6],
        ];
        self.with_retry(|i2c, address| i2c.write(address, &frame))
    }

    fn read_temperature(&mut self) -> Result<Temperature, Self::Error> {
        self.temperature()
    }

    fn read_hours(&mut self) -> Result<Hours, Self::Error> {
        self.hour()
    }

    fn write_hours(&mut self, hours: Hours) -> Result<(), Self::Error> {
        self.set_hour(hours)
    }
}

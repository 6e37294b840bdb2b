//! In-memory stand-ins for the hardware, used by the unit tests.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::{CharDisplay, Hours, RawTime, Rtc, Temperature};

/// 16x2 character grid.
pub struct Grid {
    cells: [char; 32],
    pub cursor: Option<u8>,
    pub clears: usize,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [' '; 32],
            cursor: None,
            clears: 0,
        }
    }

    /// Row 1 or 2 as a 16 character string.
    pub fn line(&self, row: usize) -> String {
        let start = (row - 1) * 16;
        self.cells[start..start + 16].iter().collect()
    }

    /// `len` characters starting at the 1-based `position`.
    pub fn text(&self, position: u8, len: usize) -> String {
        let start = usize::from(position) - 1;
        self.cells[start..start + len].iter().collect()
    }
}

impl CharDisplay for Grid {
    fn clear(&mut self) {
        self.cells = [' '; 32];
        self.clears += 1;
    }

    fn write_char(&mut self, position: u8, ch: char) {
        if let Some(cell) = usize::from(position)
            .checked_sub(1)
            .and_then(|index| self.cells.get_mut(index))
        {
            *cell = ch;
        }
    }

    fn set_cursor(&mut self, position: u8) {
        self.cursor = Some(position);
    }
}

/// Output pin that remembers every level it was driven to.
#[derive(Default)]
pub struct Buzzer {
    pub on: bool,
    pub history: Vec<bool>,
}

impl ErrorType for Buzzer {
    type Error = Infallible;
}

impl OutputPin for Buzzer {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.on = false;
        self.history.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.on = true;
        self.history.push(true);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

/// RTC backed by a register array.
#[derive(Debug, Default)]
pub struct FakeRtc {
    pub time: [u8; 7],
    pub temperature: u8,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub hour_writes: usize,
}

impl FakeRtc {
    pub fn new(time: [u8; 7], temperature: u8) -> Self {
        Self {
            time,
            temperature,
            ..Self::default()
        }
    }

    fn check(&self, failing: bool) -> Result<(), BusFault> {
        if failing {
            Err(BusFault)
        } else {
            Ok(())
        }
    }
}

impl Rtc for FakeRtc {
    type Error = BusFault;

    fn read_time(&mut self) -> Result<RawTime, BusFault> {
        self.check(self.fail_reads)?;
        Ok(RawTime::from(self.time))
    }

    fn write_time(&mut self, raw: &RawTime) -> Result<(), BusFault> {
        self.check(self.fail_writes)?;
        self.time = raw.into();
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<Temperature, BusFault> {
        self.check(self.fail_reads)?;
        Ok(Temperature::from(self.temperature))
    }

    fn read_hours(&mut self) -> Result<Hours, BusFault> {
        self.check(self.fail_reads)?;
        Ok(Hours::from(self.time[2]))
    }

    fn write_hours(&mut self, hours: Hours) -> Result<(), BusFault> {
        self.check(self.fail_writes)?;
        self.time[2] = hours.into();
        self.hour_writes += 1;
        Ok(())
    }
}

#[cfg(feature = "async")]
impl crate::asynch::AsyncRtc for FakeRtc {
    type Error = BusFault;

    async fn read_time(&mut self) -> Result<RawTime, BusFault> {
        Rtc::read_time(self)
    }

    async fn write_time(&mut self, raw: &RawTime) -> Result<(), BusFault> {
        Rtc::write_time(self, raw)
    }

    async fn read_temperature(&mut self) -> Result<Temperature, BusFault> {
        Rtc::read_temperature(self)
    }

    async fn read_hours(&mut self) -> Result<Hours, BusFault> {
        Rtc::read_hours(self)
    }

    async fn write_hours(&mut self, hours: Hours) -> Result<(), BusFault> {
        Rtc::write_hours(self, hours)
    }
}

/// Small deterministic PRNG for randomized schedules.
pub struct Xorshift(u32);

impl Xorshift {
    pub fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `0..bound`.
    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }

    pub fn chance(&mut self, percent: u32) -> bool {
        self.below(100) < percent
    }
}

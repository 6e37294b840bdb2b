//! Control core of a DS3231-based alarm clock.
//!
//! The crate is `no_std` and hardware agnostic. It provides:
//!
//! * a register codec for the DS3231 time, hours and temperature registers
//!   ([`TimeSample`], [`Hours`], [`Temperature`], [`codec`]),
//! * an RTC transport with bounded retries over `embedded-hal` I2C
//!   ([`Ds3231`], and [`asynch::Ds3231`] with the `async` feature),
//! * six tick-driven mode machines coordinated through a single ownership
//!   token ([`machines`], [`Tokens`]),
//! * an [`AlarmClock`] that owns them together with the shared state, and a
//!   [`Runner`] that ticks each machine on its own period.
//!
//! The display and the inputs are behind the [`CharDisplay`] and
//! [`InputSource`] traits; the alarm output is any `embedded-hal`
//! [`OutputPin`](embedded_hal::digital::OutputPin).
//!
//! # Example
//!
//! ```rust,ignore
//! use alarm_clock::{AlarmClock, Config, Ds3231, PinInputs, Runner, DEFAULT_ADDRESS};
//!
//! let mut rtc = Ds3231::new(i2c, DEFAULT_ADDRESS);
//! let config = Config::default();
//! let inputs = PinInputs::new(left, right, heartbeat, || adc.read_y(), config.joystick);
//! let mut app = AlarmClock::new(lcd, buzzer, config);
//! app.configure(&mut rtc)?;
//! Runner::new(app, rtc, inputs, delay).run()
//! ```
#![no_std]

#[macro_use]
mod fmt;

mod app;
pub mod codec;
mod config;
mod error;
mod io;
pub mod machines;
mod registers;
mod scheduler;
mod state;
mod time;
mod tokens;
mod transport;

#[cfg(test)]
mod testing;

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        pub mod asynch;
    }
}

pub use app::AlarmClock;
pub use codec::TempUnit;
pub use config::{Config, JoystickThresholds};
pub use error::Error;
pub use io::{CharDisplay, InputSource, Inputs, PinInputs};
pub use registers::{HourFormat, Hours, Meridiem, Month, RegAddr, Temperature};
pub use scheduler::{DueTasks, Runner, Scheduler, TaskId};
pub use state::{AlarmSetting, FormatSettings, Shared};
pub use time::{weekday_label, RawTime, TimeError, TimeSample};
pub use tokens::{Mode, TokenError, TokenFlags, Tokens};
pub use transport::{Ds3231, Rtc, DEFAULT_ADDRESS, DEFAULT_RETRIES};

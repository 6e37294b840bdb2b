//! Async flavour of the RTC transport and the run loop.
//!
//! Same behaviour as the blocking API, over `embedded-hal-async` traits. Only
//! available with the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use alarm_clock::asynch::{AsyncRunner, Ds3231};
//!
//! let mut rtc = Ds3231::new(i2c, alarm_clock::DEFAULT_ADDRESS);
//! let mut app = AlarmClock::new(lcd, buzzer, Config::default());
//! app.configure_async(&mut rtc).await?;
//! AsyncRunner::new(app, rtc, inputs, delay).run().await
//! ```

use chrono::NaiveDateTime;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::app::{commit, plan, with_machine};
use crate::codec::convert_hour_format;
use crate::machines::{Context, RtcOutcome, RtcRequest};
use crate::transport::DEFAULT_RETRIES;
use crate::{
    AlarmClock, CharDisplay, Error, HourFormat, Hours, InputSource, Inputs, RawTime, RegAddr,
    Scheduler, Shared, TaskId, Temperature, TimeSample,
};

/// Async counterpart of [`crate::Rtc`].
#[allow(async_fn_in_trait)]
pub trait AsyncRtc {
    type Error: core::fmt::Debug;

    async fn read_time(&mut self) -> Result<RawTime, Self::Error>;

    async fn write_time(&mut self, raw: &RawTime) -> Result<(), Self::Error>;

    async fn read_temperature(&mut self) -> Result<Temperature, Self::Error>;

    async fn read_hours(&mut self) -> Result<Hours, Self::Error>;

    async fn write_hours(&mut self, hours: Hours) -> Result<(), Self::Error>;
}

/// DS3231 on an async I2C bus.
pub struct Ds3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    retries: u8,
}

// Retries `$op` up to `$dev.retries` extra times.
macro_rules! retry {
    ($dev:ident, $op:expr) => {{
        let mut attempt = 0;
        loop {
            match $op {
                Ok(value) => break Ok(value),
                Err(_) if attempt < $dev.retries => {
                    attempt += 1;
                    warn!("RTC: transaction failed, retry {}/{}", attempt, $dev.retries);
                }
                Err(e) => {
                    warn!("RTC: transaction aborted after {} attempts", attempt + 1);
                    break Err(Error::Bus(e));
                }
            }
        }
    }};
}

impl<I2C: I2c> Ds3231<I2C> {
    /// Creates a new async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x68)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            retries: DEFAULT_RETRIES,
        }
    }

    #[must_use]
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Sets the time registers from a calendar value, with the hours register
    /// in `format`.
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
        format: HourFormat,
    ) -> Result<(), Error<I2C::Error>> {
        let sample = TimeSample::from_datetime(datetime, format).map_err(Error::Time)?;
        debug!("RTC: setting time {:?}", sample);
        self.write_time(&RawTime::from(&sample)).await
    }
}

macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> Ds3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, Error<I2C::Error>> {
                        let mut data = [0];
                        retry!(self, self.i2c
                            .write_read(self.address, &[$regaddr as u8], &mut data)
                            .await)?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), Error<I2C::Error>> {
                        let byte: u8 = value.into();
                        retry!(self, self.i2c
                            .write(self.address, &[$regaddr as u8, byte])
                            .await)
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

impl<I2C: I2c> AsyncRtc for Ds3231<I2C> {
    type Error = Error<I2C::Error>;

    async fn read_time(&mut self) -> Result<RawTime, Self::Error> {
        let mut data = [0; 7];
        retry!(
            self,
            self.i2c
                .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
                .await
        )?;
        Ok(data.into())
    }

    async fn write_time(&mut self, raw: &RawTime) -> Result<(), Self::Error> {
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
        retry!(self, self.i2c.write(self.address, &frame).await)
    }

    async fn read_temperature(&mut self) -> Result<Temperature, Self::Error> {
        self.temperature().await
    }

    async fn read_hours(&mut self) -> Result<Hours, Self::Error> {
        self.hour().await
    }

    async fn write_hours(&mut self, hours: Hours) -> Result<(), Self::Error> {
        self.set_hour(hours).await
    }
}

async fn perform_async<R: AsyncRtc>(
    rtc: &mut R,
    request: RtcRequest,
    shared: &mut Shared,
) -> RtcOutcome {
    match request {
        RtcRequest::RefreshTime => {
            let raw = match rtc.read_time().await {
                Ok(raw) => raw,
                Err(_) => {
                    warn!("RTC: refresh failed, keeping cached time");
                    return RtcOutcome::Failed;
                }
            };
            match rtc.read_temperature().await {
                Ok(temperature) => {
                    shared.time = TimeSample::from(raw);
                    shared.temperature = temperature;
                    RtcOutcome::Completed
                }
                Err(_) => {
                    warn!("RTC: refresh failed, keeping cached time");
                    RtcOutcome::Failed
                }
            }
        }
        RtcRequest::ConvertHourFormat(format) => {
            let hours = match rtc.read_hours().await {
                Ok(hours) => hours,
                Err(_) => {
                    warn!("RTC: hour format conversion to {:?} failed", format);
                    return RtcOutcome::Failed;
                }
            };
            let target = convert_hour_format(hours, format);
            if target != hours && rtc.write_hours(target).await.is_err() {
                warn!("RTC: hour format conversion to {:?} failed", format);
                return RtcOutcome::Failed;
            }
            if let Ok(raw) = rtc.read_time().await {
                shared.time = TimeSample::from(raw);
            }
            RtcOutcome::Completed
        }
    }
}

impl<D, P> AlarmClock<D, P>
where
    D: CharDisplay,
    P: OutputPin,
{
    /// Async counterpart of [`AlarmClock::configure`].
    pub async fn configure_async<R: AsyncRtc>(&mut self, rtc: &mut R) -> Result<(), R::Error> {
        let hours = rtc.read_hours().await?;
        let target = convert_hour_format(hours, self.config.hour_format);
        if target != hours {
            debug!("RTC: converting hours register to {:?}", self.config.hour_format);
            rtc.write_hours(target).await?;
        }
        self.shared.time = TimeSample::from(rtc.read_time().await?);
        self.shared.temperature = rtc.read_temperature().await?;
        info!("alarm clock configured");
        Ok(())
    }

    /// Async counterpart of [`AlarmClock::tick`].
    pub async fn tick_async<R: AsyncRtc>(&mut self, task: TaskId, rtc: &mut R, inputs: &Inputs) {
        let result = with_machine!(self, task, machine => {
            let plan = plan(machine, inputs, &self.shared);
            let outcome = match plan.request {
                Some(request) => perform_async(rtc, request, &mut self.shared).await,
                None => RtcOutcome::NotRequested,
            };
            let mut cx = Context {
                inputs,
                shared: &mut self.shared,
                display: &mut self.display,
                config: &self.config,
            };
            commit(machine, plan, outcome, &mut cx)
        });
        self.check(task, result);
    }
}

/// Async counterpart of [`crate::Runner`].
pub struct AsyncRunner<D, P, R, I, T> {
    app: AlarmClock<D, P>,
    rtc: R,
    input: I,
    delay: T,
    scheduler: Scheduler,
    now: u32,
}

impl<D, P, R, I, T> AsyncRunner<D, P, R, I, T>
where
    D: CharDisplay,
    P: OutputPin,
    R: AsyncRtc,
    I: InputSource,
    T: DelayNs,
{
    pub fn new(app: AlarmClock<D, P>, rtc: R, input: I, delay: T) -> Self {
        let scheduler = Scheduler::new(app.config());
        Self {
            app,
            rtc,
            input,
            delay,
            scheduler,
            now: 0,
        }
    }

    pub fn app(&self) -> &AlarmClock<D, P> {
        &self.app
    }

    pub fn now(&self) -> u32 {
        self.now
    }

    pub async fn step(&mut self) {
        let due = self.scheduler.due(self.now);
        if !due.is_empty() {
            let inputs = self.input.sample();
            for task in due {
                self.app.tick_async(task, &mut self.rtc, &inputs).await;
            }
        }
        let wait = self.scheduler.next_wakeup(self.now);
        self.delay.delay_ms(wait).await;
        self.now = self.now.wrapping_add(wait);
    }

    pub async fn run(mut self) -> ! {
        info!("alarm clock running");
        loop {
            self.step().await;
        }
    }
}

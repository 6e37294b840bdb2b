//! The alarm clock application: shared state plus the six mode machines.

use embedded_hal::digital::OutputPin;

use crate::codec::convert_hour_format;
use crate::machines::{
    AlarmSet, AlarmSignal, ClockDisplay, Context, HourFormatSet, Machine, Menu, RtcOutcome,
    RtcRequest, TempUnitSet,
};
use crate::{
    CharDisplay, Config, FormatSettings, Inputs, Rtc, Shared, TaskId, TimeSample, TokenError,
};

/// Runs `$body` with `$m` bound to the machine behind `$task`.
macro_rules! with_machine {
    ($app:ident, $task:expr, $m:ident => $body:expr) => {
        match $task {
            TaskId::Clock => {
                let $m = &mut $app.clock;
                $body
            }
            TaskId::Menu => {
                let $m = &mut $app.menu;
                $body
            }
            TaskId::AlarmSet => {
                let $m = &mut $app.alarm_set;
                $body
            }
            TaskId::TempUnit => {
                let $m = &mut $app.temp_unit;
                $body
            }
            TaskId::HourFormat => {
                let $m = &mut $app.hour_format;
                $body
            }
            TaskId::AlarmSignal => {
                let $m = &mut $app.signal;
                $body
            }
        }
    };
}
pub(crate) use with_machine;

/// Transition half of a tick: where the machine goes and what RTC work it needs.
pub(crate) struct Plan<S> {
    pub from: S,
    pub next: S,
    pub request: Option<RtcRequest>,
}

pub(crate) fn plan<M: Machine>(machine: &M, inputs: &Inputs, shared: &Shared) -> Plan<M::State> {
    let next = machine.next_state(inputs, shared);
    Plan {
        from: machine.state(),
        next,
        request: machine.request(next, shared),
    }
}

pub(crate) fn commit<M: Machine, D: CharDisplay>(
    machine: &mut M,
    plan: Plan<M::State>,
    outcome: RtcOutcome,
    cx: &mut Context<'_, D>,
) -> Result<(), TokenError> {
    machine.enter(plan.next, plan.from, cx, outcome)
}

/// Runs an RTC request against a blocking transport and updates the cache.
pub(crate) fn perform<R: Rtc>(rtc: &mut R, request: RtcRequest, shared: &mut Shared) -> RtcOutcome {
    match request {
        RtcRequest::RefreshTime => {
            let refreshed = rtc
                .read_time()
                .and_then(|raw| Ok((raw, rtc.read_temperature()?)));
            match refreshed {
                Ok((raw, temperature)) => {
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
            let converted = rtc.read_hours().and_then(|hours| {
                let target = convert_hour_format(hours, format);
                if target != hours {
                    rtc.write_hours(target)?;
                }
                Ok(())
            });
            if converted.is_err() {
                warn!("RTC: hour format conversion to {:?} failed", format);
                return RtcOutcome::Failed;
            }
            if let Ok(raw) = rtc.read_time() {
                shared.time = TimeSample::from(raw);
            }
            RtcOutcome::Completed
        }
    }
}

/// The alarm clock.
///
/// Owns the shared state, the display and the six mode machines. Each call to
/// [`AlarmClock::tick`] advances one machine by one step; the order in which
/// machines are ticked does not matter.
pub struct AlarmClock<D, P> {
    pub(crate) shared: Shared,
    pub(crate) config: Config,
    pub(crate) display: D,
    pub(crate) clock: ClockDisplay,
    pub(crate) menu: Menu,
    pub(crate) alarm_set: AlarmSet,
    pub(crate) temp_unit: TempUnitSet,
    pub(crate) hour_format: HourFormatSet,
    pub(crate) signal: AlarmSignal<P>,
    recoveries: u32,
}

impl<D, P> AlarmClock<D, P>
where
    D: CharDisplay,
    P: OutputPin,
{
    /// Creates a new alarm clock. The clock view starts with the token.
    pub fn new(display: D, alarm_output: P, config: Config) -> Self {
        Self {
            shared: Shared::new(FormatSettings {
                hour_format: config.hour_format,
                temp_unit: config.temp_unit,
            }),
            display,
            clock: ClockDisplay::new(config.refresh_ticks),
            menu: Menu::new(),
            alarm_set: AlarmSet::new(),
            temp_unit: TempUnitSet::new(),
            hour_format: HourFormatSet::new(),
            signal: AlarmSignal::new(alarm_output, config.heartbeat_threshold),
            recoveries: 0,
            config,
        }
    }

    /// Puts the RTC's hours register in the configured format and primes the
    /// time and temperature cache.
    ///
    /// # Errors
    /// Returns the transport error of the first failed transaction.
    pub fn configure<R: Rtc>(&mut self, rtc: &mut R) -> Result<(), R::Error> {
        let hours = rtc.read_hours()?;
        let target = convert_hour_format(hours, self.config.hour_format);
        if target != hours {
            debug!("RTC: converting hours register to {:?}", self.config.hour_format);
            rtc.write_hours(target)?;
        }
        self.shared.time = TimeSample::from(rtc.read_time()?);
        self.shared.temperature = rtc.read_temperature()?;
        info!("alarm clock configured");
        Ok(())
    }

    /// Advances `task` by one tick.
    pub fn tick<R: Rtc>(&mut self, task: TaskId, rtc: &mut R, inputs: &Inputs) {
        let result = with_machine!(self, task, machine => {
            let plan = plan(machine, inputs, &self.shared);
            let outcome = match plan.request {
                Some(request) => perform(rtc, request, &mut self.shared),
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

    pub(crate) fn check(&mut self, task: TaskId, result: Result<(), TokenError>) {
        let violation = match result {
            Err(e) => Some(e),
            Ok(()) if !self.shared.tokens.is_exclusive() => {
                Some(TokenError::NotExclusive(self.shared.tokens.flags()))
            }
            Ok(()) => None,
        };
        if let Some(e) = violation {
            error!("{:?}: token violation {:?}, resetting", task, e);
            self.recover();
        }
    }

    /// Clock gets the token back and the interactive machines restart.
    pub fn recover(&mut self) {
        self.recoveries = self.recoveries.saturating_add(1);
        self.shared.tokens.force_reset();
        self.clock.reset();
        self.menu.reset();
        self.alarm_set.reset();
        self.temp_unit.reset();
        self.hour_format.reset();
        self.display.clear();
    }

    pub fn shared(&self) -> &Shared {
        &self.shared
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn clock(&self) -> &ClockDisplay {
        &self.clock
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn alarm_set(&self) -> &AlarmSet {
        &self.alarm_set
    }

    pub fn temp_unit(&self) -> &TempUnitSet {
        &self.temp_unit
    }

    pub fn hour_format(&self) -> &HourFormatSet {
        &self.hour_format
    }

    pub fn signal(&self) -> &AlarmSignal<P> {
        &self.signal
    }

    /// Times the machines were reset after a token violation.
    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }
}

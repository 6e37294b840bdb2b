//! Cooperative periodic task runner.
//!
//! Each mode machine is a task with its own period. [`Scheduler`] keeps track
//! of when each task is next due on a wrapping millisecond clock, [`Runner`]
//! ticks the due tasks and sleeps until the next one with an `embedded-hal`
//! delay.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::{AlarmClock, CharDisplay, Config, InputSource, Rtc};

/// The periodic tasks, one per mode machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    Clock,
    Menu,
    AlarmSet,
    TempUnit,
    HourFormat,
    AlarmSignal,
}

impl TaskId {
    pub const ALL: [TaskId; 6] = [
        TaskId::Clock,
        TaskId::Menu,
        TaskId::AlarmSet,
        TaskId::TempUnit,
        TaskId::HourFormat,
        TaskId::AlarmSignal,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Set of tasks due in one scheduler pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DueTasks(u8);

impl DueTasks {
    pub fn contains(&self, task: TaskId) -> bool {
        self.0 & (1 << task.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, task: TaskId) {
        self.0 |= 1 << task.index();
    }
}

impl Iterator for DueTasks {
    type Item = TaskId;

    fn next(&mut self) -> Option<TaskId> {
        let task = TaskId::ALL.into_iter().find(|task| self.contains(*task))?;
        self.0 &= !(1 << task.index());
        Some(task)
    }
}

// `now` is at or past `deadline` on the wrapping clock
fn reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) < u32::MAX / 2
}

/// Per-task periods and deadlines.
#[derive(Debug, Clone)]
pub struct Scheduler {
    periods: [u32; 6],
    next_due: [u32; 6],
}

impl Scheduler {
    /// Interactive machines on the interactive period, the alarm signal on its
    /// own. Every task is due at time 0.
    pub fn new(config: &Config) -> Self {
        let mut periods = [config.interactive_period_ms; 6];
        periods[TaskId::AlarmSignal.index()] = config.signal_period_ms;
        Self::with_periods(periods)
    }

    pub fn with_periods(periods: [u32; 6]) -> Self {
        Self {
            periods: periods.map(|period| period.max(1)),
            next_due: [0; 6],
        }
    }

    pub fn period(&self, task: TaskId) -> u32 {
        self.periods[task.index()]
    }

    /// Collects the tasks due at `now` and schedules their next run.
    ///
    /// A task that fell more than one period behind is rescheduled from `now`
    /// rather than run repeatedly to catch up.
    pub fn due(&mut self, now: u32) -> DueTasks {
        let mut due = DueTasks::default();
        for task in TaskId::ALL {
            let i = task.index();
            if !reached(now, self.next_due[i]) {
                continue;
            }
            due.insert(task);
            let next = self.next_due[i].wrapping_add(self.periods[i]);
            self.next_due[i] = if reached(now, next) {
                now.wrapping_add(self.periods[i])
            } else {
                next
            };
        }
        due
    }

    /// Milliseconds from `now` until the next task is due.
    pub fn next_wakeup(&self, now: u32) -> u32 {
        self.next_due
            .iter()
            .map(|&deadline| {
                if reached(now, deadline) {
                    0
                } else {
                    deadline.wrapping_sub(now)
                }
            })
            .min()
            .unwrap_or(0)
    }
}

/// Drives an [`AlarmClock`] forever.
pub struct Runner<D, P, R, I, T> {
    app: AlarmClock<D, P>,
    rtc: R,
    input: I,
    delay: T,
    scheduler: Scheduler,
    now: u32,
}

impl<D, P, R, I, T> Runner<D, P, R, I, T>
where
    D: CharDisplay,
    P: OutputPin,
    R: Rtc,
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

    /// Milliseconds of schedule time elapsed.
    pub fn now(&self) -> u32 {
        self.now
    }

    /// Ticks everything that is due, then sleeps until the next deadline.
    pub fn step(&mut self) {
        let due = self.scheduler.due(self.now);
        if !due.is_empty() {
            let inputs = self.input.sample();
            for task in due {
                self.app.tick(task, &mut self.rtc, &inputs);
            }
        }
        let wait = self.scheduler.next_wakeup(self.now);
        self.delay.delay_ms(wait);
        self.now = self.now.wrapping_add(wait);
    }

    pub fn run(mut self) -> ! {
        info!("alarm clock running");
        loop {
            self.step();
        }
    }
}

//! Alarm output pattern.
//!
//! Not part of the ownership protocol: it only reads the cached time and the
//! armed alarm, and drives its own output pin. Once the alarm matches the
//! output toggles every tick until enough heartbeat pulses were counted.

use embedded_hal::digital::OutputPin;

use super::{Context, Machine, RtcOutcome};
use crate::{CharDisplay, Inputs, Shared, TokenError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalState {
    Init,
    Idle,
    PatternOnPhase,
    PatternOffPhase,
    Reset,
}

impl SignalState {
    fn sounding(self) -> bool {
        matches!(self, SignalState::PatternOnPhase | SignalState::PatternOffPhase)
    }
}

pub struct AlarmSignal<P> {
    state: SignalState,
    output: P,
    threshold: u8,
}

impl<P: OutputPin> AlarmSignal<P> {
    /// `threshold` heartbeat pulses are tolerated, one more silences the alarm.
    pub fn new(output: P, threshold: u8) -> Self {
        Self {
            state: SignalState::Init,
            output,
            threshold,
        }
    }

    /// Releases the output pin.
    pub fn release(self) -> P {
        self.output
    }

    fn drive(&mut self, on: bool) {
        let result = if on {
            self.output.set_high()
        } else {
            self.output.set_low()
        };
        if result.is_err() {
            warn!("alarm output: pin write failed");
        }
    }
}

impl<P: OutputPin> Machine for AlarmSignal<P> {
    type State = SignalState;

    fn state(&self) -> SignalState {
        self.state
    }

    fn next_state(&self, inputs: &Inputs, shared: &Shared) -> SignalState {
        match self.state {
            SignalState::Init | SignalState::Reset => SignalState::Idle,
            SignalState::Idle => match shared.alarm {
                Some(alarm) if alarm.matches(&shared.time) => SignalState::PatternOnPhase,
                _ => SignalState::Idle,
            },
            phase => {
                let count = shared.heartbeat.saturating_add(u8::from(inputs.pulse));
                if count > self.threshold {
                    SignalState::Reset
                } else if phase == SignalState::PatternOnPhase {
                    SignalState::PatternOffPhase
                } else {
                    SignalState::PatternOnPhase
                }
            }
        }
    }

    fn enter<D: CharDisplay>(
        &mut self,
        next: SignalState,
        from: SignalState,
        cx: &mut Context<'_, D>,
        _outcome: RtcOutcome,
    ) -> Result<(), TokenError> {
        if next != from {
            trace!("alarm signal: {:?} -> {:?}", from, next);
        }
        self.state = next;

        match next {
            SignalState::Init | SignalState::Idle => {}
            SignalState::PatternOnPhase | SignalState::PatternOffPhase => {
                if from == SignalState::Idle {
                    info!("alarm signal: ringing");
                }
                if from.sounding() && cx.inputs.pulse {
                    cx.shared.heartbeat = cx.shared.heartbeat.saturating_add(1);
                }
                self.drive(next == SignalState::PatternOnPhase);
            }
            SignalState::Reset => {
                self.drive(false);
                cx.shared.alarm = None;
                cx.shared.heartbeat = 0;
                info!("alarm signal: silenced, alarm disarmed");
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = SignalState::Init;
        self.drive(false);
    }
}

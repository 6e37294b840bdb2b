use crate::TimeError;

/// Errors surfaced by the RTC transport.
#[derive(Debug)]
pub enum Error<E> {
    /// Bus transaction failed on every attempt
    Bus(E),
    /// Calendar value cannot be stored in the time registers
    Time(TimeError),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Text that should read `HH:MM` does not, or is out of range.
    #[display("Invalid time of day (expected HH:MM with hour 0-23, minute 0-59)")]
    InvalidDaytime,

    /// A real-time clock register did not hold two valid BCD digits.
    #[display("Invalid BCD value 0x{_0:02X}")]
    InvalidBcd(#[error(not(source))] u8),

    #[display("Settings line {line}: unknown section")]
    UnknownSection { line: u16 },

    #[display("Settings line {line}: unknown key in section 'Timer'")]
    UnknownKey { line: u16 },

    #[display("Settings line {line}: bad value (expected HH:MM)")]
    BadValue { line: u16 },

    /// A background task could not be spawned (its pool is exhausted).
    #[cfg(feature = "pico1")]
    #[display("Task spawn failed")]
    TaskSpawn,

    #[cfg(feature = "pico1")]
    #[display("Real-time clock error")]
    Rtc,
}

#[cfg(feature = "pico1")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        defmt::error!("Task spawn failed: {}", err);
        Self::TaskSpawn
    }
}

#[cfg(feature = "pico1")]
impl From<embassy_rp::rtc::RtcError> for Error {
    fn from(_: embassy_rp::rtc::RtcError) -> Self {
        Self::Rtc
    }
}

//! Power-saving logic for a battery-powered wall clock.
//!
//! Two handlers (tick and minute) feed a shared [`Countdown`]; the foreground
//! [`WallClock`] reacts to their flags, detects ten-minute, half-hour and hour
//! boundaries, keeps the minute alarm armed and decides through the
//! [`scheduler`] when the device powers off.
#![no_std]

mod alarm;
mod command;
mod countdown;
mod daytime;
mod error;
mod events;
mod platform;
pub mod remote;
#[cfg(feature = "pico1")]
pub mod rp;
pub mod scheduler;
mod settings;
mod time_digits;
mod wall_clock;

pub use alarm::{
    ALARM_SAFETY_MARGIN, END_OF_DAY_GUARD_MINUTES, MINUTE_ALARM_FALLBACK, minute_alarm_wait,
    next_minute_alarm, wait_until,
};
pub use command::Command;
pub use countdown::{Countdown, CountdownSnapshot};
pub use daytime::{DaytimeHhmm, MINUTES_PER_DAY, difference};
pub use error::{Error, Result};
pub use events::TimerEvents;
pub use platform::{Arrangement, Notice, Platform, Screen};
pub use scheduler::{
    ClockSpeed, DEFAULT_KEEP_ALIVE_MINUTES, MIN_POWEROFF_DELAY_MINUTES, PowerOffDecision,
    PowerOffReason, ScheduledPowerOff, poweroff_delay, schedule_next_poweroff,
};
pub use settings::{EMBEDDED_INI, Settings};
pub use time_digits::TimeDigits;
pub use wall_clock::{Animation, Pass, RESUME_CHIMES, WallClock};

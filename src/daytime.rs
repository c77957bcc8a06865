//! Time of day at minute resolution, folded into a single day.
//!
//! See [`DaytimeHhmm`] for usage examples.

use core::fmt;

use crate::{Error, Result};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// An immutable time of day (`hour:minute`), stored as minutes since midnight.
///
/// Construction never fails: anything past the end of the day is folded back
/// into `[00:00, 23:59]` modulo one day.
///
/// Ordering (`<`, `>=`, ...) is clock-face order on the same day. Use
/// [`DaytimeHhmm::minutes_since`] for the directed, midnight-wrapping distance
/// between two times.
///
/// # Example
///
/// ```
/// use pocket_wallclock::DaytimeHhmm;
///
/// let now = DaytimeHhmm::new(23, 0);
/// let poff = DaytimeHhmm::new(6, 0);
///
/// // 7 hours from 23:00 forward to 06:00, through midnight.
/// assert_eq!(poff.minutes_since(now), 7 * 60);
/// // Clock-face order ignores the wrap.
/// assert!(poff < now);
/// // 25:30 folds to 01:30.
/// assert_eq!(DaytimeHhmm::new(25, 30), DaytimeHhmm::new(1, 30));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaytimeHhmm {
    absolute_minutes: u16,
}

impl DaytimeHhmm {
    /// Midnight.
    pub const MIDNIGHT: Self = Self {
        absolute_minutes: 0,
    };

    /// Create a time of day, folding the result into one day.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "Widened to u32 before multiplying; modulo keeps the result below one day"
    )]
    pub const fn new(hour: u16, minute: u16) -> Self {
        let total = (hour as u32 * 60 + minute as u32) % MINUTES_PER_DAY as u32;
        Self {
            absolute_minutes: total as u16,
        }
    }

    /// Create a time of day from minutes since midnight, folding into one day.
    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Self {
        Self::new(0, minutes)
    }

    /// Hour of day, `0..=23`.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Division by a non-zero constant"
    )]
    pub const fn hour(self) -> u8 {
        (self.absolute_minutes / 60) as u8
    }

    /// Minute of the hour, `0..=59`.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Modulo by a non-zero constant"
    )]
    pub const fn minute(self) -> u8 {
        (self.absolute_minutes % 60) as u8
    }

    /// Minutes since midnight, `0..=1439`.
    #[must_use]
    pub const fn absolute_minutes(self) -> u16 {
        self.absolute_minutes
    }

    /// Minutes from `earlier` forward to `self`, wrapping through midnight.
    ///
    /// Always in `0..=1439`; zero when both are equal. This is "how long until
    /// `self`, starting at `earlier`", not a symmetric distance.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "Both operands are below one day, so the sum cannot overflow u16"
    )]
    pub const fn minutes_since(self, earlier: Self) -> u16 {
        (self.absolute_minutes + MINUTES_PER_DAY - earlier.absolute_minutes) % MINUTES_PER_DAY
    }

    /// Parse `H:MM` or `HH:MM` (hour `0..=23`, minute `0..=59`).
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDaytime`] for anything else.
    pub fn parse(text: &str) -> Result<Self> {
        let (hour, minute) = text.trim().split_once(':').ok_or(Error::InvalidDaytime)?;
        let hour = parse_two_digits(hour).ok_or(Error::InvalidDaytime)?;
        let minute = parse_two_digits(minute).ok_or(Error::InvalidDaytime)?;
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidDaytime);
        }
        Ok(Self::new(u16::from(hour), u16::from(minute)))
    }
}

/// Minutes from `b` forward to `a`, wrapping through midnight.
#[must_use]
pub const fn difference(a: DaytimeHhmm, b: DaytimeHhmm) -> u16 {
    a.minutes_since(b)
}

impl fmt::Display for DaytimeHhmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

fn parse_two_digits(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

//! The four decimal digits shown on the clock face.

use core::fmt;

use crate::{DaytimeHhmm, Error, Result};

/// Clock digits `H H : M M`, each `0..=9`, as read from the real-time clock.
///
/// Before the first clock read the foreground holds `None` instead of a
/// `TimeDigits`, so every value of this type is a real reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeDigits {
    /// Tens of hours, `0..=2`.
    pub hour_tens: u8,
    /// Ones of hours, `0..=9`.
    pub hour_ones: u8,
    /// Tens of minutes, `0..=5`.
    pub minute_tens: u8,
    /// Ones of minutes, `0..=9`.
    pub minute_ones: u8,
}

impl TimeDigits {
    /// Split a time of day into its digits.
    #[must_use]
    pub const fn from_daytime(daytime: DaytimeHhmm) -> Self {
        let hour = daytime.hour();
        let minute = daytime.minute();
        Self {
            hour_tens: tens(hour),
            hour_ones: ones(hour),
            minute_tens: tens(minute),
            minute_ones: ones(minute),
        }
    }

    /// Build from the packed BCD hour and minute registers of a real-time clock
    /// (`0x12`, `0x43` for 12:43).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBcd`] if a nibble is above 9 or the value is not
    /// a valid hour/minute.
    pub const fn from_bcd(hours: u8, minutes: u8) -> Result<Self> {
        let (hour_tens, hour_ones) = (hours >> 4, hours & 0x0F);
        let (minute_tens, minute_ones) = (minutes >> 4, minutes & 0x0F);
        if hour_tens > 2 || hour_ones > 9 || (hour_tens == 2 && hour_ones > 3) {
            return Err(Error::InvalidBcd(hours));
        }
        if minute_tens > 5 || minute_ones > 9 {
            return Err(Error::InvalidBcd(minutes));
        }
        Ok(Self {
            hour_tens,
            hour_ones,
            minute_tens,
            minute_ones,
        })
    }

    /// The time of day these digits show.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Digits are at most 9, so the sums stay tiny"
    )]
    pub const fn daytime(self) -> DaytimeHhmm {
        DaytimeHhmm::new(
            self.hour_tens as u16 * 10 + self.hour_ones as u16,
            self.minute_tens as u16 * 10 + self.minute_ones as u16,
        )
    }

    /// The digits in display order.
    #[must_use]
    pub const fn as_array(self) -> [u8; 4] {
        [
            self.hour_tens,
            self.hour_ones,
            self.minute_tens,
            self.minute_ones,
        ]
    }
}

impl From<DaytimeHhmm> for TimeDigits {
    fn from(daytime: DaytimeHhmm) -> Self {
        Self::from_daytime(daytime)
    }
}

impl fmt::Display for TimeDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            self.hour_tens, self.hour_ones, self.minute_tens, self.minute_ones
        )
    }
}

#[inline]
#[expect(
    clippy::integer_division_remainder_used,
    reason = "Because value < 60, the division is safe."
)]
const fn tens(value: u8) -> u8 {
    value / 10
}

#[inline]
#[expect(
    clippy::integer_division_remainder_used,
    reason = "Because value < 60, the modulo is safe."
)]
const fn ones(value: u8) -> u8 {
    value % 10
}

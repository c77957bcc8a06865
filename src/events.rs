//! Ten-minute, half-hour and full-hour boundary detection.

/// Boundaries crossed since the previous clock read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerEvents {
    /// The tens-of-minutes digit changed.
    pub ten_minutes: bool,
    /// A half-hour boundary was passed (also raised together with `full_hour`).
    pub half_hour: bool,
    /// The hour rolled over.
    pub full_hour: bool,
}

impl TimerEvents {
    /// No boundary crossed.
    pub const NONE: Self = Self {
        ten_minutes: false,
        half_hour: false,
        full_hour: false,
    };

    /// Compare the previous minute-tens digit with the current one.
    ///
    /// `previous == None` means nothing was observed yet (first read after reset):
    /// the read only primes the state and no event is raised.
    ///
    /// The hour is split into halves by the tens digit: `0..=2` and `3..=5`.
    /// First half to second half is a half-hour crossing. Second half back to
    /// the first half passes both the half-hour and the hour boundary.
    #[must_use]
    pub const fn crossing(previous: Option<u8>, current: u8) -> Self {
        let Some(previous) = previous else {
            return Self::NONE;
        };
        let rolled_over = !is_first_half(previous) && is_first_half(current);
        Self {
            ten_minutes: previous != current,
            half_hour: (is_first_half(previous) && !is_first_half(current)) || rolled_over,
            full_hour: rolled_over,
        }
    }

    /// True if any boundary was crossed.
    #[must_use]
    pub const fn any(self) -> bool {
        self.ten_minutes || self.half_hour || self.full_hour
    }
}

#[inline]
const fn is_first_half(minute_tens: u8) -> bool {
    minute_tens < 3
}

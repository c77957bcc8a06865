//! When to arm the once-per-minute alarm.

use time::{Duration, Time};

use crate::{DaytimeHhmm, MINUTES_PER_DAY};

/// Added on top of one minute so that an alarm computed just before a minute
/// boundary still lands in the future.
pub const ALARM_SAFETY_MARGIN: Duration = Duration::seconds(2);

/// Alarms that would fall in the last minutes of the day are moved to midnight.
pub const END_OF_DAY_GUARD_MINUTES: u8 = 5;

/// The alarm to arm after observing the clock at `now`.
///
/// Normally the next minute boundary. The alarm facility does not re-fire an
/// alarm missed at the end of the day, so anything from 23:55 on is replaced
/// by 00:00 of the next day.
///
/// ```
/// use pocket_wallclock::{DaytimeHhmm, next_minute_alarm};
///
/// assert_eq!(next_minute_alarm(DaytimeHhmm::new(12, 41)), DaytimeHhmm::new(12, 42));
/// assert_eq!(next_minute_alarm(DaytimeHhmm::new(23, 56)), DaytimeHhmm::MIDNIGHT);
/// ```
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    reason = "Adding a Duration to a Time wraps within the day"
)]
pub fn next_minute_alarm(now: DaytimeHhmm) -> DaytimeHhmm {
    let alarm = Time::MIDNIGHT
        + Duration::minutes(i64::from(now.absolute_minutes()))
        + Duration::MINUTE
        + ALARM_SAFETY_MARGIN;

    if alarm.hour() == 23 && alarm.minute() >= 60 - END_OF_DAY_GUARD_MINUTES {
        DaytimeHhmm::MIDNIGHT
    } else {
        DaytimeHhmm::new(u16::from(alarm.hour()), u16::from(alarm.minute()))
    }
}

/// How long the minute alarm waits when the clock cannot be read.
pub const MINUTE_ALARM_FALLBACK: embassy_time::Duration = embassy_time::Duration::from_secs(60);

/// Time from `now` plus `second` seconds until the start of minute `at`.
/// If `at` is the current minute, the wait is a full day.
///
/// ```
/// use embassy_time::Duration;
/// use pocket_wallclock::{DaytimeHhmm, wait_until};
///
/// let now = DaytimeHhmm::new(12, 41);
/// assert_eq!(wait_until(now, 30, DaytimeHhmm::new(12, 42)), Duration::from_secs(30));
/// ```
#[must_use]
pub fn wait_until(now: DaytimeHhmm, second: u8, at: DaytimeHhmm) -> embassy_time::Duration {
    let minutes = match at.minutes_since(now) {
        0 => MINUTES_PER_DAY,
        minutes => minutes,
    };
    let seconds = u64::from(minutes)
        .saturating_mul(60)
        .saturating_sub(u64::from(second));
    embassy_time::Duration::from_secs(seconds)
}

/// Wait before the minute alarm for `at`, from a clock `reading` of time of
/// day and seconds. Without a reading the alarm still fires a minute from now.
#[must_use]
pub fn minute_alarm_wait(
    reading: Option<(DaytimeHhmm, u8)>,
    at: DaytimeHhmm,
) -> embassy_time::Duration {
    reading.map_or(MINUTE_ALARM_FALLBACK, |(now, second)| wait_until(now, second, at))
}

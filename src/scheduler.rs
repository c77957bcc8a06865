//! Power-off scheduling policy.
//!
//! Decides how many minutes the device stays on from "now", merging (in
//! priority order) a user override, the configured power-on/power-off window
//! and the keep-alive delay granted on every interaction. The result is
//! converted to ticks of the current [`ClockSpeed`] and written into the
//! [`Countdown`].

use embassy_time::Duration;

use crate::{Countdown, DaytimeHhmm, Settings};

/// Keep-alive delay used when the settings do not give one.
pub const DEFAULT_KEEP_ALIVE_MINUTES: u16 = 10;

/// Shortest delay ever derived from the power-off time, so a power-off time
/// that is imminent or just passed still leaves the user a moment.
pub const MIN_POWEROFF_DELAY_MINUTES: u16 = 4;

/// Tick cadence of the tick handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSpeed {
    /// One tick every two minutes. The battery-friendly normal mode.
    #[default]
    Slow,
    /// One tick every second.
    Fast,
}

impl ClockSpeed {
    /// Time between two ticks.
    #[must_use]
    pub const fn tick_period(self) -> Duration {
        match self {
            Self::Slow => Duration::from_secs(120),
            Self::Fast => Duration::from_secs(1),
        }
    }

    /// Number of ticks covering `minutes` at this speed (not yet clamped).
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Division by a non-zero constant"
    )]
    pub const fn ticks_for_minutes(self, minutes: u16) -> u32 {
        match self {
            Self::Slow => minutes as u32 / 2,
            Self::Fast => (minutes as u32).saturating_mul(60),
        }
    }

    /// The other speed.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Slow => Self::Fast,
            Self::Fast => Self::Slow,
        }
    }
}

/// Which rule produced a [`PowerOffDecision`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOffReason {
    /// The user forced a delay.
    Override,
    /// Inside the on-window, or the keep-alive would run past the power-off time:
    /// aligned to the power-off time.
    OnWindow,
    /// The keep-alive would run past the power-on time with no power-off time
    /// configured: extended through the power-on time.
    EnteringOnWindow,
    /// Plain keep-alive inside the off period.
    KeepAlive,
}

/// Minutes until power off, and why.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerOffDecision {
    pub minutes: u16,
    pub reason: PowerOffReason,
}

/// A decision together with the ticks written into the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduledPowerOff {
    pub decision: PowerOffDecision,
    pub ticks: u32,
}

/// Compute the power-off delay for `now`.
///
/// The first matching rule wins:
/// 1. an active override is used as is;
/// 2. inside the on-window (same-day or across midnight), or when the
///    keep-alive would run past the power-off time, the delay ends at the
///    power-off time (never below [`MIN_POWEROFF_DELAY_MINUTES`]);
/// 3. when the keep-alive would run past the power-on time, the same
///    power-off-aligned delay is used if a power-off time exists, otherwise the
///    keep-alive restarts at the power-on time;
/// 4. otherwise the keep-alive delay.
#[must_use]
pub fn poweroff_delay(
    now: DaytimeHhmm,
    settings: &Settings,
    override_minutes: Option<u16>,
) -> PowerOffDecision {
    if let Some(minutes) = override_minutes.filter(|&minutes| minutes != 0) {
        return PowerOffDecision {
            minutes,
            reason: PowerOffReason::Override,
        };
    }

    let keep_alive = settings
        .keep_alive_minutes
        .unwrap_or(DEFAULT_KEEP_ALIVE_MINUTES);
    let time_to_poff = settings
        .power_off_at
        .map(|poff| poff.minutes_since(now));
    let time_to_pon = settings.power_on_at.map(|pon| pon.minutes_since(now));

    let kbhit_crosses_poff =
        time_to_poff.is_some_and(|minutes| minutes > 0 && keep_alive > minutes);
    let kbhit_crosses_pon = time_to_pon.is_some_and(|minutes| keep_alive > minutes);
    let in_on_window = match (settings.power_on_at, settings.power_off_at) {
        (Some(pon), Some(poff)) if pon < poff => now >= pon && now < poff,
        (Some(pon), Some(poff)) if pon > poff => now >= pon || now < poff,
        _ => false,
    };

    match (time_to_poff, time_to_pon) {
        (Some(time_to_poff), _) if kbhit_crosses_poff || in_on_window => PowerOffDecision {
            minutes: time_to_poff.max(MIN_POWEROFF_DELAY_MINUTES),
            reason: PowerOffReason::OnWindow,
        },
        (Some(time_to_poff), Some(_)) if kbhit_crosses_pon => PowerOffDecision {
            minutes: time_to_poff.max(MIN_POWEROFF_DELAY_MINUTES),
            reason: PowerOffReason::OnWindow,
        },
        (None, Some(time_to_pon)) if kbhit_crosses_pon => PowerOffDecision {
            minutes: time_to_pon.saturating_add(keep_alive),
            reason: PowerOffReason::EnteringOnWindow,
        },
        _ => PowerOffDecision {
            minutes: keep_alive,
            reason: PowerOffReason::KeepAlive,
        },
    }
}

/// Recompute the power-off delay and program `countdown` with it.
///
/// Reads the override from `countdown`, converts the delay to ticks of
/// `speed`, and writes at least one tick (clearing a pending power-off flag).
pub fn schedule_next_poweroff(
    countdown: &Countdown,
    settings: &Settings,
    now: DaytimeHhmm,
    speed: ClockSpeed,
) -> ScheduledPowerOff {
    let decision = poweroff_delay(now, settings, countdown.override_minutes());
    let ticks = countdown.set_remaining_ticks(speed.ticks_for_minutes(decision.minutes));

    #[cfg(feature = "defmt")]
    defmt::info!(
        "Power off in {} min ({} ticks, {}, {:?}) at {}",
        decision.minutes,
        ticks,
        speed,
        decision.reason,
        now
    );

    ScheduledPowerOff { decision, ticks }
}

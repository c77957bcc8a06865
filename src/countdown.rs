//! State shared between the tick/minute handlers and the foreground loop.
//!
//! See [`Countdown`] for usage examples.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::{TimeDigits, TimerEvents};

/// The fields behind the [`Countdown`] lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CountdownSnapshot {
    /// Ticks left until power off. Zero means expired or never armed.
    pub remaining_ticks: u32,
    /// Raised by the tick handler when the countdown reaches zero.
    pub poweroff_now: bool,
    /// Raised by the minute handler.
    pub minute_elapsed: bool,
    /// Last minute-tens digit seen by the event evaluator.
    pub last_tens_digit: Option<u8>,
    /// User-forced delay in minutes, zero when unset.
    pub delay_override_minutes: u16,
}

impl CountdownSnapshot {
    const RESET: Self = Self {
        remaining_ticks: 0,
        poweroff_now: false,
        minute_elapsed: false,
        last_tens_digit: None,
        delay_override_minutes: 0,
    };
}

/// Power-off countdown shared across interrupt and foreground context.
///
/// Every access runs inside [`critical_section::with`], which masks the
/// handlers for its duration and restores them on every exit path. The two
/// edge-triggered flags are only exposed through receive-and-clear accessors,
/// so the foreground sees each event exactly once.
///
/// # Example
///
/// ```
/// use pocket_wallclock::Countdown;
///
/// static COUNTDOWN: Countdown = Countdown::new();
///
/// COUNTDOWN.set_remaining_ticks(2);
/// COUNTDOWN.on_tick(); // from the tick interrupt
/// assert!(!COUNTDOWN.take_poweroff_flag());
/// COUNTDOWN.on_tick();
/// assert!(COUNTDOWN.take_poweroff_flag());
/// assert!(!COUNTDOWN.take_poweroff_flag()); // cleared on read
/// ```
pub struct Countdown {
    state: Mutex<RefCell<CountdownSnapshot>>,
}

impl Countdown {
    /// Create a countdown in its reset state, suitable for a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(CountdownSnapshot::RESET)),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut CountdownSnapshot) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    // ===== Handlers ==========================================================

    /// Tick handler body, called at the hardware tick cadence.
    ///
    /// Decrements a running countdown. Reaching zero forgets the last
    /// minute-tens digit and raises the power-off flag. At zero it does nothing.
    pub fn on_tick(&self) {
        self.with(|state| {
            if state.remaining_ticks == 0 {
                return;
            }
            state.remaining_ticks = state.remaining_ticks.saturating_sub(1);
            if state.remaining_ticks == 0 {
                state.last_tens_digit = None;
                state.poweroff_now = true;
            }
        });
    }

    /// Minute handler body, called by the once-per-minute alarm.
    pub fn on_minute(&self) {
        self.with(|state| state.minute_elapsed = true);
    }

    // ===== Foreground ========================================================

    /// Read and clear the power-off flag.
    pub fn take_poweroff_flag(&self) -> bool {
        self.with(|state| core::mem::take(&mut state.poweroff_now))
    }

    /// Read and clear the minute-elapsed flag.
    pub fn take_minute_flag(&self) -> bool {
        self.with(|state| core::mem::take(&mut state.minute_elapsed))
    }

    /// Arm the countdown. Values below one are raised to one, so an already
    /// expired countdown is never programmed. Clears a pending power-off flag.
    ///
    /// Returns the value actually written.
    pub fn set_remaining_ticks(&self, ticks: u32) -> u32 {
        let ticks = ticks.max(1);
        self.with(|state| {
            state.poweroff_now = false;
            state.remaining_ticks = ticks;
        });
        ticks
    }

    /// Ticks left until power off.
    #[must_use]
    pub fn remaining_ticks(&self) -> u32 {
        self.with(|state| state.remaining_ticks)
    }

    /// Force the power-off delay to `minutes`, ignoring the schedule. Zero clears.
    pub fn set_override_minutes(&self, minutes: u16) {
        self.with(|state| state.delay_override_minutes = minutes);
    }

    /// Return to the configured schedule.
    pub fn clear_override(&self) {
        self.set_override_minutes(0);
    }

    /// The forced delay, if one is active.
    #[must_use]
    pub fn override_minutes(&self) -> Option<u16> {
        self.with(|state| Some(state.delay_override_minutes).filter(|&minutes| minutes != 0))
    }

    /// Compare the freshly read digits with the previous read and remember them.
    ///
    /// Read and update happen in one critical section, so a tick reaching zero
    /// in between cannot be lost.
    pub fn evaluate_events(&self, digits: TimeDigits) -> TimerEvents {
        self.with(|state| {
            let previous = state.last_tens_digit.replace(digits.minute_tens);
            TimerEvents::crossing(previous, digits.minute_tens)
        })
    }

    /// Return every field to its power-on state (used after the device resumes).
    pub fn reset(&self) {
        self.with(|state| *state = CountdownSnapshot::RESET);
    }

    /// Copy of all fields, taken atomically.
    #[must_use]
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.with(|state| *state)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

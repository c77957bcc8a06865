//! Hardware seen by the foreground controller.
//!
//! [`WallClock`](crate::WallClock) talks to the real-time clock, the tick
//! source, the chime and the user through [`Platform`], and to the display
//! through [`Screen`]. The device implementations live in `rp`; tests use fakes.

use crate::{ClockSpeed, DaytimeHhmm, Result, TimeDigits};

/// Real-time clock, alarm, tick source, chime and message boxes.
pub trait Platform {
    /// Read the current time from the real-time clock.
    ///
    /// # Errors
    /// Returns an error if the clock cannot be read.
    fn read_time(&mut self) -> Result<TimeDigits>;

    /// Arm the alarm that drives the minute handler (and wakes a powered-off device).
    fn arm_alarm(&mut self, at: DaytimeHhmm);

    /// Cancel any armed alarm.
    fn reset_alarm(&mut self);

    /// Change the tick handler cadence.
    fn set_clock_speed(&mut self, speed: ClockSpeed);

    /// One short chime.
    fn chime(&mut self);

    /// Show a transient message to the user.
    fn notify(&mut self, notice: Notice);
}

/// Messages shown to the user in response to commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    ClockSpeed(ClockSpeed),
    /// The power-off delay is forced to this many hours.
    OverrideSet { hours: u8 },
    OverrideCleared,
    AnimationWillStart,
    AnimationWillStop,
}

/// Placement of the clock and animation windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Arrangement {
    #[default]
    ClockLeftAnimationRight,
    ClockRightAnimationLeft,
}

impl Arrangement {
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            Self::ClockLeftAnimationRight => Self::ClockRightAnimationLeft,
            Self::ClockRightAnimationLeft => Self::ClockLeftAnimationRight,
        }
    }
}

/// Off-screen drawing surface, made visible by [`Screen::present`].
pub trait Screen {
    fn set_arrangement(&mut self, arrangement: Arrangement);

    /// Clear the whole surface to its background.
    fn clear(&mut self);

    fn draw_clock(&mut self, digits: TimeDigits);

    /// Reset the animation window to its first frame.
    fn prepare_animation(&mut self);

    /// Draw the next animation frame. Returns `true` once the run is over.
    fn animate(&mut self) -> bool;

    /// Copy the surface to the display.
    fn present(&mut self);
}

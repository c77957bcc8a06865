//! User input events.

/// Something the user asked for. Every command also counts as interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Force the power-off delay to this many hours. `0` returns to the schedule.
    Override(u8),
    /// Power off as soon as the foreground notices.
    PowerOffNow,
    /// Switch between one tick per two minutes and one tick per second.
    ToggleFastTicks,
    /// Start or stop the animation.
    ToggleAnimation,
    /// Swap the clock and animation windows.
    SwapWindows,
    /// Leave the control loop.
    Exit,
    /// Any other key or button. Only restarts the keep-alive.
    KeyPress,
}

impl Command {
    /// Keyboard mapping: digits, `o`, `f`, `a`, space and ESC. Every other
    /// key is a plain [`Command::KeyPress`].
    ///
    /// ```
    /// use pocket_wallclock::Command;
    ///
    /// assert_eq!(Command::from_key(b'3'), Command::Override(3));
    /// assert_eq!(Command::from_key(b' '), Command::SwapWindows);
    /// assert_eq!(Command::from_key(b'x'), Command::KeyPress);
    /// ```
    #[must_use]
    pub const fn from_key(key: u8) -> Self {
        match key {
            b'0'..=b'9' => Self::Override(key.saturating_sub(b'0')),
            b'o' | b'O' => Self::PowerOffNow,
            b'f' | b'F' => Self::ToggleFastTicks,
            b'a' | b'A' => Self::ToggleAnimation,
            b' ' => Self::SwapWindows,
            0x1B => Self::Exit,
            _ => Self::KeyPress,
        }
    }
}

//! Power schedule settings and their INI file format.
//!
//! ```ini
//! ; Keep the clock on from 06:00 to 20:00
//! [Timer]
//! TriggerPowerOnAt=06:00
//! TriggerPowerOffAt=20:00
//! PowerOffDelayKbhit=00:30
//! ```
//!
//! Every key is optional; a missing key disables that part of the schedule.

use crate::{DaytimeHhmm, Error, Result};

/// The settings file embedded at build time (see `build.rs`, `WALLCLOCK_INI`).
pub const EMBEDDED_INI: &str = include_str!(concat!(env!("OUT_DIR"), "/wallclock.ini"));

/// User power schedule. Each part is independently optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Time the device is woken (and the on-window starts).
    pub power_on_at: Option<DaytimeHhmm>,
    /// Time the on-window ends.
    pub power_off_at: Option<DaytimeHhmm>,
    /// Minutes the device stays on after an interaction in the off period.
    pub keep_alive_minutes: Option<u16>,
}

impl Settings {
    /// No schedule: keep-alive with the default delay only.
    pub const NONE: Self = Self {
        power_on_at: None,
        power_off_at: None,
        keep_alive_minutes: None,
    };

    /// Build settings from already validated values.
    #[must_use]
    pub const fn new(
        power_on_at: Option<DaytimeHhmm>,
        power_off_at: Option<DaytimeHhmm>,
        keep_alive_minutes: Option<u16>,
    ) -> Self {
        Self {
            power_on_at,
            power_off_at,
            keep_alive_minutes,
        }
    }

    /// Parse the `[Timer]` section of an INI file.
    ///
    /// Section and key names are case-insensitive. Blank lines and lines
    /// starting with `;` are skipped. Key lines outside any known section are
    /// ignored. A key given twice keeps its last value.
    ///
    /// # Errors
    ///
    /// Returns the first failing line as [`Error::UnknownSection`],
    /// [`Error::UnknownKey`] or [`Error::BadValue`].
    pub fn from_ini(text: &str) -> Result<Self> {
        let mut settings = Self::NONE;
        let mut in_timer_section = false;

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = u16::try_from(index.saturating_add(1)).unwrap_or(u16::MAX);
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                if section.trim().eq_ignore_ascii_case("Timer") {
                    in_timer_section = true;
                } else {
                    return Err(Error::UnknownSection { line: line_number });
                }
                continue;
            }

            if !in_timer_section {
                continue;
            }
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            let key = Key::parse(key.trim()).ok_or(Error::UnknownKey { line: line_number })?;
            let value =
                DaytimeHhmm::parse(value).map_err(|_| Error::BadValue { line: line_number })?;
            match key {
                Key::PowerOnAt => settings.power_on_at = Some(value),
                Key::PowerOffAt => settings.power_off_at = Some(value),
                Key::KeepAlive => settings.keep_alive_minutes = Some(value.absolute_minutes()),
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Settings: power on at {:?}, power off at {:?}, keep-alive {:?} min",
            settings.power_on_at,
            settings.power_off_at,
            settings.keep_alive_minutes
        );

        Ok(settings)
    }
}

#[derive(Clone, Copy)]
enum Key {
    PowerOnAt,
    PowerOffAt,
    KeepAlive,
}

impl Key {
    fn parse(name: &str) -> Option<Self> {
        [
            ("TriggerPowerOnAt", Self::PowerOnAt),
            ("TriggerPowerOffAt", Self::PowerOffAt),
            ("PowerOffDelayKbhit", Self::KeepAlive),
        ]
        .into_iter()
        .find_map(|(candidate, key)| candidate.eq_ignore_ascii_case(name).then_some(key))
    }
}

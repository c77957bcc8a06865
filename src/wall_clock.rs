//! The foreground controller.
//!
//! See [`WallClock`] for the control loop it is meant to drive.

use core::mem;
use core::ops::ControlFlow;

use crate::{
    Arrangement, ClockSpeed, Command, Countdown, DaytimeHhmm, Notice, Platform, Result,
    ScheduledPowerOff, Screen, Settings, TimeDigits, next_minute_alarm, schedule_next_poweroff,
};

/// Chimes played after the device powers back on.
pub const RESUME_CHIMES: u8 = 3;

/// What the caller should do after [`WallClock::service`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pass {
    /// Nothing left to do: wait for a handler wake-up or a command.
    Idle,
    /// The animation is running: poll for commands and call `service` again.
    Busy,
    /// Power the device off now. The wake alarm (if any) is already armed.
    /// Call [`WallClock::resume`] once the device is back.
    PowerOff { wake_at: Option<DaytimeHhmm> },
}

/// Animation progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Animation {
    #[default]
    Off,
    /// Enabled, waiting for the next minute boundary to run.
    Armed,
    /// Drawing frames continuously.
    Running,
}

/// Foreground state of the clock: what is on screen, how fast the tick
/// handler runs, and the pending work for the next [`service`](Self::service).
///
/// The caller owns the loop:
///
/// ```ignore
/// clock.start()?;
/// loop {
///     match clock.service()? {
///         Pass::Idle => /* wait for a wake-up or a command */,
///         Pass::Busy => /* poll for a command */,
///         Pass::PowerOff { wake_at } => {
///             /* power off, wait for wake_at or a key */
///             clock.resume()?;
///         }
///     }
///     // for every received command:
///     if clock.interact(command)?.is_break() { break; }
/// }
/// clock.shut_down();
/// ```
pub struct WallClock<'a, P, S> {
    countdown: &'a Countdown,
    settings: Settings,
    platform: P,
    screen: S,
    speed: ClockSpeed,
    arrangement: Arrangement,
    animation: Animation,
    digits: Option<TimeDigits>,
    refresh_screen: bool,
    redraw_clock: bool,
    prepare_animation: bool,
    present: bool,
    force_minute_pass: bool,
    force_poweroff: bool,
}

impl<'a, P: Platform, S: Screen> WallClock<'a, P, S> {
    /// A controller that will repaint everything and read the clock on its
    /// first [`service`](Self::service).
    pub fn new(countdown: &'a Countdown, settings: Settings, platform: P, mut screen: S) -> Self {
        let arrangement = Arrangement::default();
        screen.set_arrangement(arrangement);
        Self {
            countdown,
            settings,
            platform,
            screen,
            speed: ClockSpeed::default(),
            arrangement,
            animation: Animation::Off,
            digits: None,
            refresh_screen: true,
            redraw_clock: true,
            prepare_animation: false,
            present: true,
            force_minute_pass: true,
            force_poweroff: false,
        }
    }

    /// Program the first power-off countdown.
    ///
    /// # Errors
    /// Returns an error if the clock cannot be read.
    pub fn start(&mut self) -> Result<ScheduledPowerOff> {
        self.reschedule()
    }

    /// React to a user command. Any command other than [`Command::Exit`] and
    /// [`Command::PowerOffNow`] restarts the keep-alive from now.
    ///
    /// # Errors
    /// Returns an error if the clock cannot be read.
    pub fn interact(&mut self, command: Command) -> Result<ControlFlow<()>> {
        #[cfg(feature = "defmt")]
        defmt::info!("Command: {:?}", command);

        match command {
            Command::Exit => return Ok(ControlFlow::Break(())),
            Command::PowerOffNow => self.force_poweroff = true,
            Command::Override(0) => {
                self.countdown.clear_override();
                self.platform.notify(Notice::OverrideCleared);
                self.refresh_screen = true;
            }
            Command::Override(hours) => {
                self.countdown.set_override_minutes(u16::from(hours).saturating_mul(60));
                self.platform.notify(Notice::OverrideSet { hours });
                self.refresh_screen = true;
            }
            Command::ToggleAnimation => {
                if self.animation == Animation::Off {
                    if self.speed == ClockSpeed::Fast {
                        self.set_speed(ClockSpeed::Slow);
                    }
                    self.animation = Animation::Armed;
                    self.platform.notify(Notice::AnimationWillStart);
                } else {
                    self.stop_animation();
                }
                self.refresh_screen = true;
            }
            Command::ToggleFastTicks => {
                match self.speed {
                    ClockSpeed::Slow => {
                        self.set_speed(ClockSpeed::Fast);
                        if self.animation != Animation::Off {
                            self.platform.notify(Notice::AnimationWillStop);
                        }
                        self.stop_animation();
                    }
                    ClockSpeed::Fast => self.set_speed(ClockSpeed::Slow),
                }
                self.refresh_screen = true;
            }
            Command::SwapWindows => {
                self.swap_windows();
            }
            Command::KeyPress => {}
        }

        if !self.force_poweroff {
            self.reschedule()?;
        }
        // A repaint restarts a running animation from its first frame at the next minute.
        if self.refresh_screen && self.animation != Animation::Off {
            self.animation = Animation::Armed;
            self.prepare_animation = true;
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Handle everything pending: power off, minute pass, then screen work.
    ///
    /// # Errors
    /// Returns an error if the clock cannot be read.
    pub fn service(&mut self) -> Result<Pass> {
        let expired = self.countdown.take_poweroff_flag();
        let forced = mem::take(&mut self.force_poweroff);
        if expired || forced {
            self.platform.reset_alarm();
            let wake_at = self.settings.power_on_at;
            if let Some(wake_at) = wake_at {
                self.platform.arm_alarm(wake_at);
            }
            #[cfg(feature = "defmt")]
            defmt::info!("Powering off (forced: {}), wake at {:?}", forced, wake_at);
            return Ok(Pass::PowerOff { wake_at });
        }

        let minute_elapsed = self.countdown.take_minute_flag();
        if minute_elapsed || self.force_minute_pass {
            self.minute_pass()?;
        }

        self.draw();

        Ok(if self.animation == Animation::Running {
            Pass::Busy
        } else {
            Pass::Idle
        })
    }

    /// Continue after the device powered back on.
    ///
    /// Forgets every pending event and the override, programs a fresh
    /// countdown and makes the next [`service`](Self::service) read the clock.
    ///
    /// # Errors
    /// Returns an error if the clock cannot be read.
    pub fn resume(&mut self) -> Result<ScheduledPowerOff> {
        for _ in 0..RESUME_CHIMES {
            self.platform.chime();
        }
        self.countdown.reset();
        let scheduled = self.reschedule()?;
        self.force_minute_pass = true;
        #[cfg(feature = "defmt")]
        defmt::info!("Resumed");
        Ok(scheduled)
    }

    /// Leave the tick handler in its normal cadence.
    pub fn shut_down(&mut self) {
        self.platform.set_clock_speed(ClockSpeed::Slow);
    }

    #[must_use]
    pub const fn speed(&self) -> ClockSpeed {
        self.speed
    }

    #[must_use]
    pub const fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    #[must_use]
    pub const fn animation(&self) -> Animation {
        self.animation
    }

    /// Digits from the last clock read, `None` before the first one.
    #[must_use]
    pub const fn digits(&self) -> Option<TimeDigits> {
        self.digits
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    #[must_use]
    pub const fn screen(&self) -> &S {
        &self.screen
    }

    pub const fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    // ===== Internals =========================================================

    fn reschedule(&mut self) -> Result<ScheduledPowerOff> {
        let now = self.platform.read_time()?.daytime();
        Ok(schedule_next_poweroff(self.countdown, &self.settings, now, self.speed))
    }

    fn minute_pass(&mut self) -> Result<()> {
        let digits = self.platform.read_time()?;
        self.digits = Some(digits);
        let events = self.countdown.evaluate_events(digits);

        let alarm = next_minute_alarm(digits.daytime());
        self.platform.reset_alarm();
        self.platform.arm_alarm(alarm);

        #[cfg(feature = "defmt")]
        defmt::debug!("Minute pass at {}: {:?}, next alarm {}", digits, events, alarm);

        // A forced pass (startup, resume) is not a real minute boundary.
        if self.animation == Animation::Armed && !self.force_minute_pass {
            self.animation = Animation::Running;
            self.prepare_animation = true;
        }
        self.force_minute_pass = false;
        self.redraw_clock = true;

        if events.ten_minutes {
            self.swap_windows();
        }
        if events.half_hour {
            self.platform.chime();
        }
        if events.full_hour {
            self.platform.chime();
        }
        Ok(())
    }

    fn draw(&mut self) {
        if mem::take(&mut self.refresh_screen) {
            self.screen.clear();
            self.redraw_clock = true;
            if self.animation != Animation::Off {
                self.prepare_animation = true;
            }
        }
        if mem::take(&mut self.redraw_clock) {
            self.present = true;
            if let Some(digits) = self.digits {
                self.screen.draw_clock(digits);
            }
        }
        if mem::take(&mut self.prepare_animation) {
            self.present = true;
            self.screen.prepare_animation();
        }
        if self.animation == Animation::Running {
            self.present = true;
            if self.screen.animate() {
                self.animation = Animation::Armed;
            }
        }
        if mem::take(&mut self.present) {
            self.screen.present();
        }
    }

    fn swap_windows(&mut self) {
        self.arrangement = self.arrangement.swapped();
        self.screen.set_arrangement(self.arrangement);
        self.refresh_screen = true;
    }

    fn set_speed(&mut self, speed: ClockSpeed) {
        self.speed = speed;
        self.platform.set_clock_speed(speed);
        self.platform.notify(Notice::ClockSpeed(speed));
    }

    const fn stop_animation(&mut self) {
        self.animation = Animation::Off;
        self.prepare_animation = false;
    }
}

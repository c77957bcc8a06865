//! RP2040 side of the clock: handler tasks, real-time clock, power latch,
//! chime and a log-backed screen.
//!
//! The tick and minute handlers run on an `InterruptExecutor` at a higher
//! priority than the thread-mode foreground. They update [`COUNTDOWN`] and
//! then signal [`WAKE`].

use core::future::Future;

use embassy_executor::{SendSpawner, Spawner};
use embassy_futures::select::{Either, select};
use embassy_rp::Peri;
use embassy_rp::gpio::{AnyPin, Level, Output, Pin};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DateTimeFilter, DayOfWeek, Rtc};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::{AtomicBool, Ordering};

use crate::{
    Arrangement, ClockSpeed, Countdown, DaytimeHhmm, Notice, Platform, Result, Screen, TimeDigits,
    minute_alarm_wait, wait_until,
};

/// The countdown shared by the handlers and the foreground.
pub static COUNTDOWN: Countdown = Countdown::new();

/// Raised by a handler after it touched [`COUNTDOWN`].
pub static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static HANDLERS_ARMED: AtomicBool = AtomicBool::new(false);
static FAST_TICKS: AtomicBool = AtomicBool::new(false);
static SPEED_CHANGED: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static MINUTE_ALARM: Signal<CriticalSectionRawMutex, Option<Instant>> = Signal::new();

/// Let the handlers act on their events.
pub fn arm_handlers() {
    HANDLERS_ARMED.store(true, Ordering::Release);
}

/// Make the handlers ignore their events.
pub fn disarm_handlers() {
    HANDLERS_ARMED.store(false, Ordering::Release);
}

/// Spawn the tick and minute handlers on the high-priority executor.
///
/// # Errors
/// Returns an error if a task cannot be spawned.
pub fn spawn_handlers(spawner: SendSpawner) -> Result<()> {
    spawner.spawn(tick_task()?);
    spawner.spawn(minute_task()?);
    Ok(())
}

fn handlers_armed() -> bool {
    HANDLERS_ARMED.load(Ordering::Acquire)
}

fn current_speed() -> ClockSpeed {
    if FAST_TICKS.load(Ordering::Acquire) {
        ClockSpeed::Fast
    } else {
        ClockSpeed::Slow
    }
}

#[embassy_executor::task]
async fn tick_task() -> ! {
    loop {
        let period = current_speed().tick_period();
        // A speed change restarts the period instead of ticking.
        if let Either::First(()) = select(Timer::after(period), SPEED_CHANGED.wait()).await {
            if handlers_armed() {
                COUNTDOWN.on_tick();
                WAKE.signal(());
            }
        }
    }
}

#[embassy_executor::task]
async fn minute_task() -> ! {
    let mut deadline: Option<Instant> = None;
    loop {
        match deadline {
            None => deadline = MINUTE_ALARM.wait().await,
            Some(at) => match select(Timer::at(at), MINUTE_ALARM.wait()).await {
                Either::First(()) => {
                    deadline = None;
                    if handlers_armed() {
                        COUNTDOWN.on_minute();
                        WAKE.signal(());
                    }
                }
                Either::Second(rearmed) => deadline = rearmed,
            },
        }
    }
}

// ===== Platform =============================================================

/// Static resources for [`RpPlatform`].
pub type ChimeStatic = Channel<CriticalSectionRawMutex, (), 4>;

const CHIME_HALF_PERIOD: Duration = Duration::from_micros(500);
const CHIME_CYCLES: u16 = 150;

/// Real-time clock, power latch and chime of the board.
pub struct RpPlatform {
    rtc: Rtc<'static, RTC>,
    power_hold: Output<'static>,
    chimes: &'static ChimeStatic,
}

impl RpPlatform {
    #[must_use]
    pub const fn new_static() -> ChimeStatic {
        Channel::new()
    }

    /// Take the real-time clock, latch the power on through `power_hold` and
    /// start the chime task on `buzzer`.
    ///
    /// A real-time clock that is not running yet starts at midnight.
    ///
    /// # Errors
    /// Returns an error if the clock cannot be started or the chime task
    /// cannot be spawned.
    pub fn new<H: Pin, B: Pin>(
        rtc: Peri<'static, RTC>,
        power_hold: Peri<'static, H>,
        buzzer: Peri<'static, B>,
        chimes: &'static ChimeStatic,
        spawner: Spawner,
    ) -> Result<Self> {
        let mut rtc = Rtc::new(rtc);
        if !rtc.is_running() {
            defmt::warn!("Real-time clock not running, starting at 00:00");
            rtc.set_datetime(DateTime {
                year: 2024,
                month: 1,
                day: 1,
                day_of_week: DayOfWeek::Monday,
                hour: 0,
                minute: 0,
                second: 0,
            })?;
        }

        let power_hold: Peri<'static, AnyPin> = power_hold.into();
        let buzzer: Peri<'static, AnyPin> = buzzer.into();
        let token = chime_task(Output::new(buzzer, Level::Low), chimes)?;
        spawner.spawn(token);

        Ok(Self {
            rtc,
            power_hold: Output::new(power_hold, Level::High),
            chimes,
        })
    }

    /// Release the power latch, then wait until `wake_at` or until `key`
    /// completes, whichever is first. Returns with the latch held again.
    ///
    /// On battery the device dies when the latch is released and the
    /// real-time clock alarm powers it back on; on external power this
    /// waits in place.
    pub async fn power_off(&mut self, wake_at: Option<DaytimeHhmm>, key: impl Future) {
        let wait = wake_at.and_then(|at| {
            self.rtc
                .schedule_alarm(DateTimeFilter::default().hour(at.hour()).minute(at.minute()));
            self.until(at)
        });
        defmt::info!("Power latch released");
        self.power_hold.set_low();

        match wait {
            Some(wait) => {
                select(Timer::after(wait), key).await;
            }
            None => {
                key.await;
            }
        }

        self.power_hold.set_high();
        self.rtc.disable_alarm();
        defmt::info!("Power latch held");
    }

    fn now(&mut self) -> Option<DateTime> {
        let now = self.rtc.now().ok();
        if now.is_none() {
            defmt::warn!("Real-time clock read failed");
        }
        now
    }

    fn reading(&mut self) -> Option<(DaytimeHhmm, u8)> {
        self.now()
            .map(|now| (DaytimeHhmm::new(now.hour.into(), now.minute.into()), now.second))
    }

    /// Time from now until the next `at`, a full day if `at` is this minute.
    fn until(&mut self, at: DaytimeHhmm) -> Option<Duration> {
        self.reading().map(|(now, second)| wait_until(now, second, at))
    }
}

impl Platform for RpPlatform {
    fn read_time(&mut self) -> Result<TimeDigits> {
        let now = self.rtc.now()?;
        Ok(TimeDigits::from_daytime(DaytimeHhmm::new(
            now.hour.into(),
            now.minute.into(),
        )))
    }

    fn arm_alarm(&mut self, at: DaytimeHhmm) {
        let wait = minute_alarm_wait(self.reading(), at);
        let deadline = Instant::now().checked_add(wait).unwrap_or(Instant::MAX);
        defmt::debug!("Minute alarm armed for {} in {}s", at, wait.as_secs());
        MINUTE_ALARM.signal(Some(deadline));
    }

    fn reset_alarm(&mut self) {
        MINUTE_ALARM.signal(None);
        self.rtc.disable_alarm();
    }

    fn set_clock_speed(&mut self, speed: ClockSpeed) {
        FAST_TICKS.store(speed == ClockSpeed::Fast, Ordering::Release);
        SPEED_CHANGED.signal(());
    }

    fn chime(&mut self) {
        // A full queue drops the chime.
        let _ = self.chimes.try_send(());
    }

    fn notify(&mut self, notice: Notice) {
        defmt::info!("Notice: {:?}", notice);
    }
}

#[embassy_executor::task]
async fn chime_task(mut buzzer: Output<'static>, chimes: &'static ChimeStatic) -> ! {
    loop {
        chimes.receive().await;
        for _ in 0..CHIME_CYCLES {
            buzzer.set_high();
            Timer::after(CHIME_HALF_PERIOD).await;
            buzzer.set_low();
            Timer::after(CHIME_HALF_PERIOD).await;
        }
        Timer::after_millis(100).await;
    }
}

// ===== Screen ===============================================================

/// Frames in one animation run.
pub const ANIMATION_FRAMES: u8 = 24;

/// A [`Screen`] that logs what it would draw.
#[derive(Default)]
pub struct LogScreen {
    arrangement: Arrangement,
    digits: Option<TimeDigits>,
    frame: u8,
}

impl LogScreen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arrangement: Arrangement::ClockLeftAnimationRight,
            digits: None,
            frame: 0,
        }
    }
}

impl Screen for LogScreen {
    fn set_arrangement(&mut self, arrangement: Arrangement) {
        self.arrangement = arrangement;
    }

    fn clear(&mut self) {
        self.digits = None;
    }

    fn draw_clock(&mut self, digits: TimeDigits) {
        self.digits = Some(digits);
    }

    fn prepare_animation(&mut self) {
        self.frame = 0;
    }

    fn animate(&mut self) -> bool {
        self.frame = self.frame.saturating_add(1);
        self.frame >= ANIMATION_FRAMES
    }

    fn present(&mut self) {
        if let Some(digits) = self.digits {
            defmt::info!("[{:?}] {} (frame {})", self.arrangement, digits, self.frame);
        }
    }
}

//! Wall clock firmware for a Raspberry Pi Pico (RP2040).
//!
//! Keeps the time on screen and powers the board off according to the
//! schedule embedded from `wallclock.ini`. Input comes from an NEC infrared
//! remote on GP28; the power latch is on GP22 and the buzzer on GP15.
#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "Single-threaded")]

use core::convert::Infallible;
use core::future;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_futures::select::{Either, select};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::{Duration, Timer};
use panic_probe as _;
use pocket_wallclock::remote::{Remote, RemoteKeymap, RemoteStatic};
use pocket_wallclock::rp::{self, COUNTDOWN, ChimeStatic, LogScreen, RpPlatform, WAKE};
use pocket_wallclock::{EMBEDDED_INI, Pass, Result, Settings, WallClock};

/// Pause between animation frames while still listening for the remote.
const FRAME_PERIOD: Duration = Duration::from_millis(80);

static HANDLER_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
#[expect(unsafe_code, reason = "Executor entry point, called only from its own interrupt")]
unsafe fn SWI_IRQ_1() {
    unsafe { HANDLER_EXECUTOR.on_interrupt() }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    core::panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // A bad settings file is a startup failure.
    let settings = Settings::from_ini(EMBEDDED_INI)?;

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    rp::spawn_handlers(HANDLER_EXECUTOR.start(interrupt::SWI_IRQ_1))?;

    static CHIME_STATIC: ChimeStatic = RpPlatform::new_static();
    let platform = RpPlatform::new(p.RTC, p.PIN_22, p.PIN_15, &CHIME_STATIC, spawner)?;

    static REMOTE_STATIC: RemoteStatic = Remote::<15>::new_static();
    let remote = Remote::new(p.PIN_28, RemoteKeymap::default(), &REMOTE_STATIC, spawner)?;

    let mut clock = WallClock::new(&COUNTDOWN, settings, platform, LogScreen::new());
    rp::arm_handlers();
    clock.start()?;
    info!("Wall clock running");

    loop {
        let command = match clock.service()? {
            Pass::Idle => match select(WAKE.wait(), remote.wait()).await {
                Either::First(()) => None,
                Either::Second(command) => Some(command),
            },
            Pass::Busy => match select(Timer::after(FRAME_PERIOD), remote.wait()).await {
                Either::First(()) => None,
                Either::Second(command) => Some(command),
            },
            Pass::PowerOff { wake_at } => {
                clock.platform_mut().power_off(wake_at, remote.wait()).await;
                clock.resume()?;
                None
            }
        };

        if let Some(command) = command {
            if clock.interact(command)?.is_break() {
                break;
            }
        }
    }

    rp::disarm_handlers();
    clock.shut_down();
    info!("Wall clock stopped, powering off");
    clock.platform_mut().power_off(None, future::pending::<()>()).await;
    future::pending().await
}

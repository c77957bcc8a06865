//! Host-level tests for the foreground controller, against a fake board.

use std::ops::ControlFlow;

use pocket_wallclock::{
    Animation, Arrangement, ClockSpeed, Command, Countdown, DaytimeHhmm, Notice, Pass, Platform,
    RESUME_CHIMES, Result, Screen, Settings, TimeDigits, WallClock,
};

#[derive(Debug, Default)]
struct FakePlatform {
    now: DaytimeHhmm,
    alarm: Option<DaytimeHhmm>,
    speed: ClockSpeed,
    chimes: u32,
    notices: Vec<Notice>,
    reads: u32,
}

impl Platform for FakePlatform {
    fn read_time(&mut self) -> Result<TimeDigits> {
        self.reads += 1;
        Ok(TimeDigits::from_daytime(self.now))
    }

    fn arm_alarm(&mut self, at: DaytimeHhmm) {
        self.alarm = Some(at);
    }

    fn reset_alarm(&mut self) {
        self.alarm = None;
    }

    fn set_clock_speed(&mut self, speed: ClockSpeed) {
        self.speed = speed;
    }

    fn chime(&mut self) {
        self.chimes += 1;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[derive(Debug, Default)]
struct FakeScreen {
    arrangement: Arrangement,
    clears: u32,
    drawn: Option<TimeDigits>,
    preparations: u32,
    frames: u32,
    frames_per_run: u32,
    presents: u32,
}

impl Screen for FakeScreen {
    fn set_arrangement(&mut self, arrangement: Arrangement) {
        self.arrangement = arrangement;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw_clock(&mut self, digits: TimeDigits) {
        self.drawn = Some(digits);
    }

    fn prepare_animation(&mut self) {
        self.preparations += 1;
        self.frames = 0;
    }

    fn animate(&mut self) -> bool {
        self.frames += 1;
        self.frames >= self.frames_per_run
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

fn clock_at<'a>(
    countdown: &'a Countdown,
    settings: Settings,
    hour: u16,
    minute: u16,
) -> WallClock<'a, FakePlatform, FakeScreen> {
    let platform = FakePlatform {
        now: DaytimeHhmm::new(hour, minute),
        ..FakePlatform::default()
    };
    let screen = FakeScreen {
        frames_per_run: 3,
        ..FakeScreen::default()
    };
    WallClock::new(countdown, settings, platform, screen)
}

fn set_time(clock: &mut WallClock<'_, FakePlatform, FakeScreen>, hour: u16, minute: u16) {
    clock.platform_mut().now = DaytimeHhmm::new(hour, minute);
}

#[test]
fn first_service_reads_draws_and_arms_the_alarm() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 41);
    let scheduled = clock.start().unwrap();
    assert_eq!(scheduled.decision.minutes, 10);
    assert_eq!(countdown.remaining_ticks(), 5);

    assert_eq!(clock.digits(), None);
    assert_eq!(clock.service().unwrap(), Pass::Idle);
    assert_eq!(clock.digits(), Some(TimeDigits::from_daytime(DaytimeHhmm::new(12, 41))));
    assert_eq!(clock.platform().alarm, Some(DaytimeHhmm::new(12, 42)));
    assert_eq!(clock.screen().clears, 1);
    assert_eq!(clock.screen().drawn, clock.digits());
    assert_eq!(clock.screen().presents, 1);
    assert_eq!(clock.platform().chimes, 0);

    // nothing pending: nothing redrawn
    assert_eq!(clock.service().unwrap(), Pass::Idle);
    assert_eq!(clock.screen().presents, 1);
}

#[test]
fn minute_pass_follows_the_minute_flag() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 41);
    clock.service().unwrap();
    let reads = clock.platform().reads;

    set_time(&mut clock, 12, 42);
    countdown.on_minute();
    clock.service().unwrap();
    assert_eq!(clock.platform().reads, reads + 1);
    assert_eq!(clock.platform().alarm, Some(DaytimeHhmm::new(12, 43)));
    assert_eq!(clock.screen().presents, 2);
}

#[test]
fn ten_minute_boundary_swaps_windows() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 19);
    clock.service().unwrap();
    assert_eq!(clock.arrangement(), Arrangement::ClockLeftAnimationRight);

    set_time(&mut clock, 12, 20);
    countdown.on_minute();
    clock.service().unwrap();
    assert_eq!(clock.arrangement(), Arrangement::ClockRightAnimationLeft);
    assert_eq!(clock.screen().arrangement, Arrangement::ClockRightAnimationLeft);
    assert_eq!(clock.screen().clears, 2);
    assert_eq!(clock.platform().chimes, 0);
}

#[test]
fn half_and_full_hour_chime() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 29);
    clock.service().unwrap();

    set_time(&mut clock, 12, 30);
    countdown.on_minute();
    clock.service().unwrap();
    assert_eq!(clock.platform().chimes, 1);

    set_time(&mut clock, 13, 0);
    countdown.on_minute();
    clock.service().unwrap();
    // the rollover raises both the half-hour and the full-hour chime
    assert_eq!(clock.platform().chimes, 3);
}

#[test]
fn end_of_day_alarm_goes_to_midnight() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 23, 56);
    clock.service().unwrap();
    assert_eq!(clock.platform().alarm, Some(DaytimeHhmm::MIDNIGHT));
}

#[test]
fn expiry_powers_off_with_the_wake_alarm() {
    let countdown = Countdown::new();
    let settings = Settings::new(Some(DaytimeHhmm::new(6, 30)), None, None);
    let mut clock = clock_at(&countdown, settings, 22, 0);
    clock.start().unwrap();
    clock.service().unwrap();

    for _ in 0..5 {
        countdown.on_tick();
    }
    assert_eq!(
        clock.service().unwrap(),
        Pass::PowerOff {
            wake_at: Some(DaytimeHhmm::new(6, 30))
        }
    );
    assert_eq!(clock.platform().alarm, Some(DaytimeHhmm::new(6, 30)));
}

#[test]
fn power_off_without_power_on_time_leaves_no_alarm() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 22, 0);
    clock.service().unwrap();
    assert!(clock.interact(Command::PowerOffNow).unwrap().is_continue());
    assert_eq!(clock.service().unwrap(), Pass::PowerOff { wake_at: None });
    assert_eq!(clock.platform().alarm, None);
    // handled once
    assert_eq!(clock.service().unwrap(), Pass::Idle);
}

#[test]
fn power_off_now_does_not_reschedule() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 22, 0);
    countdown.set_remaining_ticks(42);
    clock.interact(Command::PowerOffNow).unwrap();
    assert_eq!(countdown.remaining_ticks(), 42);
}

#[test]
fn resume_resets_reschedules_and_chimes() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 22, 0);
    clock.start().unwrap();
    clock.interact(Command::Override(2)).unwrap();
    clock.service().unwrap();
    countdown.on_minute();

    clock.interact(Command::PowerOffNow).unwrap();
    assert!(matches!(clock.service().unwrap(), Pass::PowerOff { .. }));

    set_time(&mut clock, 6, 30);
    let scheduled = clock.resume().unwrap();
    assert_eq!(countdown.override_minutes(), None);
    assert_eq!(scheduled.decision.minutes, 10);
    assert_eq!(countdown.remaining_ticks(), 5);
    assert_eq!(clock.platform().chimes, u32::from(RESUME_CHIMES));

    // forced minute pass primes the digit without boundary events
    assert_eq!(clock.service().unwrap(), Pass::Idle);
    assert_eq!(clock.digits(), Some(TimeDigits::from_daytime(DaytimeHhmm::new(6, 30))));
    assert_eq!(clock.platform().alarm, Some(DaytimeHhmm::new(6, 31)));
    assert_eq!(clock.platform().chimes, u32::from(RESUME_CHIMES));
    assert_eq!(countdown.snapshot().last_tens_digit, Some(3));
}

#[test]
fn override_commands() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);

    clock.interact(Command::Override(3)).unwrap();
    assert_eq!(countdown.override_minutes(), Some(180));
    assert_eq!(countdown.remaining_ticks(), 90);

    clock.interact(Command::Override(0)).unwrap();
    assert_eq!(countdown.override_minutes(), None);
    assert_eq!(countdown.remaining_ticks(), 5);

    assert_eq!(
        clock.platform().notices,
        [Notice::OverrideSet { hours: 3 }, Notice::OverrideCleared]
    );
}

#[test]
fn every_interaction_restarts_the_keep_alive() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.start().unwrap();
    countdown.on_tick();
    countdown.on_tick();
    assert_eq!(countdown.remaining_ticks(), 3);

    clock.interact(Command::SwapWindows).unwrap();
    assert_eq!(countdown.remaining_ticks(), 5);
}

#[test]
fn unmapped_key_restarts_the_keep_alive() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.start().unwrap();
    for _ in 0..4 {
        countdown.on_tick();
    }
    assert_eq!(countdown.remaining_ticks(), 1);

    let command = Command::from_key(b'x');
    assert_eq!(command, Command::KeyPress);
    assert_eq!(clock.interact(command).unwrap(), ControlFlow::Continue(()));
    assert_eq!(countdown.remaining_ticks(), 5);
    assert_eq!(clock.arrangement(), Arrangement::default());
    assert_eq!(clock.animation(), Animation::Off);
    assert!(clock.platform().notices.is_empty());
}

#[test]
fn minute_passes_do_not_extend_the_keep_alive() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.start().unwrap();
    countdown.on_tick();
    countdown.on_minute();
    clock.service().unwrap();
    assert_eq!(countdown.remaining_ticks(), 4);
}

#[test]
fn fast_ticks_toggle() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);

    clock.interact(Command::ToggleFastTicks).unwrap();
    assert_eq!(clock.speed(), ClockSpeed::Fast);
    assert_eq!(clock.platform().speed, ClockSpeed::Fast);
    assert_eq!(countdown.remaining_ticks(), 600);

    clock.interact(Command::ToggleFastTicks).unwrap();
    assert_eq!(clock.speed(), ClockSpeed::Slow);
    assert_eq!(countdown.remaining_ticks(), 5);
    assert_eq!(
        clock.platform().notices,
        [
            Notice::ClockSpeed(ClockSpeed::Fast),
            Notice::ClockSpeed(ClockSpeed::Slow)
        ]
    );
}

#[test]
fn animation_waits_for_the_next_minute_then_runs() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.service().unwrap();

    clock.interact(Command::ToggleAnimation).unwrap();
    assert_eq!(clock.animation(), Animation::Armed);
    assert_eq!(clock.platform().notices, [Notice::AnimationWillStart]);
    assert_eq!(clock.service().unwrap(), Pass::Idle);

    set_time(&mut clock, 12, 1);
    countdown.on_minute();
    assert_eq!(clock.service().unwrap(), Pass::Busy);
    assert_eq!(clock.animation(), Animation::Running);
    assert_eq!(clock.service().unwrap(), Pass::Busy);
    // third frame finishes the run
    assert_eq!(clock.service().unwrap(), Pass::Idle);
    assert_eq!(clock.animation(), Animation::Armed);
    assert_eq!(clock.screen().frames, 3);
}

#[test]
fn animation_toggles_off() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.interact(Command::ToggleAnimation).unwrap();
    clock.interact(Command::ToggleAnimation).unwrap();
    assert_eq!(clock.animation(), Animation::Off);
}

#[test]
fn starting_the_animation_leaves_fast_ticks() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.interact(Command::ToggleFastTicks).unwrap();
    clock.interact(Command::ToggleAnimation).unwrap();
    assert_eq!(clock.speed(), ClockSpeed::Slow);
    assert_eq!(clock.animation(), Animation::Armed);
}

#[test]
fn fast_ticks_stop_the_animation() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    clock.interact(Command::ToggleAnimation).unwrap();
    clock.interact(Command::ToggleFastTicks).unwrap();
    assert_eq!(clock.animation(), Animation::Off);
    assert!(clock.platform().notices.contains(&Notice::AnimationWillStop));
}

#[test]
fn exit_breaks_without_rescheduling() {
    let countdown = Countdown::new();
    let mut clock = clock_at(&countdown, Settings::NONE, 12, 0);
    assert_eq!(clock.interact(Command::Exit).unwrap(), ControlFlow::Break(()));
    assert_eq!(countdown.remaining_ticks(), 0);

    clock.interact(Command::ToggleFastTicks).unwrap();
    clock.shut_down();
    assert_eq!(clock.platform().speed, ClockSpeed::Slow);
}

#[test]
fn on_window_settings_flow_through() {
    let countdown = Countdown::new();
    let settings = Settings::from_ini("[Timer]\nTriggerPowerOnAt=06:00\nTriggerPowerOffAt=20:00")
        .unwrap();
    let mut clock = clock_at(&countdown, settings, 19, 0);
    let scheduled = clock.start().unwrap();
    assert_eq!(scheduled.decision.minutes, 60);
    assert_eq!(clock.settings(), &settings);
}

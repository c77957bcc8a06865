//! Host-level tests for the `[Timer]` settings file.

use pocket_wallclock::{DaytimeHhmm, Error, Settings};

#[test]
fn full_timer_section() {
    let settings = Settings::from_ini(
        "; comment\n\
         [Timer]\n\
         TriggerPowerOnAt=06:30\n\
         TriggerPowerOffAt = 22:00\n\
         PowerOffDelayKbhit=01:30\n",
    )
    .unwrap();
    assert_eq!(settings.power_on_at, Some(DaytimeHhmm::new(6, 30)));
    assert_eq!(settings.power_off_at, Some(DaytimeHhmm::new(22, 0)));
    assert_eq!(settings.keep_alive_minutes, Some(90));
}

#[test]
fn empty_file_disables_everything() {
    assert_eq!(Settings::from_ini(""), Ok(Settings::NONE));
    assert_eq!(Settings::from_ini("\n; nothing\n\n"), Ok(Settings::default()));
}

#[test]
fn keys_and_sections_are_case_insensitive() {
    let settings =
        Settings::from_ini("[timer]\ntriggerpoweronat=7:05\npoweroffdelaykbhit=0:45").unwrap();
    assert_eq!(settings.power_on_at, Some(DaytimeHhmm::new(7, 5)));
    assert_eq!(settings.power_off_at, None);
    assert_eq!(settings.keep_alive_minutes, Some(45));
}

#[test]
fn keys_before_any_section_are_ignored() {
    let settings = Settings::from_ini("TriggerPowerOnAt=06:00\n[Timer]\n").unwrap();
    assert_eq!(settings, Settings::NONE);
}

#[test]
fn windows_line_endings() {
    let settings = Settings::from_ini("[Timer]\r\nTriggerPowerOffAt=21:00\r\n").unwrap();
    assert_eq!(settings.power_off_at, Some(DaytimeHhmm::new(21, 0)));
}

#[test]
fn unknown_section_reports_its_line() {
    assert_eq!(
        Settings::from_ini("[Timer]\nTriggerPowerOnAt=06:00\n\n[Display]\n"),
        Err(Error::UnknownSection { line: 4 })
    );
}

#[test]
fn unknown_key_reports_its_line() {
    assert_eq!(
        Settings::from_ini("[Timer]\nTriggerPowerOnAt=06:00\nBrightness=10:00\n"),
        Err(Error::UnknownKey { line: 3 })
    );
}

#[test]
fn bad_values_report_their_line() {
    for (text, line) in [
        ("[Timer]\nTriggerPowerOnAt=25:00", 2),
        ("[Timer]\n\nTriggerPowerOffAt=noon", 3),
        ("[Timer]\nPowerOffDelayKbhit", 2),
        ("[Timer]\nPowerOffDelayKbhit=", 2),
    ] {
        assert_eq!(
            Settings::from_ini(text),
            Err(Error::BadValue { line }),
            "{text:?}"
        );
    }
}

#[test]
fn errors_display_the_line() {
    assert_eq!(
        Error::UnknownKey { line: 3 }.to_string(),
        "Settings line 3: unknown key in section 'Timer'"
    );
}

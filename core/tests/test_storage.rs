// core/tests/test_storage.rs
use std::fs;

use tempcoef_core::{load_settings, save_settings, SegmentSettings, TempInput};

#[test]
fn test_settings_roundtrip_stamps_saved_at() {
    let path = std::env::temp_dir().join(format!("tempcoef_settings_{}.json", std::process::id()));

    // Sørg for ren start (slett hvis filen finnes)
    let _ = fs::remove_file(&path);

    let settings = SegmentSettings {
        tolerance: 0.5,
        min_duration: 12.0,
        cooling_surface: 0.0314,
        compound: Some(TempInput::Column("Tc".into())),
        machine: Some(TempInput::Fixed(22.5)),
        saved_at: None,
    };

    let stamped = save_settings(&settings, &path).expect("save_settings failed");
    assert!(stamped.saved_at.is_some());

    let loaded = load_settings(&path).expect("load_settings failed");
    assert_eq!(loaded.tolerance, 0.5);
    assert_eq!(loaded.min_duration, 12.0);
    assert_eq!(loaded.cooling_surface, 0.0314);
    assert_eq!(loaded.compound, Some(TempInput::Column("Tc".into())));
    assert_eq!(loaded.machine, Some(TempInput::Fixed(22.5)));
    assert_eq!(loaded.saved_at, stamped.saved_at);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_file_gives_defaults() {
    let path = std::env::temp_dir().join("tempcoef_settings_does_not_exist.json");
    let _ = fs::remove_file(&path);

    let loaded = load_settings(&path).expect("load_settings failed");
    assert_eq!(loaded, SegmentSettings::default());
    assert_eq!(loaded.min_duration, 10.0);
}

#[test]
fn test_partial_file_fills_defaults() {
    let path = std::env::temp_dir().join(format!("tempcoef_partial_{}.json", std::process::id()));
    fs::write(&path, r#"{"cooling_surface": 2.5}"#).unwrap();

    let loaded = load_settings(&path).expect("load_settings failed");
    assert_eq!(loaded.tolerance, 0.0);
    assert_eq!(loaded.min_duration, 10.0);
    assert_eq!(loaded.cooling_surface, 2.5);
    assert_eq!(loaded.compound, None);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_broken_file_is_an_error() {
    let path = std::env::temp_dir().join(format!("tempcoef_broken_{}.json", std::process::id()));
    fs::write(&path, r#"{"cooling_surface": "big"}"#).unwrap();

    let err = load_settings(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("cooling_surface"));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_remembered_inputs_survive_save() {
    let path = std::env::temp_dir().join(format!("tempcoef_inputs_{}.json", std::process::id()));
    let _ = fs::remove_file(&path);

    let mut settings = SegmentSettings::default();
    settings.remember_inputs(&TempInput::Fixed(65.0), &TempInput::Column("Machine Temp".into()));
    save_settings(&settings, &path).expect("save_settings failed");

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"fixed\": 65.0"));

    let loaded = load_settings(&path).expect("load_settings failed");
    assert_eq!(loaded.compound, Some(TempInput::Fixed(65.0)));
    assert_eq!(loaded.machine, Some(TempInput::Column("Machine Temp".into())));

    let _ = fs::remove_file(&path);
}

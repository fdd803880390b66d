// SPDX-License-Identifier: MPL-2.0
//! Integration tests for persisted preferences feeding the engine.

use course_player::config::{self, PlayerConfig};
use course_player::domain::playback::{ContentAtom, PlaybackStatus};
use course_player::infrastructure::SimulatedFactory;
use course_player::player::PlaybackStore;
use tempfile::tempdir;

#[test]
fn test_saved_preferences_drive_a_new_store() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("CoursePlayer").join("player.toml");
    let preferences = PlayerConfig {
        volume: Some(0.25),
        playback_rate: Some(1.5),
        seek_step_secs: Some(15.0),
        autoplay: Some(true),
        ..PlayerConfig::default()
    };
    config::save_to_path(&preferences, &path).expect("failed to save config");

    let loaded = config::load_from_path(&path).expect("failed to load config");
    let factory = SimulatedFactory::new().with_default_duration(120.0);
    let mut store = PlaybackStore::new(Box::new(factory), loaded.engine_settings());

    store.load(
        ContentAtom::new("l1", "Lesson").with_audio("lesson.mp3"),
        None,
    );
    store.run_until_idle();

    let state = store.state();
    assert_eq!(state.status, PlaybackStatus::Playing);
    assert!((state.volume.value() - 0.25).abs() < f32::EPSILON);
    assert!((state.playback_rate.value() - 1.5).abs() < f64::EPSILON);

    store.skip_forward();
    assert!((store.state().current_time - 15.0).abs() < 1e-9);
}

#[test]
fn test_missing_file_reports_io_error() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let result = config::load_from_path(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(course_player::error::Error::Io(_))));
}

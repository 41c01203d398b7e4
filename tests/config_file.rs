use lightbox_viewer::config::{Action, InputBinding};
use lightbox_viewer::error::ConfigError;
use lightbox_viewer::Config;

#[test]
fn missing_file_is_created_from_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.ini");

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[Shortcuts]"));
    assert_eq!(config.zoom_step, 1.2);
    assert_eq!(config.action_for(&InputBinding::Key(egui::Key::Escape)), Some(Action::Close));
}

#[test]
fn existing_file_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ini");
    std::fs::write(&path, "[Settings]\nkey_pan_step = 45\n").unwrap();

    let config = Config::load_or_create(&path).unwrap();
    assert_eq!(config.key_pan_step, 45.0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[Settings]\nkey_pan_step = 45\n");
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ini");

    let mut config = Config::parse_ini("[Shortcuts]\nrotate = ctrl+r\n");
    config.wheel_pan_speed = 12.0;
    config.show_info_panel = false;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.wheel_pan_speed, 12.0);
    assert!(!loaded.show_info_panel);
    assert_eq!(
        loaded.bindings_for(Action::Rotate),
        &[InputBinding::KeyWithCtrl(egui::Key::R)]
    );
}

#[test]
fn unreadable_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(&dir.path().join("absent.ini")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

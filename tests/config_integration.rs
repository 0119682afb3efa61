//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use tilerun::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("TR_PHYSICS__GRAVITY", "600");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("TR_PHYSICS__GRAVITY");
    assert_eq!(config.physics.gravity, 600.0);
    // Other keys still come from the file
    assert_eq!(config.physics.jump_force, 30000.0);
}

#[test]
#[serial]
fn test_env_override_string_and_bool() {
    std::env::set_var("TR_LEVEL__PLAYER_TEMPLATE", "crate");
    std::env::set_var("TR_DEBUG__COLLECT_DIAGNOSTICS", "true");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("TR_LEVEL__PLAYER_TEMPLATE");
    std::env::remove_var("TR_DEBUG__COLLECT_DIAGNOSTICS");
    assert_eq!(config.level.player_template, "crate");
    assert!(config.debug.collect_diagnostics);
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("TR_PHYSICS__GRAVITY");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.physics.tile_width, 16.0);
    assert_eq!(config.level.map_path, "data/map1.txt");
}

#[test]
#[serial]
fn test_bad_env_value_is_an_error() {
    std::env::set_var("TR_PHYSICS__COYOTE_FRAMES", "lots");
    let result = AppConfig::load();
    std::env::remove_var("TR_PHYSICS__COYOTE_FRAMES");
    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_default_toml_matches_defaults() {
    let text = std::fs::read_to_string("config/default.toml").unwrap();
    let from_file: AppConfig = toml::from_str(&text).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(from_file.physics, defaults.physics);
    assert_eq!(from_file.simulation.time_step, defaults.simulation.time_step);
    assert_eq!(from_file.input.history_length, defaults.input.history_length);
}

//! Integration tests for the configuration system

use std::time::Duration;
use storystream_config::{Config, ConfigError, ConfigManager};
use tempfile::TempDir;

fn setup_test_manager() -> (TempDir, ConfigManager) {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = ConfigManager::in_dir(temp_dir.path());
    (temp_dir, manager)
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager();

    let config = manager.load()?;
    assert_eq!(config, Config::default());

    let mut modified = config.clone();
    modified.player.seek_time_secs = 30;
    modified.player.sleep_timer_minutes = 60;
    modified.player.stop_after_current_chapter = true;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded.player.seek_increment(), Duration::from_secs(30));
    assert_eq!(
        reloaded.player.sleep_timer_duration(),
        Duration::from_secs(3600)
    );
    assert!(reloaded.player.stop_after_current_chapter);

    Ok(())
}

#[test]
fn test_invalid_config_is_never_written() {
    let (_temp_dir, manager) = setup_test_manager();

    let mut invalid = Config::default();
    invalid.player.previous_restart_threshold_ms = 120_000;

    match manager.save(&invalid) {
        Err(ConfigError::Invalid(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "player.previous_restart_threshold_ms");
        }
        other => panic!("expected Invalid, got {:?}", other),
    }
    assert!(!manager.path().exists());
}

#[test]
fn test_hand_edited_out_of_range_values_still_load() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager();
    std::fs::write(manager.path(), "version = 1\n[player]\nseek_time_secs = 0\n")?;

    let config = manager.load()?;
    assert_eq!(config.player.seek_time_secs, 0);
    assert!(config.player.validate().is_err());

    Ok(())
}

#[test]
fn test_update_persists_edit() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager();

    let updated = manager.update(|config| config.player.position_sync_interval_ms = 500)?;
    assert_eq!(updated.player.position_sync_interval(), Duration::from_millis(500));

    let text = std::fs::read_to_string(manager.path())?;
    assert!(text.contains("position_sync_interval_ms = 500"));

    Ok(())
}

#[test]
fn test_unreadable_file_is_reported() {
    let (_temp_dir, manager) = setup_test_manager();
    std::fs::write(manager.path(), "[player\n").unwrap();

    assert!(matches!(manager.load(), Err(ConfigError::Parse { .. })));
    assert_eq!(manager.load_or_default().player.seek_time_secs, 20);
}

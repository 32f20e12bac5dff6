//! Integration tests for configuration file loading.

use std::fs;
use std::path::PathBuf;

use padswap::config::{self, AppConfig, EmulatorLayout};
use padswap::error::SwapError;
use padswap::platform::Platform;
use tempfile::TempDir;

use crate::common::env::with_config_home;

#[test]
fn toml_config_is_loaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("padswap.toml");
    fs::write(
        &path,
        r#"
emulator_config_dir = "/home/pi/.config/dolphin-emu"
emulator = "/usr/games/dolphin-emu"
emulator_args = ["--batch", "--exec"]
device_bus = "evdev"
"#,
    )
    .unwrap();

    let loaded = config::load_file(&path).unwrap();
    assert_eq!(
        loaded.config.emulator_config_dir,
        PathBuf::from("/home/pi/.config/dolphin-emu")
    );
    assert_eq!(loaded.config.emulator_args, vec!["--batch", "--exec"]);
    assert_eq!(loaded.config.device_bus, "evdev");
    assert!(!loaded.config.allow_no_devices);
}

#[test]
fn yaml_config_is_loaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("padswap.yaml");
    fs::write(
        &path,
        "emulator_config_dir: dolphin\nallow_no_devices: true\nbackup_dir: backups\n",
    )
    .unwrap();

    let loaded = config::load_file(&path).unwrap();
    assert_eq!(loaded.config.emulator_config_dir, temp.path().join("dolphin"));
    assert_eq!(loaded.config.backup_dir, Some(temp.path().join("backups")));
    assert!(loaded.config.allow_no_devices);
}

#[test]
fn backup_dir_defaults_inside_emulator_config_dir() {
    let config = AppConfig {
        emulator_config_dir: PathBuf::from("/opt/retropie/configs/gc/Config"),
        ..AppConfig::default()
    };
    let layout = EmulatorLayout::from_config(&config);
    assert_eq!(
        layout.backup_dir(),
        PathBuf::from("/opt/retropie/configs/gc/Config/.padswap")
    );
    assert_eq!(
        layout.binding_file(Platform::Wii).live,
        PathBuf::from("/opt/retropie/configs/gc/Config/WiimoteNew.ini")
    );
    assert_eq!(
        layout.binding_file(Platform::Gc).backup,
        PathBuf::from("/opt/retropie/configs/gc/Config/.padswap/GCPadNew.ini")
    );
}

#[test]
fn non_evdev_bus_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("padswap.toml");
    fs::write(&path, "device_bus = \"SDL\"\n").unwrap();

    let err = config::load_file(&path).unwrap_err();
    assert!(matches!(err, SwapError::ConfigInvalid(_)));
    assert!(err.to_string().contains("evdev"));
}

#[test]
fn unknown_field_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("padswap.toml");
    fs::write(&path, "emulator_dir = \"/usr/bin\"\n").unwrap();

    let err = config::load_file(&path).unwrap_err();
    assert!(matches!(err, SwapError::ConfigParse(_)));
    assert!(err.to_string().contains("emulator_dir"));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("padswap.ini");
    fs::write(&path, "[x]\n").unwrap();

    assert!(matches!(
        config::load_file(&path),
        Err(SwapError::ConfigParse(_))
    ));
}

#[test]
fn explicit_missing_path_is_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let err = config::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, SwapError::ConfigNotFound { .. }));
    assert!(err.suggestion().is_some());
}

#[test]
fn default_location_is_used_when_present() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("padswap");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "allow_no_devices = true\n").unwrap();
    let _env = with_config_home(temp.path().to_str().unwrap());

    let loaded = config::load(None).unwrap();
    assert_eq!(loaded.source, Some(config_dir.join("config.toml")));
    assert!(loaded.config.allow_no_devices);
}

#[test]
fn defaults_without_any_file() {
    let temp = TempDir::new().unwrap();
    let _env = with_config_home(temp.path().to_str().unwrap());

    let loaded = config::load(None).unwrap();
    assert!(loaded.source.is_none());
    assert_eq!(loaded.config, AppConfig::default());
}

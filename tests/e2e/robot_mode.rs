//! Robot-mode end-to-end tests.

use std::path::Path;

use serde_json::json;

use crate::common::cli::CliRunner;
use crate::common::fixtures::{DolphinTree, USER_GCPAD};
use crate::common::init_test_logging;

fn cli_for(tree: &DolphinTree) -> CliRunner {
    let config = tree.write_padswap_config(Path::new("/nonexistent/dolphin-emu"));
    CliRunner::new()
        .with_env("RUST_LOG", "off")
        .with_config(&config)
}

#[test]
fn robot_version_outputs_json() {
    init_test_logging();
    let result = CliRunner::new().run_robot(&["version"]);
    result
        .assert_success()
        .assert_json_field("/version", &json!(env!("CARGO_PKG_VERSION")));
}

#[test]
fn compact_format_is_single_line() {
    init_test_logging();
    let result = CliRunner::new().run(&["version", "--format", "json-compact"]);
    result.assert_success();
    assert_eq!(result.stdout.trim().lines().count(), 1);
    assert!(result.json().get("version").is_some());
}

#[test]
fn format_env_var_selects_json() {
    init_test_logging();
    let result = CliRunner::new()
        .with_env("PADSWAP_FORMAT", "json")
        .run(&["version"]);
    result.assert_success();
    assert!(result.json().is_object());
}

#[test]
fn config_reports_layout() {
    init_test_logging();
    let tree = DolphinTree::new();
    let result = cli_for(&tree).run_robot(&["config"]);
    result.assert_success();

    let json = result.json();
    let config_dir = tree.path().display().to_string();
    assert_eq!(json["layout"]["config_dir"], json!(config_dir));
    assert_eq!(
        json["layout"]["journal"],
        json!(tree.path().join(".padswap/staging.json").display().to_string())
    );
    assert_eq!(json["config"]["emulator_args"], json!(["-b", "-e"]));
    result.assert_json_array_len("/layout/managed_files", 3);
}

#[test]
fn restore_with_nothing_staged() {
    init_test_logging();
    let tree = DolphinTree::with_user_files();
    let result = cli_for(&tree).run_robot(&["restore"]);
    result
        .assert_success()
        .assert_json_field("/needed", &json!(false))
        .assert_json_field("/clean", &json!(true));
}

#[test]
fn restore_moves_stray_backup_back() {
    init_test_logging();
    let tree = DolphinTree::new();
    tree.write(".padswap/GCPadNew.ini", USER_GCPAD);
    tree.write("GCPadNew.ini", "[GCPad1]\nSource = 0\n");

    let result = cli_for(&tree).run_robot(&["restore"]);
    result
        .assert_success()
        .assert_json_field("/needed", &json!(true))
        .assert_json_field("/clean", &json!(true))
        .assert_json_array_len("/report/restored", 1);

    assert_eq!(tree.read("GCPadNew.ini"), USER_GCPAD);
    assert!(!tree.exists(".padswap"));
}

#[test]
fn devices_lists_array() {
    init_test_logging();
    let tree = DolphinTree::new();
    let result = cli_for(&tree).run_robot(&["devices", "wii"]);

    if cfg!(target_os = "linux") {
        result.assert_success().assert_json_field("/platform", &json!("wii"));
        assert!(result.json()["devices"].is_array());
    } else {
        result.assert_exit_code(2);
    }
}

#[cfg(target_os = "linux")]
#[test]
fn no_devices_error_is_json_on_stderr() {
    init_test_logging();
    let tree = DolphinTree::with_user_files();
    let cli = cli_for(&tree);
    let before = tree.snapshot();

    let result = cli.run_robot(&["gc", "/roms/game.iso"]);
    result.assert_exit_code(2);
    assert!(result.stdout.trim().is_empty());

    let err = result.stderr_json();
    assert_eq!(err["error"], json!(true));
    assert_eq!(err["exit_code"], json!(2));
    assert!(
        err["suggestion"]
            .as_str()
            .is_some_and(|s| s.contains("--allow-no-devices"))
    );
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn missing_config_file_is_reported() {
    init_test_logging();
    let temp = tempfile::TempDir::new().unwrap();
    let result = CliRunner::new()
        .with_env("RUST_LOG", "off")
        .with_config(&temp.path().join("missing.toml"))
        .run_robot(&["config"]);

    result.assert_exit_code(1);
    let err = result.stderr_json();
    assert!(err["message"].as_str().unwrap().contains("missing.toml"));
    assert_eq!(err["suggestion"], json!("Check --config or PADSWAP_CONFIG"));
}

//! Integration tests for staging the emulator configuration and putting
//! the user's files back.

use std::fs;

use padswap::bindings;
use padswap::device::mock::MockEnumerator;
use padswap::device::resolve_devices;
use padswap::error::SwapError;
use padswap::ini::IniDocument;
use padswap::platform::Platform;
use padswap::profile::ProfileStore;
use padswap::stage::{self, StagePlan, StageState};

use crate::common::fixtures::{
    DolphinTree, GC_PROFILE, USER_GCPAD, USER_HOTKEYS, USER_SETTINGS, USER_WIIMOTE,
};

fn gc_plan(tree: &DolphinTree) -> StagePlan {
    tree.write_profile(Platform::Gc, "Pro Controller.ini", GC_PROFILE);
    let store = ProfileStore::new(&tree.layout());
    let devices = resolve_devices(
        &MockEnumerator::with_names(&["Pro Controller"]),
        &store,
        Platform::Gc,
        "evdev",
    )
    .unwrap();
    let (doc, hotkeys) = bindings::synthesize(&devices, Platform::Gc).unwrap();
    StagePlan {
        platform: Platform::Gc,
        bindings: doc,
        hotkeys: Some(hotkeys),
    }
}

fn confirm_stop(tree: &DolphinTree) -> Option<String> {
    let doc = IniDocument::parse(&tree.read("Dolphin.ini")).unwrap();
    doc.get("Interface", "ConfirmStop").map(str::to_string)
}

#[test]
fn restore_is_byte_identical() {
    let tree = DolphinTree::with_user_files();
    let plan = gc_plan(&tree);
    let before = tree.snapshot();

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert_ne!(tree.read("GCPadNew.ini"), USER_GCPAD);
    assert_eq!(tree.read("WiimoteNew.ini"), bindings::empty(Platform::Wii).render());
    assert_ne!(tree.read("Hotkeys.ini"), USER_HOTKEYS);

    let report = guard.restore();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.read("WiimoteNew.ini"), USER_WIIMOTE);
    assert!(!tree.layout().backup_dir().exists());
}

#[test]
fn staging_twice_in_a_row_is_idempotent() {
    let tree = DolphinTree::with_user_files();
    let plan = gc_plan(&tree);
    let before = tree.snapshot();

    for _ in 0..2 {
        let guard = stage::stage(&tree.layout(), &plan).unwrap();
        assert_eq!(tree.read("GCPadNew.ini"), plan.bindings.render());
        assert!(guard.restore().is_clean());
        assert_eq!(tree.snapshot(), before);
    }
}

#[test]
fn confirm_stop_is_forced_off_then_reverted() {
    let tree = DolphinTree::with_user_files();
    let plan = gc_plan(&tree);
    assert_eq!(confirm_stop(&tree).as_deref(), Some("True"));

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert_eq!(confirm_stop(&tree).as_deref(), Some("False"));
    // Other settings are untouched
    assert!(tree.read("Dolphin.ini").contains("ISOPath0 = /roms/gc"));

    guard.restore();
    assert_eq!(confirm_stop(&tree).as_deref(), Some("True"));
}

#[test]
fn absent_confirm_stop_key_stays_absent() {
    let tree = DolphinTree::new();
    let settings = "[Interface]\nUsePanicHandlers = False\n";
    tree.write("Dolphin.ini", settings);
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert_eq!(confirm_stop(&tree).as_deref(), Some("False"));
    guard.restore();

    assert_eq!(tree.read("Dolphin.ini"), settings);
}

#[test]
fn absent_interface_section_stays_absent() {
    let tree = DolphinTree::new();
    let settings = "[General]\nISOPaths = 1\n";
    tree.write("Dolphin.ini", settings);
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert_eq!(confirm_stop(&tree).as_deref(), Some("False"));
    guard.restore();

    assert_eq!(tree.read("Dolphin.ini"), settings);
}

#[test]
fn absent_confirm_stop_key_without_trailing_newline_is_identical() {
    let tree = DolphinTree::new();
    let settings = "[Interface]\nUsePanicHandlers = False";
    tree.write("Dolphin.ini", settings);
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert_eq!(confirm_stop(&tree).as_deref(), Some("False"));
    assert!(guard.restore().is_clean());

    assert_eq!(tree.read("Dolphin.ini"), settings);
}

#[test]
fn absent_section_without_trailing_newline_is_identical() {
    let tree = DolphinTree::new();
    let settings = "[General]\nISOPaths = 1";
    tree.write("Dolphin.ini", settings);
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert!(guard.restore().is_clean());

    assert_eq!(tree.read("Dolphin.ini"), settings);
}

#[test]
fn unterminated_settings_survive_crash_recovery() {
    let tree = DolphinTree::new();
    let settings = "[Interface]\nUsePanicHandlers = False";
    tree.write("Dolphin.ini", settings);
    let plan = gc_plan(&tree);

    std::mem::forget(stage::stage(&tree.layout(), &plan).unwrap());
    stage::recover(&tree.layout()).unwrap().expect("recovery needed");

    assert_eq!(tree.read("Dolphin.ini"), settings);
}

#[cfg(unix)]
#[test]
fn symlinked_settings_file_stays_a_link() {
    let tree = DolphinTree::with_user_files();
    let shared = tempfile::TempDir::new().unwrap();
    let target = shared.path().join("Dolphin.ini");
    fs::write(&target, USER_SETTINGS).unwrap();
    let link = tree.path().join("Dolphin.ini");
    fs::remove_file(&link).unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert!(fs::read_to_string(&target).unwrap().contains("ConfirmStop = False"));
    assert!(guard.restore().is_clean());

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&link).unwrap(), target);
    assert_eq!(fs::read_to_string(&target).unwrap(), USER_SETTINGS);
}

#[cfg(unix)]
#[test]
fn settings_file_mode_is_kept() {
    use std::os::unix::fs::PermissionsExt;

    let tree = DolphinTree::with_user_files();
    let path = tree.path().join("Dolphin.ini");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    let staged_mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(staged_mode & 0o777, 0o600);
    assert!(guard.restore().is_clean());

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(tree.read("Dolphin.ini"), USER_SETTINGS);
}

#[test]
fn missing_settings_file_stays_missing() {
    let tree = DolphinTree::new();
    let plan = gc_plan(&tree);

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert!(tree.exists("Dolphin.ini"));
    let report = guard.restore();

    assert!(report.is_clean());
    assert!(!tree.exists("Dolphin.ini"));
    assert!(!tree.exists("GCPadNew.ini"));
    assert!(!tree.exists("Hotkeys.ini"));
}

#[test]
fn launch_without_hotkeys_leaves_settings_alone() {
    let tree = DolphinTree::with_user_files();
    let plan = StagePlan {
        platform: Platform::Wii,
        bindings: bindings::empty(Platform::Wii),
        hotkeys: None,
    };

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    assert_eq!(confirm_stop(&tree).as_deref(), Some("True"));
    assert_eq!(tree.read("Hotkeys.ini"), USER_HOTKEYS);
    assert!(guard.restore().is_clean());
}

#[test]
fn recover_after_crash_restores_originals() {
    let tree = DolphinTree::with_user_files();
    let plan = gc_plan(&tree);
    let before = tree.snapshot();

    let mut guard = stage::stage(&tree.layout(), &plan).unwrap();
    guard.mark_launching();
    assert_eq!(guard.state(), StageState::Launching);
    // Simulate the process dying without running destructors
    std::mem::forget(guard);
    assert!(tree.layout().journal_path().exists());

    let report = stage::recover(&tree.layout()).unwrap().expect("recovery needed");
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(tree.snapshot(), before);
    assert!(stage::recover(&tree.layout()).unwrap().is_none());
}

#[test]
fn new_launch_refused_while_previous_is_unrestored() {
    let tree = DolphinTree::with_user_files();
    let plan = gc_plan(&tree);

    std::mem::forget(stage::stage(&tree.layout(), &plan).unwrap());
    let staged = tree.read("GCPadNew.ini");

    let err = stage::stage(&tree.layout(), &plan).unwrap_err();
    assert!(matches!(err, SwapError::StagingFailed { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(tree.read("GCPadNew.ini"), staged);

    stage::recover(&tree.layout()).unwrap();
    assert_eq!(tree.read("GCPadNew.ini"), USER_GCPAD);
}

#[test]
fn corrupt_settings_file_rolls_back_staged_bindings() {
    let tree = DolphinTree::with_user_files();
    tree.write("Dolphin.ini", "[Interface]\nConfirmStop\n");
    let plan = gc_plan(&tree);
    let before = tree.snapshot();

    let err = stage::stage(&tree.layout(), &plan).unwrap_err();
    assert!(matches!(err, SwapError::StagingFailed { .. }));
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn emulator_edits_to_staged_files_are_discarded() {
    let tree = DolphinTree::with_user_files();
    let plan = gc_plan(&tree);
    let before = tree.snapshot();

    let guard = stage::stage(&tree.layout(), &plan).unwrap();
    fs::write(tree.path().join("GCPadNew.ini"), "[GCPad1]\nSource = 2\n").unwrap();
    fs::write(tree.path().join("Hotkeys.ini"), "").unwrap();

    assert!(guard.restore().is_clean());
    assert_eq!(tree.snapshot(), before);
}

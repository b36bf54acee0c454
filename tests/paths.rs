//! Path Resolution Integration Tests
//!
//! The driver may be started from the project root or from its own
//! sub-directory; both must find the same toolchain.

use std::path::PathBuf;

use epsilon_driver::{resolve, OsFamily, PathResolver};

#[test]
fn test_tool_subdir_resolves_one_level_up() {
    let unix = resolve("viz", OsFamily::Other);
    assert_eq!(unix.compiler_classpath, PathBuf::from("../frontend/bin"));
    assert_eq!(unix.runtime_executable, PathBuf::from("../vm/evm"));

    let windows = resolve("viz", OsFamily::Windows);
    assert_eq!(windows.compiler_classpath, PathBuf::from("../frontend/bin"));
    assert_eq!(windows.runtime_executable, PathBuf::from("../vm/evm.exe"));
}

#[test]
fn test_other_dirs_resolve_in_place() {
    for name in ["EpsilonVM", "frontend", "vizualizer", ""] {
        let unix = resolve(name, OsFamily::Other);
        assert_eq!(unix.compiler_classpath, PathBuf::from("frontend/bin"));
        assert_eq!(unix.runtime_executable, PathBuf::from("vm/evm"));

        let windows = resolve(name, OsFamily::Windows);
        assert_eq!(windows.runtime_executable, PathBuf::from("vm/evm.exe"));
    }
}

#[test]
fn test_resolution_never_touches_filesystem() {
    // Nothing under these paths exists in the test environment
    let paths = resolve("viz", OsFamily::Other);
    assert!(paths.runtime_executable.is_relative());
    assert_eq!(paths, PathResolver::default().resolve("viz", OsFamily::Other));
}

#[test]
fn test_current_family_matches_platform() {
    let expected = if cfg!(windows) {
        OsFamily::Windows
    } else {
        OsFamily::Other
    };
    assert_eq!(OsFamily::current(), expected);
}

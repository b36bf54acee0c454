//! End-to-end Tests
//!
//! Drives real processes: shell scripts stand in for the JVM frontend and
//! the VM, so the subprocess runner, argument order and artifact handoff are
//! exercised together. Kept to a single test so no other test in this binary
//! forks while a script is still open for writing.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use epsilon_driver::adapters::Toolchain;
use epsilon_driver::config::paths::{ArtifactPaths, ResolvedPaths};
use epsilon_driver::core::check::check_source;
use epsilon_driver::core::SafetyLimits;
use epsilon_driver::domain::report::{CRITICAL_ERROR_LABEL, RUN_HEADER};
use epsilon_driver::{Orchestrator, PipelineOutcome, SubprocessRunner};
use tempfile::TempDir;

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[tokio::test]
async fn test_scripted_toolchain_round_trip() {
    let temp = TempDir::new().unwrap();
    let artifacts = ArtifactPaths::in_dir(temp.path());

    // Args: -cp <classpath> <entry_point> [--check] <source>
    let frontend = temp.path().join("fake-java");
    write_script(
        &frontend,
        &format!(
            r#"if [ "$4" = "--check" ]; then
  echo "[1:5] Expected variable name." >&2
  exit 1
fi
cat "$4"
printf 'BYTECODE' > '{}'"#,
            artifacts.compiled.display()
        ),
    );

    let vm = temp.path().join("evm");
    write_script(&vm, r#"cat "$1"; printf 'stack warning' >&2; exit 0"#);

    let paths = ResolvedPaths {
        compiler_classpath: temp.path().join("frontend").join("bin"),
        runtime_executable: vm,
    };
    let toolchain = Toolchain {
        launcher: frontend.display().to_string(),
        ..Default::default()
    };
    let limits = SafetyLimits {
        compile_timeout_seconds: 20,
        run_timeout_seconds: 20,
        ..Default::default()
    };

    let mut orchestrator = Orchestrator::new(std::sync::Arc::new(SubprocessRunner::new()))
        .with_toolchain(toolchain.clone())
        .with_artifacts(artifacts.clone())
        .with_limits(limits.clone());

    let source = "var x = 1;\nprint x;\n";
    let report = orchestrator.run(source, &paths).await;

    assert_eq!(report.compile_output, source);
    assert_eq!(
        report.run_output,
        format!("{}BYTECODE{}stack warning", RUN_HEADER, CRITICAL_ERROR_LABEL)
    );
    assert_eq!(
        report.outcome,
        PipelineOutcome::Success {
            runtime_exit_status: 0
        }
    );
    assert_eq!(std::fs::read_to_string(&artifacts.compiled).unwrap(), "BYTECODE");

    // Check mode goes through the same launcher
    let check = check_source(
        &SubprocessRunner::new(),
        &toolchain,
        &paths,
        "var = 1;",
        limits.compile_timeout(),
    )
    .await
    .unwrap();

    assert!(!check.passed);
    assert_eq!(check.diagnostics.len(), 1);
    assert_eq!(check.diagnostics[0].line, 1);
    assert_eq!(check.diagnostics[0].column, 5);
    assert_eq!(check.diagnostics[0].message, "Expected variable name.");
}

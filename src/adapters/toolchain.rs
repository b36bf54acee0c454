//! Command lines for the Epsilon frontend, VM and build.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Invocation;
use crate::config::paths::ResolvedPaths;

/// JVM used to launch the frontend
pub const DEFAULT_LAUNCHER: &str = "java";

/// Fully-qualified frontend entry point
pub const DEFAULT_ENTRY_POINT: &str = "com.epsilon.frontend.Main";

/// Frontend flag: parse only, report errors on stderr, write nothing
pub const CHECK_FLAG: &str = "--check";

/// How to launch the frontend compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    #[serde(default = "default_launcher")]
    pub launcher: String,

    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

fn default_launcher() -> String {
    DEFAULT_LAUNCHER.to_string()
}
fn default_entry_point() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            launcher: default_launcher(),
            entry_point: default_entry_point(),
        }
    }
}

impl Toolchain {
    fn frontend(&self, paths: &ResolvedPaths) -> Invocation {
        Invocation::new(&self.launcher)
            .arg("-cp")
            .arg(&paths.compiler_classpath)
            .arg(&self.entry_point)
    }

    /// `<launcher> -cp <classpath> <entry_point> <source>`
    pub fn compile(&self, paths: &ResolvedPaths, source: &Path) -> Invocation {
        self.frontend(paths).arg(source)
    }

    /// Same as `compile`, with the frontend in check-only mode
    pub fn check(&self, paths: &ResolvedPaths, source: &Path) -> Invocation {
        self.frontend(paths).arg(CHECK_FLAG).arg(source)
    }

    /// `<runtime_executable> <compiled>`
    pub fn execute(&self, paths: &ResolvedPaths, compiled: &Path) -> Invocation {
        Invocation::new(&paths.runtime_executable).arg(compiled)
    }
}

/// `make all`, run from the project root
pub fn build(project_root: &Path) -> Invocation {
    let invocation = Invocation::new("make").arg("all");
    if project_root.as_os_str().is_empty() {
        invocation
    } else {
        invocation.current_dir(project_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::{resolve, OsFamily};
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn args(invocation: &Invocation) -> Vec<String> {
        invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_compile_command_line() {
        let paths = resolve("viz", OsFamily::Other);
        let invocation = Toolchain::default().compile(&paths, Path::new("temp.epsilon"));

        assert_eq!(invocation.program, OsString::from("java"));
        assert_eq!(
            args(&invocation),
            vec!["-cp", "../frontend/bin", "com.epsilon.frontend.Main", "temp.epsilon"]
        );
        assert!(invocation.current_dir.is_none());
    }

    #[test]
    fn test_check_command_line() {
        let paths = resolve("root", OsFamily::Other);
        let invocation = Toolchain::default().check(&paths, Path::new("/tmp/x.epsilon"));

        assert_eq!(
            args(&invocation),
            vec![
                "-cp",
                "frontend/bin",
                "com.epsilon.frontend.Main",
                "--check",
                "/tmp/x.epsilon"
            ]
        );
    }

    #[test]
    fn test_execute_command_line() {
        let paths = resolve("root", OsFamily::Windows);
        let invocation = Toolchain::default().execute(&paths, Path::new("program.evm"));

        assert_eq!(invocation.program, OsString::from("vm/evm.exe"));
        assert_eq!(args(&invocation), vec!["program.evm"]);
    }

    #[test]
    fn test_build_runs_in_project_root() {
        assert_eq!(build(Path::new("")).current_dir, None);
        assert_eq!(
            build(Path::new("..")).current_dir,
            Some(PathBuf::from(".."))
        );
        assert_eq!(build(Path::new("..")).to_string(), "make all");
    }
}

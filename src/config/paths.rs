//! Canonical paths for the Epsilon toolchain.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use epsilon_driver::config::paths::{self, OsFamily};
//!
//! let resolved = paths::resolve("viz", OsFamily::current());
//! assert_eq!(resolved.compiler_classpath, std::path::PathBuf::from("../frontend/bin"));
//! ```
//!
//! ## Layout
//!
//! | Location | Owner | Purpose |
//! |----------|-------|---------|
//! | `frontend/bin` | Java frontend | Compiler classpath |
//! | `vm/evm[.exe]` | C VM | Runtime executable |
//! | `temp.epsilon` | driver | Working artifact (source) |
//! | `program.evm` | frontend | Compiled artifact |
//!
//! The driver may be launched from the repository root or from its own
//! sub-directory (`viz/`). Resolution is pure string construction; whether the
//! paths exist is discovered later, when the orchestrator runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sub-directory the driver may be launched from
pub const TOOL_SUBDIR: &str = "viz";

/// Compiler classpath, relative to the project root
pub const FRONTEND_CLASSPATH: &str = "frontend/bin";

/// Runtime executable without platform suffix, relative to the project root
pub const RUNTIME_STEM: &str = "vm/evm";

/// Default working artifact (source written before each run)
pub const WORKING_ARTIFACT: &str = "temp.epsilon";

/// Default compiled artifact (written by the frontend on success)
pub const COMPILED_ARTIFACT: &str = "program.evm";

/// Executable naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Other,
}

impl OsFamily {
    /// Family of the running platform
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }

    /// Suffix appended to executable names
    pub fn executable_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Other => "",
        }
    }
}

/// Toolchain locations resolved for one launch context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    /// Classpath passed to the JVM with `-cp`
    pub compiler_classpath: PathBuf,

    /// Path to the VM executable
    pub runtime_executable: PathBuf,
}

/// Repository layout used to resolve toolchain paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResolver {
    /// Directory name that means "one level below the project root"
    #[serde(default = "default_tool_subdir")]
    pub tool_subdir: String,

    /// Compiler classpath relative to the project root
    #[serde(default = "default_frontend_classpath")]
    pub frontend_classpath: String,

    /// Runtime executable relative to the project root, without suffix
    #[serde(default = "default_runtime_stem")]
    pub runtime: String,
}

fn default_tool_subdir() -> String {
    TOOL_SUBDIR.to_string()
}
fn default_frontend_classpath() -> String {
    FRONTEND_CLASSPATH.to_string()
}
fn default_runtime_stem() -> String {
    RUNTIME_STEM.to_string()
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            tool_subdir: default_tool_subdir(),
            frontend_classpath: default_frontend_classpath(),
            runtime: default_runtime_stem(),
        }
    }
}

impl PathResolver {
    /// Project root relative to a directory with the given name
    pub fn project_root(&self, current_dir_name: &str) -> PathBuf {
        if current_dir_name == self.tool_subdir {
            PathBuf::from("..")
        } else {
            PathBuf::new()
        }
    }

    /// Resolve compiler and runtime locations for a launch context
    pub fn resolve(&self, current_dir_name: &str, os: OsFamily) -> ResolvedPaths {
        let root = self.project_root(current_dir_name);
        let runtime = format!("{}{}", self.runtime, os.executable_suffix());

        ResolvedPaths {
            compiler_classpath: root.join(&self.frontend_classpath),
            runtime_executable: root.join(runtime),
        }
    }

    /// Resolve against the process's current directory
    pub fn resolve_from_cwd(&self, os: OsFamily) -> std::io::Result<ResolvedPaths> {
        let cwd = std::env::current_dir()?;
        Ok(self.resolve(&dir_name(&cwd), os))
    }
}

/// Resolve using the default layout
pub fn resolve(current_dir_name: &str, os: OsFamily) -> ResolvedPaths {
    PathResolver::default().resolve(current_dir_name, os)
}

/// Final component of a directory path (empty for `/`)
pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Working and compiled artifact locations for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Source text is written here before compiling
    #[serde(default = "default_working")]
    pub working: PathBuf,

    /// The frontend writes bytecode here on success
    #[serde(default = "default_compiled")]
    pub compiled: PathBuf,
}

fn default_working() -> PathBuf {
    PathBuf::from(WORKING_ARTIFACT)
}
fn default_compiled() -> PathBuf {
    PathBuf::from(COMPILED_ARTIFACT)
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            working: default_working(),
            compiled: default_compiled(),
        }
    }
}

impl ArtifactPaths {
    /// Artifacts placed inside a directory (used for isolated runs)
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            working: dir.join(WORKING_ARTIFACT),
            compiled: dir.join(COMPILED_ARTIFACT),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Adapter interfaces for the external toolchain.
//!
//! The frontend compiler and the VM are opaque programs: the driver only
//! knows how to launch them and what comes back (exit status plus both
//! output streams). `ProcessRunner` is the seam between the orchestrator and
//! the operating system so runs can be exercised without a real toolchain.

pub mod subprocess;
pub mod toolchain;

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use subprocess::SubprocessRunner;
pub use toolchain::Toolchain;

/// One external command to launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: OsString,

    /// Positional arguments, in order
    pub args: Vec<OsString>,

    /// Working directory (inherits the driver's when unset)
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Program name for messages
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of one finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code (-1 when terminated by a signal)
    pub exit_status: i32,

    /// Everything written to stdout
    pub stdout: String,

    /// Everything written to stderr
    pub stderr: String,
}

impl ProcessResult {
    pub fn new(exit_status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Failure to obtain a `ProcessResult` at all
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to collect output of '{program}': {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {limit:?}")]
    TimedOut { program: String, limit: Duration },
}

/// Launches external processes and waits for them to exit
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Human-readable runner name
    fn name(&self) -> &str;

    /// Run to completion, capturing both streams, bounded by `timeout` when set
    async fn run(
        &self,
        invocation: &Invocation,
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, InvokeError>;
}

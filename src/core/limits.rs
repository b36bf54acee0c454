//! Time limits for external toolchain invocations.
//!
//! Each stage that launches a process is bounded separately; a child that
//! outlives its limit is killed and the run reports a timeout. A limit of
//! `0` leaves the stage unbounded.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-stage time limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyLimits {
    /// Compiler timeout in seconds (default: 300 = 5 min)
    #[serde(default = "default_compile_timeout")]
    pub compile_timeout_seconds: u64,

    /// Runtime timeout in seconds (default: 0 = wait for the VM to exit)
    #[serde(default = "default_run_timeout")]
    pub run_timeout_seconds: u64,

    /// `make all` timeout in seconds (default: 600 = 10 min)
    #[serde(default = "default_build_timeout")]
    pub build_timeout_seconds: u64,
}

fn default_compile_timeout() -> u64 {
    300
}
fn default_run_timeout() -> u64 {
    0
}
fn default_build_timeout() -> u64 {
    600
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            compile_timeout_seconds: default_compile_timeout(),
            run_timeout_seconds: default_run_timeout(),
            build_timeout_seconds: default_build_timeout(),
        }
    }
}

fn bounded(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

impl SafetyLimits {
    /// Limit for the compile (and check) stage
    pub fn compile_timeout(&self) -> Option<Duration> {
        bounded(self.compile_timeout_seconds)
    }

    /// Limit for the execute stage
    pub fn run_timeout(&self) -> Option<Duration> {
        bounded(self.run_timeout_seconds)
    }

    /// Limit for building the toolchain
    pub fn build_timeout(&self) -> Option<Duration> {
        bounded(self.build_timeout_seconds)
    }
}

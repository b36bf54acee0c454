//! Pipeline report and its tagged outcome.
//!
//! A report is created fresh for every run, filled in stage by stage, and
//! handed to the caller once. The two text channels hold exactly what the
//! operator should see; `outcome` carries the same information in a form a
//! caller can match on.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Label preceding compiler stderr when compilation fails
pub const COMPILE_FAILURE_LABEL: &str = "COMPILATION FAILED:\n\n";

/// Header at the top of every runtime output
pub const RUN_HEADER: &str = "--- VM RUNTIME EXECUTION ---\n\n";

/// Label preceding non-empty runtime stderr
pub const CRITICAL_ERROR_LABEL: &str = "\n\nCRITICAL RUNTIME ERROR:\n";

/// Label for failures of the driver itself
pub const SYSTEM_EXCEPTION_LABEL: &str = "\nSYSTEM EXCEPTION: ";

/// Label for a stage that exceeded its time limit
pub const TIMED_OUT_LABEL: &str = "\nTIMED OUT: ";

/// Message shown when the VM has not been built
pub fn missing_runtime_message(path: &std::path::Path) -> String {
    format!(
        "SYSTEM ERROR: VM executable not found at '{}'.\nPlease build all components first.\n",
        path.display()
    )
}

/// Pipeline stage, used to attribute failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Persist,
    Compile,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Persist => "persist",
            Self::Compile => "compile",
            Self::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PipelineOutcome {
    /// Compiled and executed; the VM's exit status is informational
    Success { runtime_exit_status: i32 },

    /// The frontend rejected the source
    CompileFailure { exit_status: i32 },

    /// The VM executable does not exist
    MissingDependency { path: PathBuf },

    /// The driver could not write a file or launch a process
    IoFailure { stage: Stage, message: String },

    /// A process outlived its time limit and was killed
    TimedOut { stage: Stage, limit_ms: u64 },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short status name for listings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::CompileFailure { .. } => "compile-failure",
            Self::MissingDependency { .. } => "missing-dependency",
            Self::IoFailure { .. } => "io-failure",
            Self::TimedOut { .. } => "timed-out",
        }
    }
}

/// Caller-facing result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Compiler dump on success, labeled diagnostics on failure
    pub compile_output: String,

    /// Runtime output under the execution header, or a system error
    pub run_output: String,

    /// Tagged result
    pub outcome: PipelineOutcome,
}

impl PipelineReport {
    /// Whether the pipeline stopped before the runtime finished
    pub fn stopped_early(&self) -> bool {
        !self.outcome.is_success()
    }

    /// Why the pipeline stopped, if it did
    pub fn failure_reason(&self) -> Option<String> {
        match &self.outcome {
            PipelineOutcome::Success { .. } => None,
            PipelineOutcome::CompileFailure { exit_status } => {
                Some(format!("compiler exited with status {}", exit_status))
            }
            PipelineOutcome::MissingDependency { path } => Some(format!(
                "runtime executable not found at '{}'",
                path.display()
            )),
            PipelineOutcome::IoFailure { stage, message } => {
                Some(format!("{} stage failed: {}", stage, message))
            }
            PipelineOutcome::TimedOut { stage, limit_ms } => {
                Some(format!("{} stage timed out after {}ms", stage, limit_ms))
            }
        }
    }

    /// Exit status of the VM, when it ran
    pub fn runtime_exit_status(&self) -> Option<i32> {
        match self.outcome {
            PipelineOutcome::Success {
                runtime_exit_status,
            } => Some(runtime_exit_status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_failure_reason() {
        let report = PipelineReport {
            compile_output: "dump".to_string(),
            run_output: format!("{}42", RUN_HEADER),
            outcome: PipelineOutcome::Success {
                runtime_exit_status: 0,
            },
        };

        assert!(!report.stopped_early());
        assert_eq!(report.failure_reason(), None);
        assert_eq!(report.runtime_exit_status(), Some(0));
    }

    #[test]
    fn test_failure_reasons() {
        let report = PipelineReport {
            compile_output: String::new(),
            run_output: String::new(),
            outcome: PipelineOutcome::MissingDependency {
                path: PathBuf::from("vm/evm"),
            },
        };
        assert!(report.stopped_early());
        assert_eq!(
            report.failure_reason().as_deref(),
            Some("runtime executable not found at 'vm/evm'")
        );
        assert_eq!(report.runtime_exit_status(), None);

        let timed_out = PipelineOutcome::TimedOut {
            stage: Stage::Compile,
            limit_ms: 1500,
        };
        let report = PipelineReport { outcome: timed_out, ..report };
        assert_eq!(
            report.failure_reason().as_deref(),
            Some("compile stage timed out after 1500ms")
        );
    }

    #[test]
    fn test_missing_runtime_message() {
        let msg = missing_runtime_message(std::path::Path::new("../vm/evm.exe"));
        assert_eq!(
            msg,
            "SYSTEM ERROR: VM executable not found at '../vm/evm.exe'.\nPlease build all components first.\n"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = PipelineOutcome::IoFailure {
            stage: Stage::Persist,
            message: "permission denied".to_string(),
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"io_failure\""));
        assert!(json.contains("\"stage\":\"persist\""));

        let parsed: PipelineOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
        assert_eq!(parsed.label(), "io-failure");
    }
}

//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: the compile-and-run pipeline
//! - Check: frontend syntax check and diagnostic parsing
//! - Journal: append-only record of finished runs
//! - Limits: per-stage time limits
//! - Lock: advisory lock over the shared artifacts

pub mod check;
pub mod journal;
pub mod limits;
pub mod lock;
pub mod orchestrator;

// Re-export commonly used types
pub use check::{check_source, parse_diagnostics, CheckReport, Diagnostic};
pub use journal::{hash_source, RunJournal};
pub use limits::SafetyLimits;
pub use lock::{LockError, PipelineLock};
pub use orchestrator::{Orchestrator, PipelineError};

//! Domain types for the Epsilon driver.
//!
//! - Report: what one pipeline run shows the operator
//! - Run: journal record of a finished run

pub mod report;
pub mod run;

// Re-export commonly used types
pub use report::{PipelineOutcome, PipelineReport, Stage};
pub use run::RunRecord;

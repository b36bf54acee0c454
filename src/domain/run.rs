//! Journal record of a finished pipeline run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::report::{PipelineOutcome, PipelineReport};

/// One line of the run journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique identifier for this run
    pub id: Uuid,

    /// When the run finished
    pub timestamp: DateTime<Utc>,

    /// Truncated SHA-256 of the source text
    pub source_hash: String,

    /// Where the source was written
    pub working_artifact: PathBuf,

    /// How the run ended
    pub outcome: PipelineOutcome,

    /// Wall-clock time for the whole run
    pub duration_ms: u64,
}

impl RunRecord {
    /// Record a finished run with the current timestamp
    pub fn new(
        source_hash: String,
        working_artifact: PathBuf,
        report: &PipelineReport,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source_hash,
            working_artifact,
            outcome: report.outcome.clone(),
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let report = PipelineReport {
            compile_output: "COMPILATION FAILED:\n\nbad".to_string(),
            run_output: String::new(),
            outcome: PipelineOutcome::CompileFailure { exit_status: 1 },
        };
        let record = RunRecord::new(
            "0123456789abcdef".to_string(),
            PathBuf::from("temp.epsilon"),
            &report,
            12,
        );

        let json = serde_json::to_string(&record).unwrap();
        let parsed: RunRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, record);
        assert_eq!(parsed.outcome.label(), "compile-failure");
    }
}

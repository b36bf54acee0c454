//! Compile-and-run pipeline orchestrator.
//!
//! One run is: persist the source to the working artifact, compile it,
//! check that the VM exists, execute the compiled artifact. Steps are
//! strictly sequential and each external process is attempted once.
//! Every failure, anticipated or not, ends up in the returned report;
//! nothing below `run` escapes to the caller.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{InvokeError, Invocation, ProcessResult, ProcessRunner, SubprocessRunner, Toolchain};
use crate::config::paths::{ArtifactPaths, ResolvedPaths};
use crate::config::ResolvedConfig;
use crate::domain::report::{
    missing_runtime_message, COMPILE_FAILURE_LABEL, CRITICAL_ERROR_LABEL, RUN_HEADER,
    SYSTEM_EXCEPTION_LABEL, TIMED_OUT_LABEL,
};
use crate::domain::{PipelineOutcome, PipelineReport, RunRecord, Stage};

use super::journal::{hash_source, RunJournal};
use super::limits::SafetyLimits;
use super::lock::{lock_path_for, LockError, PipelineLock};

/// Failures that stop a run before it reaches a normal outcome
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot write working artifact '{}': {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("{stage} stage: {source}")]
    Invoke { stage: Stage, source: InvokeError },
}

impl PipelineError {
    fn stage(&self) -> Stage {
        match self {
            Self::Persist { .. } | Self::Lock(_) => Stage::Persist,
            Self::Invoke { stage, .. } => *stage,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Invoke { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    /// Write the labeled message into the channel the operator will look at
    fn annotate(&self, compile_output: &mut String, run_output: &mut String) {
        match self {
            Self::Invoke {
                stage: Stage::Execute,
                source: InvokeError::TimedOut { .. },
            } => {
                if run_output.is_empty() {
                    run_output.push_str(RUN_HEADER);
                }
                run_output.push_str(TIMED_OUT_LABEL);
                run_output.push_str(&self.message());
            }
            Self::Invoke {
                source: InvokeError::TimedOut { .. },
                ..
            } => {
                compile_output.push_str(TIMED_OUT_LABEL);
                compile_output.push_str(&self.message());
            }
            _ => {
                compile_output.push_str(SYSTEM_EXCEPTION_LABEL);
                compile_output.push_str(&self.message());
            }
        }
    }

    fn into_outcome(self) -> PipelineOutcome {
        match self {
            Self::Invoke {
                stage,
                source: InvokeError::TimedOut { limit, .. },
            } => PipelineOutcome::TimedOut {
                stage,
                limit_ms: limit.as_millis() as u64,
            },
            other => PipelineOutcome::IoFailure {
                stage: other.stage(),
                message: other.message(),
            },
        }
    }
}

/// Main pipeline orchestrator
pub struct Orchestrator {
    /// Launches the frontend and the VM
    runner: Arc<dyn ProcessRunner>,

    /// Frontend launch settings
    toolchain: Toolchain,

    /// Working and compiled artifact locations
    artifacts: ArtifactPaths,

    /// Per-stage time limits
    limits: SafetyLimits,

    /// Hold an advisory lock next to the working artifact during a run
    locking: bool,

    /// Where finished runs are recorded, if anywhere
    journal: Option<RunJournal>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Arc::new(SubprocessRunner::new()))
    }
}

impl Orchestrator {
    /// Create an orchestrator with default toolchain, artifacts and limits
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            toolchain: Toolchain::default(),
            artifacts: ArtifactPaths::default(),
            limits: SafetyLimits::default(),
            locking: true,
            journal: None,
        }
    }

    /// Build a subprocess-backed orchestrator from resolved configuration
    ///
    /// The journal is optional: an unusable state directory only disables it.
    pub async fn from_config(config: &ResolvedConfig) -> Self {
        let orchestrator = Self::new(Arc::new(SubprocessRunner::new()))
            .with_toolchain(config.toolchain.clone())
            .with_artifacts(config.artifacts.clone())
            .with_limits(config.limits.clone());

        match RunJournal::open(&config.home).await {
            Ok(journal) => orchestrator.with_journal(journal),
            Err(e) => {
                warn!(error = %e, "Run journal unavailable, runs will not be recorded");
                orchestrator
            }
        }
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactPaths) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_limits(mut self, limits: SafetyLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    pub fn with_journal(mut self, journal: RunJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn artifacts(&self) -> &ArtifactPaths {
        &self.artifacts
    }

    /// Compile and run `source`, returning a report for every outcome
    #[instrument(skip(self, source, paths), fields(working = %self.artifacts.working.display()))]
    pub async fn run(&mut self, source: &str, paths: &ResolvedPaths) -> PipelineReport {
        let started = Instant::now();
        info!(bytes = source.len(), "Starting pipeline run");

        let report = self.run_locked(source, paths).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &report.outcome {
            PipelineOutcome::Success { runtime_exit_status } => {
                info!(runtime_exit_status, duration_ms, "Pipeline completed");
            }
            outcome => {
                warn!(status = outcome.label(), duration_ms, "Pipeline stopped early");
            }
        }

        if let Some(journal) = &self.journal {
            let record = RunRecord::new(
                hash_source(source),
                self.artifacts.working.clone(),
                &report,
                duration_ms,
            );
            if let Err(e) = journal.append(&record).await {
                warn!(error = %e, "Failed to journal run");
            }
        }

        report
    }

    async fn run_locked(&self, source: &str, paths: &ResolvedPaths) -> PipelineReport {
        let mut compile_output = String::new();
        let mut run_output = String::new();

        let result = match self.lock() {
            Ok(_guard) => {
                self.stages(source, paths, &mut compile_output, &mut run_output)
                    .await
            }
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Pipeline aborted");
                e.annotate(&mut compile_output, &mut run_output);
                e.into_outcome()
            }
        };

        PipelineReport {
            compile_output,
            run_output,
            outcome,
        }
    }

    fn lock(&self) -> Result<Option<PipelineLock>, PipelineError> {
        if !self.locking {
            return Ok(None);
        }
        let lock = PipelineLock::acquire(&lock_path_for(&self.artifacts.working))?;
        debug!(lock = %lock.path().display(), "Acquired pipeline lock");
        Ok(Some(lock))
    }

    async fn stages(
        &self,
        source: &str,
        paths: &ResolvedPaths,
        compile_output: &mut String,
        run_output: &mut String,
    ) -> Result<PipelineOutcome, PipelineError> {
        // Persist
        tokio::fs::write(&self.artifacts.working, source)
            .await
            .map_err(|e| PipelineError::Persist {
                path: self.artifacts.working.clone(),
                source: e,
            })?;

        // Compile
        let invocation = self.toolchain.compile(paths, &self.artifacts.working);
        let compiled = self
            .invoke(Stage::Compile, &invocation, self.limits.compile_timeout())
            .await?;

        if !compiled.success() {
            warn!(exit_status = compiled.exit_status, "Compilation failed");
            compile_output.push_str(COMPILE_FAILURE_LABEL);
            compile_output.push_str(&compiled.stderr);
            return Ok(PipelineOutcome::CompileFailure {
                exit_status: compiled.exit_status,
            });
        }
        compile_output.push_str(&compiled.stdout);

        // Existence gate
        if !paths.runtime_executable.exists() {
            warn!(path = %paths.runtime_executable.display(), "Runtime executable not found");
            run_output.push_str(&missing_runtime_message(&paths.runtime_executable));
            return Ok(PipelineOutcome::MissingDependency {
                path: paths.runtime_executable.clone(),
            });
        }

        // Execute
        let invocation = self.toolchain.execute(paths, &self.artifacts.compiled);
        let executed = self
            .invoke(Stage::Execute, &invocation, self.limits.run_timeout())
            .await?;

        run_output.push_str(RUN_HEADER);
        run_output.push_str(&executed.stdout);
        if !executed.stderr.is_empty() {
            run_output.push_str(CRITICAL_ERROR_LABEL);
            run_output.push_str(&executed.stderr);
        }
        if !executed.success() {
            warn!(exit_status = executed.exit_status, "Runtime exited with non-zero status");
        }

        Ok(PipelineOutcome::Success {
            runtime_exit_status: executed.exit_status,
        })
    }

    async fn invoke(
        &self,
        stage: Stage,
        invocation: &Invocation,
        limit: Option<Duration>,
    ) -> Result<ProcessResult, PipelineError> {
        info!(%stage, command = %invocation, "Invoking");
        self.runner
            .run(invocation, limit)
            .await
            .map_err(|source| PipelineError::Invoke { stage, source })
    }
}

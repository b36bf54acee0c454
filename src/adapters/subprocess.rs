//! Subprocess runner backed by `tokio::process`.
//!
//! Output is collected in full once the child exits; nothing is streamed.
//! Children are spawned with `kill_on_drop`, so a timeout (or the caller
//! dropping the run future) terminates the process instead of orphaning it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{InvokeError, Invocation, ProcessResult, ProcessRunner};

/// Runs invocations as real OS processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    fn name(&self) -> &str {
        "subprocess"
    }

    async fn run(
        &self,
        invocation: &Invocation,
        limit: Option<Duration>,
    ) -> Result<ProcessResult, InvokeError> {
        let program = invocation.program_name();

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        debug!(command = %invocation, "Spawning process");

        let child = command.spawn().map_err(|source| InvokeError::Spawn {
            program: program.clone(),
            source,
        })?;

        let waiting = child.wait_with_output();
        let output = match limit {
            Some(limit) => timeout(limit, waiting)
                .await
                .map_err(|_| InvokeError::TimedOut {
                    program: program.clone(),
                    limit,
                })?,
            None => waiting.await,
        }
        .map_err(|source| InvokeError::Wait {
                program: program.clone(),
                source,
            })?;

        let exit_status = output.status.code().unwrap_or(-1);
        debug!(%program, exit_status, "Process exited");

        Ok(ProcessResult {
            exit_status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = SubprocessRunner::new();
        let invocation = Invocation::new("definitely-not-a-real-program-3f9a");

        let result = runner.run(&invocation, Some(Duration::from_secs(5))).await;
        assert!(matches!(result, Err(InvokeError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_both_streams_and_status() {
        let runner = SubprocessRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("printf out; printf err >&2; exit 3");

        let result = runner.run(&invocation, Some(Duration::from_secs(5))).await.unwrap();
        assert_eq!(result, ProcessResult::new(3, "out", "err"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_process_times_out() {
        let runner = SubprocessRunner::new();
        let invocation = Invocation::new("sleep").arg("5");

        let result = runner.run(&invocation, Some(Duration::from_millis(100))).await;
        match result {
            Err(InvokeError::TimedOut { program, limit }) => {
                assert_eq!(program, "sleep");
                assert_eq!(limit, Duration::from_millis(100));
            }
            other => panic!("Expected TimedOut, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unbounded_run_waits_for_exit() {
        let runner = SubprocessRunner::new();
        let invocation = Invocation::new("sh").arg("-c").arg("sleep 0.2; printf done");

        let result = runner.run(&invocation, None).await.unwrap();
        assert_eq!(result, ProcessResult::new(0, "done", ""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_current_dir_is_applied() {
        let temp = tempfile::TempDir::new().unwrap();
        let runner = SubprocessRunner::new();
        let invocation = Invocation::new("pwd").current_dir(temp.path());

        let result = runner.run(&invocation, Some(Duration::from_secs(5))).await.unwrap();
        let reported = std::path::PathBuf::from(result.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }
}

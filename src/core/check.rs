//! Syntax check through the frontend's `--check` mode.
//!
//! The frontend parses the file, writes nothing, and reports each error on
//! stderr as `[LINE:COL] MESSAGE`. Source is written to its own temporary
//! file, so a check never touches the pipeline's working artifact.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::adapters::{ProcessRunner, Toolchain};
use crate::config::paths::ResolvedPaths;

/// One error reported by the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
    pub message: String,
}

/// Result of a syntax check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Frontend exited with status zero
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Raw stderr, for errors that are not in diagnostic form
    pub stderr: String,
}

/// Parse `[LINE:COL] MESSAGE` lines, skipping anything else
pub fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    stderr.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Diagnostic> {
    let rest = line.strip_prefix('[')?;
    let (position, message) = rest.split_once("] ")?;
    let (line_no, column) = position.split_once(':')?;

    Some(Diagnostic {
        line: line_no.parse().ok()?,
        column: column.parse().ok()?,
        message: message.trim_end().to_string(),
    })
}

/// Run the frontend in check mode against `source`
pub async fn check_source(
    runner: &dyn ProcessRunner,
    toolchain: &Toolchain,
    paths: &ResolvedPaths,
    source: &str,
    limit: Option<Duration>,
) -> Result<CheckReport> {
    let mut file = tempfile::Builder::new()
        .prefix("diag_")
        .suffix(".epsilon")
        .tempfile()
        .context("Failed to create temporary source file")?;
    file.write_all(source.as_bytes())
        .context("Failed to write temporary source file")?;
    file.flush().context("Failed to flush temporary source file")?;

    let invocation = toolchain.check(paths, file.path());
    debug!(command = %invocation, "Checking source");

    let result = runner
        .run(&invocation, limit)
        .await
        .context("Syntax check failed to run")?;

    Ok(CheckReport {
        passed: result.success(),
        diagnostics: parse_diagnostics(&result.stderr),
        stderr: result.stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnostics() {
        let stderr = "[3:7] Expected ';' after value.\n\
                      Exception in thread \"main\" java.lang.RuntimeException\n\
                      [10:1] Unexpected token 'fn'.\n";

        let diagnostics = parse_diagnostics(stderr);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic {
                    line: 3,
                    column: 7,
                    message: "Expected ';' after value.".to_string(),
                },
                Diagnostic {
                    line: 10,
                    column: 1,
                    message: "Unexpected token 'fn'.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        assert!(parse_diagnostics("").is_empty());
        assert!(parse_diagnostics("[x:1] bad line").is_empty());
        assert!(parse_diagnostics("[1-2] bad separator").is_empty());
        assert!(parse_diagnostics("no brackets at all").is_empty());
    }

    #[test]
    fn test_windows_line_endings() {
        let diagnostics = parse_diagnostics("[2:4] Undefined variable 'y'.\r\n");
        assert_eq!(diagnostics[0].message, "Undefined variable 'y'.");
    }
}

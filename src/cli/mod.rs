//! Command-line interface for epsilon.
//!
//! Provides commands for compiling and running a script, checking its
//! syntax, building the toolchain, and inspecting configuration and past runs.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{toolchain, ProcessRunner, SubprocessRunner};
use crate::config::paths::{dir_name, OsFamily, ResolvedPaths};
use crate::config::ResolvedConfig;
use crate::core::{check_source, Orchestrator, RunJournal};
use crate::domain::PipelineReport;

/// epsilon - Compile and run Epsilon scripts
#[derive(Parser, Debug)]
#[command(name = "epsilon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile an Epsilon script and run it on the VM
    Run {
        /// Path to the .epsilon file (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Read source from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Check a script for syntax errors without running it
    Check {
        /// Path to the .epsilon file
        file: PathBuf,
    },

    /// Build all components of the toolchain (`make all`)
    Build,

    /// Show resolved toolchain paths and configuration
    Paths,

    /// List recent pipeline runs
    History {
        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = crate::config::config()?;

        match self.command {
            Commands::Run { file, stdin } => run_script(config, file, stdin).await,
            Commands::Check { file } => check_script(config, file).await,
            Commands::Build => build_toolchain(config).await,
            Commands::Paths => show_paths(config),
            Commands::History { limit } => show_history(config, limit).await,
        }
    }
}

fn resolve_paths(config: &ResolvedConfig) -> Result<ResolvedPaths> {
    config
        .layout
        .resolve_from_cwd(OsFamily::current())
        .context("Failed to determine current directory")
}

fn read_source(file: Option<PathBuf>, use_stdin: bool) -> Result<String> {
    if let Some(path) = file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))
    } else if use_stdin || !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        anyhow::bail!("No source provided. Pass a file or pipe to stdin")
    }
}

/// Compile and run a script
async fn run_script(config: &ResolvedConfig, file: Option<PathBuf>, use_stdin: bool) -> Result<()> {
    let source = read_source(file, use_stdin)?;
    let paths = resolve_paths(config)?;
    let mut orchestrator = Orchestrator::from_config(config).await;

    // Dropping the run future kills any toolchain process still running
    let report = tokio::select! {
        report = orchestrator.run(&source, &paths) => report,
        _ = tokio::signal::ctrl_c() => {
            anyhow::bail!("Interrupted; toolchain processes were terminated");
        }
    };

    print_report(&report);

    match report.failure_reason() {
        Some(reason) => {
            eprintln!("\n[Pipeline stopped: {}]", reason);
            std::process::exit(1);
        }
        None => match report.runtime_exit_status() {
            Some(0) => eprintln!("\n[Pipeline completed]"),
            Some(status) => {
                eprintln!("\n[Pipeline completed; VM exited with status {}]", status);
                std::process::exit(1);
            }
            None => {}
        },
    }

    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("=== BYTECODE INSPECTOR ===");
    println!("{}", report.compile_output);
    if !report.run_output.is_empty() {
        println!("=== RUNTIME MONITOR ===");
        println!("{}", report.run_output);
    }
}

/// Syntax-check a script
async fn check_script(config: &ResolvedConfig, file: PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read source file: {}", file.display()))?;
    let paths = resolve_paths(config)?;

    let report = check_source(
        &SubprocessRunner::new(),
        &config.toolchain,
        &paths,
        &source,
        config.limits.compile_timeout(),
    )
    .await?;

    for diagnostic in &report.diagnostics {
        println!(
            "{}:{}:{}: {}",
            file.display(),
            diagnostic.line,
            diagnostic.column,
            diagnostic.message
        );
    }

    if report.passed {
        eprintln!("[{}: no syntax errors]", file.display());
        return Ok(());
    }

    if report.diagnostics.is_empty() {
        eprint!("{}", report.stderr);
    }
    eprintln!("[{}: check failed]", file.display());
    std::process::exit(1);
}

/// Build the frontend and VM from the project root
async fn build_toolchain(config: &ResolvedConfig) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let root = config.layout.project_root(&dir_name(&cwd));
    let invocation = toolchain::build(&root);

    eprintln!("[Orchestrating build: {}]", invocation);
    let result = SubprocessRunner::new()
        .run(&invocation, config.limits.build_timeout())
        .await
        .context("Failed to run make. Ensure 'make' is installed")?;

    print!("{}", result.stdout);
    eprint!("{}", result.stderr);

    if !result.success() {
        eprintln!("\n[Build failed with exit code {}]", result.exit_status);
        std::process::exit(1);
    }

    eprintln!("\n[All components built successfully]");
    Ok(())
}

/// Show resolved configuration (debug)
fn show_paths(config: &ResolvedConfig) -> Result<()> {
    let paths = resolve_paths(config)?;

    println!("Configuration:");
    match &config.config_file {
        Some(path) => println!("  Config file:  {}", path.display()),
        None => println!("  Config file:  (none, using defaults)"),
    }
    println!("  State dir:    {}", config.home.display());

    println!("\nToolchain:");
    println!("  Launcher:     {}", config.toolchain.launcher);
    println!("  Entry point:  {}", config.toolchain.entry_point);
    println!("  Classpath:    {}", paths.compiler_classpath.display());
    println!(
        "  VM:           {} ({})",
        paths.runtime_executable.display(),
        if paths.runtime_executable.exists() {
            "found"
        } else {
            "missing"
        }
    );

    println!("\nArtifacts:");
    println!("  Working:      {}", config.artifacts.working.display());
    println!("  Compiled:     {}", config.artifacts.compiled.display());

    println!("\nLimits:");
    println!("  Compile:      {}", describe_limit(config.limits.compile_timeout()));
    println!("  Run:          {}", describe_limit(config.limits.run_timeout()));
    println!("  Build:        {}", describe_limit(config.limits.build_timeout()));

    Ok(())
}

fn describe_limit(limit: Option<Duration>) -> String {
    match limit {
        Some(limit) => format!("{}s", limit.as_secs()),
        None => "unbounded".to_string(),
    }
}

/// List recent runs
async fn show_history(config: &ResolvedConfig, limit: usize) -> Result<()> {
    let journal = RunJournal::open(&config.home).await?;
    let records = journal.recent(limit).await?;

    if records.is_empty() {
        println!("No runs found");
        return Ok(());
    }

    println!(
        "{:<38} {:<26} {:<20} {:<18} {:>8}",
        "RUN ID", "FINISHED", "STATUS", "SOURCE", "MS"
    );
    println!("{}", "-".repeat(114));

    for record in records {
        println!(
            "{:<38} {:<26} {:<20} {:<18} {:>8}",
            record.id.to_string(),
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            record.outcome.label(),
            record.source_hash,
            record.duration_ms
        );
    }

    Ok(())
}

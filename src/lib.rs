//! epsilon-driver - Compile-and-run driver for the Epsilon toolchain
//!
//! Drives the Java frontend compiler and the C VM from a single action and
//! reports what each produced.
//!
//! # Architecture
//!
//! A run is a short, strictly ordered pipeline:
//! - Source text is written to a working artifact (`temp.epsilon`)
//! - The frontend compiles it to `program.evm`
//! - If the VM executable exists, it executes the compiled artifact
//! - Every outcome, including failures of the driver itself, is returned
//!   as a labeled report
//!
//! # Modules
//!
//! - `adapters`: Process launching and toolchain command lines
//! - `config`: Configuration and path resolution
//! - `core`: Orchestration logic (Orchestrator, Check, Journal)
//! - `domain`: Data structures (PipelineReport, RunRecord)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Compile and run a script
//! epsilon run hello.epsilon
//!
//! # Check syntax only
//! epsilon check hello.epsilon
//!
//! # Build the frontend and VM
//! epsilon build
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{Invocation, ProcessResult, ProcessRunner, SubprocessRunner};
pub use config::paths::{resolve, ArtifactPaths, OsFamily, PathResolver, ResolvedPaths};
pub use core::Orchestrator;
pub use domain::{PipelineOutcome, PipelineReport, Stage};

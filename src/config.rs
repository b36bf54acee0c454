//! Configuration for the Epsilon driver.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (EPSILON_HOME, EPSILON_LAUNCHER)
//! 2. Config file (.epsilon/config.yaml)
//! 3. Defaults (~/.epsilon, `java`, `temp.epsilon`, `program.evm`)
//!
//! Config file discovery:
//! - Searches current directory and parents for .epsilon/config.yaml
//! - `home` in the config file is relative to the .epsilon/ directory
//! - Artifact paths are used as given; the frontend writes its output
//!   relative to the directory the driver was started from

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::Toolchain;
use crate::core::SafetyLimits;
use paths::{ArtifactPaths, PathResolver};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    /// State directory (relative to the .epsilon/ directory)
    pub home: Option<String>,
    #[serde(default)]
    pub layout: Option<PathResolver>,
    #[serde(default)]
    pub toolchain: Option<Toolchain>,
    #[serde(default)]
    pub artifacts: Option<ArtifactPaths>,
    #[serde(default)]
    pub limits: Option<SafetyLimits>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the state directory (run journal)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Repository layout for path resolution
    pub layout: PathResolver,
    /// Frontend launch settings
    pub toolchain: Toolchain,
    /// Working and compiled artifacts
    pub artifacts: ArtifactPaths,
    /// Per-stage time limits
    pub limits: SafetyLimits,
}

/// Values read from the environment
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    home: Option<String>,
    launcher: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            home: std::env::var("EPSILON_HOME").ok(),
            launcher: std::env::var("EPSILON_LAUNCHER").ok(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".epsilon").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge config file, environment and defaults
fn merge(
    config_path: Option<&Path>,
    file: Option<ConfigFile>,
    env: EnvOverrides,
    default_home: PathBuf,
) -> ResolvedConfig {
    let file_home = match (config_path, file.as_ref().and_then(|f| f.home.as_deref())) {
        (Some(config_path), Some(home)) => {
            let epsilon_dir = config_path.parent().unwrap_or(Path::new("."));
            Some(resolve_path(epsilon_dir, home))
        }
        _ => None,
    };

    let home = env
        .home
        .map(PathBuf::from)
        .or(file_home)
        .unwrap_or(default_home);

    let (layout, mut toolchain, artifacts, limits) = match file {
        Some(f) => (
            f.layout.unwrap_or_default(),
            f.toolchain.unwrap_or_default(),
            f.artifacts.unwrap_or_default(),
            f.limits.unwrap_or_default(),
        ),
        None => Default::default(),
    };

    if let Some(launcher) = env.launcher {
        toolchain.launcher = launcher;
    }

    ResolvedConfig {
        home,
        config_file: config_path.map(Path::to_path_buf),
        layout,
        toolchain,
        artifacts,
        limits,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".epsilon");

    let config_file = find_config_file();
    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    Ok(merge(
        config_file.as_deref(),
        file,
        EnvOverrides::from_env(),
        default_home,
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

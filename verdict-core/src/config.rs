//! Configuration management for Verdict
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (VERDICT_*)
//! 3. Config file (~/.config/verdict/config.toml)
//! 4. Default values
//!
//! Each layer is applied to a [`Resolved`] value, which remembers the layer
//! that last set every field so `verdict config` can explain the result.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Name of the test tool looked up on PATH when nothing else is configured
#[cfg(windows)]
pub const DEFAULT_TOOL: &str = "vstest.console.exe";

/// Name of the test tool looked up on PATH when nothing else is configured
#[cfg(not(windows))]
pub const DEFAULT_TOOL: &str = "vstest.console";

/// Environment variable overriding the tool path
pub const ENV_TOOL: &str = "VERDICT_TOOL";

/// Environment variable overriding the timeout, in whole seconds
pub const ENV_TIMEOUT_SECS: &str = "VERDICT_TIMEOUT_SECS";

/// External test tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Path to (or name of) the test tool executable
    pub path: String,

    /// Kill the tool if it runs longer than this; zero means no limit
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_TOOL.to_string(),
            timeout: None, // Wait as long as the tool needs
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Test tool configuration
    pub tool: ToolConfig,
}

/// The layer a setting came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Built-in default
    Default,
    /// Config file at this path
    File(PathBuf),
    /// Environment variable
    Env(&'static str),
    /// Command-line flag
    Cli,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::File(path) => write!(f, "file {}", path.display()),
            Source::Env(var) => write!(f, "env {}", var),
            Source::Cli => write!(f, "command line"),
        }
    }
}

/// Effective configuration and where each value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub config: Config,
    /// Layer that set `tool.path`
    pub tool_path: Source,
    /// Layer that set `tool.timeout`
    pub timeout: Source,
}

/// Fields a config file may set; absent ones leave lower layers alone
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileLayer {
    tool: FileToolLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileToolLayer {
    path: Option<String>,
    #[serde(with = "humantime_serde")]
    timeout: Option<Duration>,
}

impl Default for Resolved {
    fn default() -> Self {
        Self {
            config: Config::default(),
            tool_path: Source::Default,
            timeout: Source::Default,
        }
    }
}

impl Resolved {
    /// Apply a config file layer
    pub fn with_file(mut self, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let layer: FileLayer = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        if let Some(tool) = layer.tool.path {
            self.config.tool.path = tool;
            self.tool_path = Source::File(path.to_path_buf());
        }

        if let Some(timeout) = layer.tool.timeout {
            self.config.tool.timeout = Some(timeout);
            self.timeout = Source::File(path.to_path_buf());
        }

        Ok(self)
    }

    /// Apply overrides from the process environment
    ///
    /// Supported variables:
    /// - VERDICT_TOOL: Path to the test tool
    /// - VERDICT_TIMEOUT_SECS: Run timeout in whole seconds
    pub fn with_env_overrides(self) -> Self {
        self.with_env(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// An unparsable timeout is logged and ignored; lower layers keep their value.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tool) = lookup(ENV_TOOL) {
            self.config.tool.path = tool;
            self.tool_path = Source::Env(ENV_TOOL);
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => {
                    self.config.tool.timeout = Some(Duration::from_secs(secs));
                    self.timeout = Source::Env(ENV_TIMEOUT_SECS);
                }
                Err(e) => warn!(
                    value = %timeout,
                    error = %e,
                    "Ignoring invalid {}", ENV_TIMEOUT_SECS
                ),
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, tool: Option<String>, timeout: Option<Duration>) -> Self {
        if let Some(path) = tool {
            self.config.tool.path = path;
            self.tool_path = Source::Cli;
        }

        if let Some(t) = timeout {
            self.config.tool.timeout = Some(t);
            self.timeout = Source::Cli;
        }

        self
    }
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Ok(Self::resolve_file()?.config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Ok(Resolved::default().with_file(path)?.config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/verdict/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("verdict").join("config.toml"))
    }

    /// Resolve every layer, keeping track of where each value came from
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn resolve(tool: Option<String>, timeout: Option<Duration>) -> Result<Resolved> {
        Ok(Self::resolve_file()?
            .with_env_overrides()
            .with_cli_overrides(tool, timeout))
    }

    fn resolve_file() -> Result<Resolved> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Resolved::default().with_file(&path),
            _ => Ok(Resolved::default()),
        }
    }
}

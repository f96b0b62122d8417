//! Configuration module for filekit.

use serde::Deserialize;
use std::path::Path;

use crate::dir::{DirOptions, OutputMode};
use crate::upload::{UploadRequest, DEFAULT_MAX_SIZE};
use crate::{FileKitError, Result};

/// Directory traversal defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraversalConfig {
    /// Output mode (default, absolute, relative).
    #[serde(default)]
    pub mode: OutputMode,
    /// Walk all descendants.
    #[serde(default)]
    pub recursive: bool,
    /// Leave directories out of the listing.
    #[serde(default)]
    pub files_only: bool,
}

impl From<&TraversalConfig> for DirOptions {
    fn from(config: &TraversalConfig) -> Self {
        DirOptions::new()
            .with_mode(config.mode)
            .with_recursive(config.recursive)
            .with_files_only(config.files_only)
    }
}

/// Upload intake configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Path to the upload directory.
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    /// Maximum upload size in bytes (0 = unlimited).
    #[serde(default)]
    pub max_size: u64,
    /// Accepted extensions (empty = all).
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Rejected extensions.
    #[serde(default)]
    pub disallowed_types: Vec<String>,
    /// Replace existing files instead of renaming.
    #[serde(default)]
    pub overwrite: bool,
    /// Start from the built-in size ceiling and extension lists.
    #[serde(default)]
    pub use_defaults: bool,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_size: 0,
            allowed_types: vec![],
            disallowed_types: vec![],
            overwrite: false,
            use_defaults: false,
        }
    }
}

impl UploadConfig {
    /// Build the validator settings.
    ///
    /// With `use_defaults`, the built-in lists are used and extended by the
    /// configured ones; a non-zero `max_size` replaces the default ceiling.
    pub fn to_request(&self) -> UploadRequest {
        let request = UploadRequest::new(&self.dir).with_overwrite(self.overwrite);
        if !self.use_defaults {
            return request
                .with_max_size(self.max_size)
                .with_allowed_types(&self.allowed_types)
                .with_disallowed_types(&self.disallowed_types);
        }

        let max_size = if self.max_size > 0 {
            self.max_size
        } else {
            DEFAULT_MAX_SIZE
        };
        let defaults = request.with_defaults(max_size);
        let allowed: Vec<String> = defaults
            .allowed_types
            .iter()
            .chain(&self.allowed_types)
            .cloned()
            .collect();
        let disallowed: Vec<String> = defaults
            .disallowed_types
            .iter()
            .chain(&self.disallowed_types)
            .cloned()
            .collect();
        defaults
            .with_allowed_types(allowed)
            .with_disallowed_types(disallowed)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file (empty = console only).
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Traversal defaults.
    #[serde(default)]
    pub traversal: TraversalConfig,
    /// Upload configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FileKitError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FileKitError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEKIT_UPLOAD_DIR`: Override the upload directory
    /// - `FILEKIT_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("FILEKIT_UPLOAD_DIR") {
            if !dir.is_empty() {
                self.upload.dir = dir;
            }
        }
        if let Ok(level) = std::env::var("FILEKIT_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The upload directory is empty
    /// - An extension is both allowed and disallowed
    /// - The log level is unknown
    pub fn validate(&self) -> Result<()> {
        if self.upload.dir.trim().is_empty() {
            return Err(FileKitError::Config(
                "upload.dir must not be empty".to_string(),
            ));
        }
        crate::logging::parse_level(&self.logging.level)?;

        let request = self.upload.to_request();
        if let Some(ext) = request
            .allowed_types
            .iter()
            .find(|ext| request.disallowed_types.contains(ext))
        {
            return Err(FileKitError::Config(format!(
                "extension {ext} is both allowed and disallowed"
            )));
        }
        Ok(())
    }
}

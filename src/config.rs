//! # Configuration Module
//!
//! This module provides configuration support for licenser, letting a project
//! pin its license, licensor, scanned extension, exclusions and notice
//! settings, and define its own header templates.
//!
//! Configuration can be specified in a `.licenser.toml` file in the scanned
//! root, via `--config` or via the `LICENSER_CONFIG` environment variable.
//! Command-line flags always win over the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::templates::{HeaderRegistry, HeaderTemplate};
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".licenser.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "LICENSER_CONFIG";

/// Exit code for any configuration failure.
pub const CONFIG_ERROR_EXIT_CODE: i32 = 10;

/// A header template defined in the configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
  /// Header lines; `{{licensor}}` is replaced with the licensor.
  pub lines: Vec<String>,
}

/// Notice generation settings.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NoticeConfig {
  /// Notice file name, relative to the scanned root.
  pub file: Option<String>,
  /// Project name at the top of the notice.
  pub project: Option<String>,
  /// Year the project started.
  pub year: Option<String>,
  /// Notice header template.
  pub header: Option<String>,
}

/// Main configuration struct for licenser.
///
/// Every field is optional; unset fields fall back to the command line or the
/// built-in defaults.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
  /// License label to check, e.g. `ASL2`.
  pub license: Option<String>,

  /// Name substituted for `{{licensor}}` in headers.
  pub licensor: Option<String>,

  /// Extension of the files to scan, including the leading dot.
  pub ext: Option<String>,

  /// Paths to exclude, added to the ones given on the command line.
  #[serde(default)]
  pub exclude: Vec<String>,

  #[serde(default)]
  pub notice: NoticeConfig,

  /// Additional or overriding header templates, keyed by license label.
  #[serde(default)]
  pub headers: BTreeMap<String, HeaderConfig>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{}': {source}", .path.display())]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{}': {source}", .path.display())]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// The explicitly requested config file does not exist.
  #[error("Config file '{}' does not exist", .path.display())]
  NotFound { path: PathBuf },

  /// The scanned extension is malformed.
  #[error("Invalid extension '{ext}': {message}")]
  InvalidExtension { ext: String, message: String },

  /// A header template is invalid.
  #[error("Invalid header '{label}': {message}")]
  InvalidHeader { label: String, message: String },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read, parsed
  /// or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    verbose_log!("Loaded {} header overrides", config.headers.len());

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - The extension, when set, starts with a dot and isn't just the dot
  /// - Every header has a label and at least one line
  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(ext) = &self.ext {
      validate_extension(ext)?;
    }

    for (label, header) in &self.headers {
      if label.trim().is_empty() {
        return Err(ConfigError::InvalidHeader {
          label: label.clone(),
          message: "label cannot be empty".to_string(),
        });
      }
      if header.lines.is_empty() {
        return Err(ConfigError::InvalidHeader {
          label: label.clone(),
          message: "header needs at least one line".to_string(),
        });
      }
    }

    Ok(())
  }

  /// Adds the configured headers to `registry`, replacing same-named ones.
  pub fn apply_headers(&self, registry: &mut HeaderRegistry) {
    for (label, header) in &self.headers {
      registry.insert(label.clone(), HeaderTemplate::new(header.lines.iter().cloned()));
    }
  }
}

/// Checks that `ext` looks like `.go`.
pub fn validate_extension(ext: &str) -> Result<(), ConfigError> {
  let message = if !ext.starts_with('.') {
    "extension must start with a dot"
  } else if ext.len() == 1 {
    "extension cannot be empty"
  } else {
    return Ok(());
  };
  Err(ConfigError::InvalidExtension {
    ext: ext.to_string(),
    message: message.to_string(),
  })
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `LICENSER_CONFIG` environment variable
/// 3. `.licenser.toml` in the scanned root
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when `explicit_path` doesn't exist.
pub fn discover_config_path(explicit_path: Option<&Path>, root: &Path) -> Result<Option<PathBuf>, ConfigError> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Ok(Some(path.to_path_buf()));
    }
    return Err(ConfigError::NotFound {
      path: path.to_path_buf(),
    });
  }

  if let Some(env_path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Ok(Some(path));
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, path.display());
  }

  // A file root has no config of its own.
  let root_config = root.join(DEFAULT_CONFIG_FILENAME);
  if root.is_dir() && root_config.is_file() {
    verbose_log!("Using project config: {}", root_config.display());
    return Ok(Some(root_config));
  }

  verbose_log!("No config file found");
  Ok(None)
}

/// Load configuration from the discovered path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `root` - The scanned root directory
/// * `no_config` - If true, skip config file discovery
///
/// # Returns
///
/// The loaded configuration, or `None` if there is none to load.
pub fn load_config(explicit_path: Option<&Path>, root: &Path, no_config: bool) -> Result<Option<Config>, ConfigError> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  discover_config_path(explicit_path, root)?
    .map(|path| Config::load(&path))
    .transpose()
}

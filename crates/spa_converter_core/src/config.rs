//! Host-side loader configuration.
//!
//! # Responsibility
//! - Describe where children live per build mode (`{SPA_NAME}` templates).
//! - Carry host fallback texts and logging settings.
//!
//! # Invariants
//! - Every template contains the `{SPA_NAME}` placeholder exactly once.
//! - A config that fails `validate` is never returned from the loaders.

use crate::entry::descriptor::EntryDescriptor;
use crate::logging::{default_log_level, init_logging, LoggingError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Placeholder substituted with the child name in entry templates.
pub const SPA_NAME_PLACEHOLDER: &str = "{SPA_NAME}";
/// Default text while a child is still loading.
pub const DEFAULT_LOADING_TEXT: &str = "[Sub Spa] Converter is preparing.";
/// Default text for a ready child without a `render` slot.
pub const DEFAULT_EMPTY_TEXT: &str = "[Sub Spa] This Sub-app has no content.";

/// Which entry template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    Dev,
    Prod,
}

impl BuildMode {
    /// `Dev` for debug builds, `Prod` for release builds.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Dev
        } else {
            Self::Prod
        }
    }
}

/// Loader configuration supplied by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    pub entry_template_dev: String,
    pub entry_template_prod: String,
    #[serde(default = "default_loading_text")]
    pub loading_text: String,
    #[serde(default = "default_empty_text")]
    pub empty_text: String,
    #[serde(default = "default_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl LoaderConfig {
    /// Config using the same template for both build modes.
    pub fn with_template(template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            entry_template_dev: template.clone(),
            entry_template_prod: template,
            loading_text: default_loading_text(),
            empty_text: default_empty_text(),
            log_level: default_level(),
            log_dir: None,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_template("entry_template_dev", &self.entry_template_dev)?;
        validate_template("entry_template_prod", &self.entry_template_prod)?;
        Ok(())
    }

    /// Entry for `spa_name` under the current build mode.
    pub fn entry_for(&self, spa_name: &str) -> Result<EntryDescriptor, ConfigError> {
        self.entry_for_mode(spa_name, BuildMode::current())
    }

    pub fn entry_for_mode(
        &self,
        spa_name: &str,
        mode: BuildMode,
    ) -> Result<EntryDescriptor, ConfigError> {
        let spa_name = spa_name.trim();
        if spa_name.is_empty() || spa_name.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidSpaName(spa_name.to_string()));
        }
        let template = match mode {
            BuildMode::Dev => &self.entry_template_dev,
            BuildMode::Prod => &self.entry_template_prod,
        };
        Ok(EntryDescriptor::literal(
            template.replace(SPA_NAME_PLACEHOLDER, spa_name),
        ))
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when no directory is configured.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        init_logging(&self.log_level, dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}

fn validate_template(field: &'static str, template: &str) -> Result<(), ConfigError> {
    if template.trim().is_empty() {
        return Err(ConfigError::EmptyTemplate(field));
    }
    if template.matches(SPA_NAME_PLACEHOLDER).count() != 1 {
        return Err(ConfigError::PlaceholderCount {
            field,
            template: template.to_string(),
        });
    }
    Ok(())
}

fn default_loading_text() -> String {
    DEFAULT_LOADING_TEXT.to_string()
}

fn default_empty_text() -> String {
    DEFAULT_EMPTY_TEXT.to_string()
}

fn default_level() -> String {
    default_log_level().to_string()
}

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read { path: PathBuf, reason: String },
    Parse(String),
    EmptyTemplate(&'static str),
    PlaceholderCount { field: &'static str, template: String },
    InvalidSpaName(String),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "failed to read config `{}`: {reason}", path.display())
            }
            Self::Parse(reason) => write!(f, "invalid config: {reason}"),
            Self::EmptyTemplate(field) => write!(f, "config `{field}` must not be empty"),
            Self::PlaceholderCount { field, template } => write!(
                f,
                "config `{field}` must contain `{SPA_NAME_PLACEHOLDER}` exactly once: {template}"
            ),
            Self::InvalidSpaName(value) => write!(f, "spa name is invalid: `{value}`"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            _ => None,
        }
    }
}

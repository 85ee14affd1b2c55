//! Layered configuration for LifeTracker.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file: the path given explicitly, otherwise `config.toml` in the
//!    platform config directory (ignored if it doesn't exist)
//! 3. Environment variables prefixed with `LIFETRACKER_`, nested keys joined by
//!    `__`, e.g. `LIFETRACKER_ATTACHMENTS__DATA_DIR=/srv/attachments`
//!
//! ```toml
//! [attachments]
//! data_dir = "/home/me/LifeTracker/attachments"
//! strict = false
//!
//! [attachments.opener]
//! program = "xdg-open"
//! args = []
//!
//! [logging]
//! level = "debug"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::OptionExt;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "LIFETRACKER_";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub attachments: AttachmentsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttachmentsConfig {
    /// Storage root. Unset means `attachments` under the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Surface delete/open failures instead of reporting a bare `false`.
    pub strict: bool,
    /// Launcher for "open with default application". Unset means detect.
    pub opener: Option<OpenerConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OpenerConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string() }
    }
}

impl Config {
    /// Merge every source and extract.
    ///
    /// # Errors
    ///
    /// - [`NotFound`](ErrorKind::NotFound) if `path` is given but missing
    /// - [`Load`](ErrorKind::Load) if a value has the wrong shape
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    /// The merged providers, before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                Some(Toml::file_exact(path))
            },
            None => match default_config_file() {
                Some(path) if path.is_file() => {
                    tracing::trace!(path = %path.display(), "Using default config file");
                    Some(Toml::file_exact(path))
                },
                _ => None,
            },
        };
        let mut figment = Figment::new();
        if let Some(file) = file {
            figment = figment.merge(file);
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|e| ErrorKind::Load(e.to_string()))?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

impl AttachmentsConfig {
    /// The configured storage root, or the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs().ok_or_raise(|| ErrorKind::NoHomeDirectory)?.data_dir().join("attachments")),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "lifetracker")
}

/// `config.toml` in the platform config directory, if there is a home.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! tagnotes has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Settings committed alongside the package
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TAGNOTES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/tagnotes/config.toml`
//! 3. `~/.tagnotes/config.toml`
//!
//! # Repo Config Location
//!
//! `.tagnotes.toml` at the root of the work tree.
//!
//! # Example
//!
//! ```no_run
//! use tagnotes::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! println!("Registry: {}", config.registry());
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::forge::github::{DEFAULT_API_BASE, DEFAULT_WEB_BASE};
use crate::forge::ListClosedPullsOpts;

/// Registry used when none is configured.
pub const DEFAULT_REGISTRY: &str = "JuliaRegistries/General";

/// Repo config file name.
pub const REPO_CONFIG_FILE: &str = ".tagnotes.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// A loaded config file and the directory its relative paths resolve from.
#[derive(Debug, Clone)]
struct Scope {
    file: ConfigFile,
    base_dir: PathBuf,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence automatically. Repo config overrides
/// global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    global: Option<Scope>,
    repo: Option<Scope>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_root` is provided, also loads the repo config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error (defaults are used).
    pub fn load(repo_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(Self::find_global(), repo_root)
    }

    /// Load from an explicit global config path and repo root.
    pub fn load_from(
        global_path: Option<PathBuf>,
        repo_root: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let global = match global_path {
            Some(path) => Some(Self::read_scope(&path, parent_dir(&path))?),
            None => None,
        };

        let repo = match repo_root {
            Some(root) => {
                let path = root.join(REPO_CONFIG_FILE);
                if path.exists() {
                    Some(Self::read_scope(&path, root.to_path_buf())?)
                } else {
                    None
                }
            }
            None => None,
        };

        Ok(Config { global, repo })
    }

    /// Locate the global config file, if any.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $TAGNOTES_CONFIG
        if let Ok(path) = std::env::var("TAGNOTES_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/tagnotes/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("tagnotes/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.tagnotes/config.toml
        dirs::home_dir()
            .map(|home| home.join(".tagnotes/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read, parse and validate one config file.
    fn read_scope(path: &Path, base_dir: PathBuf) -> Result<Scope, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(Scope { file, base_dir })
    }

    /// First value set by repo, then global.
    fn lookup<'a, T>(&'a self, get: impl Fn(&'a ConfigFile) -> Option<T>) -> Option<T> {
        self.repo
            .as_ref()
            .and_then(|s| get(&s.file))
            .or_else(|| self.global.as_ref().and_then(|s| get(&s.file)))
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Registry repository slug.
    ///
    /// Defaults to `JuliaRegistries/General`.
    pub fn registry(&self) -> &str {
        self.lookup(|f| f.registry.as_deref())
            .unwrap_or(DEFAULT_REGISTRY)
    }

    /// GitHub API base URL.
    pub fn api_base(&self) -> &str {
        self.lookup(|f| f.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// GitHub web base URL.
    pub fn web_base(&self) -> &str {
        self.lookup(|f| f.web_base.as_deref())
            .unwrap_or(DEFAULT_WEB_BASE)
    }

    /// Registry fallback scan limit.
    pub fn registry_scan_limit(&self) -> usize {
        self.lookup(|f| f.registry_scan_limit)
            .unwrap_or(ListClosedPullsOpts::DEFAULT_LIMIT)
    }

    /// The configured changelog template, if any.
    ///
    /// The most specific scope that sets `template` or `template_file`
    /// wins. A `template_file` is read relative to its scope: the work tree
    /// for the repo file, the config file's directory for the global file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the template file can't be read.
    pub fn template(&self) -> Result<Option<String>, ConfigError> {
        for scope in [self.repo.as_ref(), self.global.as_ref()].into_iter().flatten() {
            if let Some(template) = &scope.file.template {
                return Ok(Some(template.clone()));
            }
            if let Some(file) = &scope.file.template_file {
                let path = scope.base_dir.join(file);
                return read_template(&path).map(Some);
            }
        }
        Ok(None)
    }
}

/// Read a template file.
pub fn read_template(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the repository file;
//! repository values override global ones key by key.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., `registry` must be an
//! `owner/name` slug).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::forge::github::parse_repo_slug;

/// A configuration file.
///
/// # Example
///
/// ```toml
/// registry = "JuliaRegistries/General"
/// api_base = "https://api.github.com"
/// web_base = "https://github.com"
/// registry_scan_limit = 300
/// template_file = ".github/changelog.md.j2"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Registry repository as `owner/name`
    pub registry: Option<String>,

    /// GitHub API base URL
    pub api_base: Option<String>,

    /// GitHub web base URL
    pub web_base: Option<String>,

    /// Inline changelog template
    pub template: Option<String>,

    /// Path to a changelog template, relative to the config file's scope
    pub template_file: Option<PathBuf>,

    /// How many closed registry pull requests to scan when the head
    /// filter finds nothing
    pub registry_scan_limit: Option<usize>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(registry) = &self.registry {
            if parse_repo_slug(registry).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid registry '{}', expected 'owner/name'",
                    registry
                )));
            }
        }

        for (key, url) in [("api_base", &self.api_base), ("web_base", &self.web_base)] {
            if let Some(url) = url {
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} must be an http(s) URL, got '{}'",
                        key, url
                    )));
                }
            }
        }

        if self.template.is_some() && self.template_file.is_some() {
            return Err(ConfigError::InvalidValue(
                "set either 'template' or 'template_file', not both".to_string(),
            ));
        }

        if self.registry_scan_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "registry_scan_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

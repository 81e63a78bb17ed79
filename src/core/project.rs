//! core::project
//!
//! Package identity as recorded in the registry.
//!
//! The name and UUID come from the project file at the root of the work
//! tree (`Project.toml`, or `JuliaProject.toml` when that is absent).
//! Everything else in the file is ignored.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Project file names, in lookup order.
pub const PROJECT_FILES: [&str; 2] = ["Project.toml", "JuliaProject.toml"];

/// Errors from loading the project file.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no Project.toml or JuliaProject.toml in '{dir}'")]
    NotFound { dir: PathBuf },

    #[error("failed to read project file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse project file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("project file '{path}' has no '{field}' field")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("project file '{path}' has an invalid uuid '{value}'")]
    InvalidUuid { path: PathBuf, value: String },
}

/// On-disk shape of the fields we read.
#[derive(Debug, Deserialize)]
struct ProjectFile {
    name: Option<String>,
    uuid: Option<String>,
}

/// The package as known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Package name, e.g. `PkgName`
    pub name: String,
    /// Package UUID
    pub uuid: Uuid,
}

impl Project {
    /// Create a project from its parts.
    pub fn new(name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            name: name.into(),
            uuid,
        }
    }

    /// Load the project file from `root`.
    ///
    /// # Errors
    ///
    /// - [`ProjectError::NotFound`] if neither project file exists
    /// - Read, parse or field errors for a file that exists but is unusable
    pub fn load(root: &Path) -> Result<Self, ProjectError> {
        let path = PROJECT_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.exists())
            .ok_or_else(|| ProjectError::NotFound {
                dir: root.to_path_buf(),
            })?;

        let contents = fs::read_to_string(&path).map_err(|e| ProjectError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::parse(&contents, &path)
    }

    /// Parse project file contents. `path` is used for error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ProjectError> {
        let file: ProjectFile = toml::from_str(contents).map_err(|e| ProjectError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let name = file.name.ok_or_else(|| ProjectError::MissingField {
            path: path.to_path_buf(),
            field: "name",
        })?;
        let raw_uuid = file.uuid.ok_or_else(|| ProjectError::MissingField {
            path: path.to_path_buf(),
            field: "uuid",
        })?;
        let uuid = Uuid::parse_str(&raw_uuid).map_err(|_| ProjectError::InvalidUuid {
            path: path.to_path_buf(),
            value: raw_uuid.clone(),
        })?;

        Ok(Self { name, uuid })
    }

    /// First 8 hex characters of the UUID, as used in registry branch names.
    pub fn short_uuid(&self) -> String {
        let mut simple = self.uuid.simple().to_string();
        simple.truncate(8);
        simple
    }
}

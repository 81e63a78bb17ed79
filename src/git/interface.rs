//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to the local clone. It only reads:
//! commit dates, the commit list, remotes and the work tree location.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested revision does not exist
//! - [`GitError::Internal`]: Anything else reported by libgit2
//!
//! # Example
//!
//! ```ignore
//! use tagnotes::git::{CommitLog, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! println!("{}", git.committer_date("v1.0.0")?);
//! ```

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, TimeZone};
use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested revision does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The revision that was not found
        refname: String,
    },

    /// A commit carries a timestamp that cannot be represented.
    #[error("commit {rev} has an invalid timestamp")]
    InvalidTime {
        /// The revision being read
        rev: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound
            | git2::ErrorCode::InvalidSpec
            | git2::ErrorCode::UnbornBranch => GitError::RefNotFound {
                refname: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Read-only commit history queries.
///
/// Changelog code depends on this trait rather than on [`Git`] so that the
/// history can be stubbed in tests.
pub trait CommitLog {
    /// Committer date of `rev`, formatted as RFC 3339 with the committer's
    /// UTC offset (the `%cI` format of `git show`).
    fn committer_date(&self, rev: &str) -> Result<String, GitError>;

    /// Ids of the commits reachable from HEAD, newest first.
    fn commit_ids(&self) -> Result<Vec<String>, GitError>;
}

/// The main Git interface.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Root of the working tree.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: e.message().to_string(),
            }),
        }
    }
}

impl CommitLog for Git {
    fn committer_date(&self, rev: &str) -> Result<String, GitError> {
        let commit = self
            .repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, rev))?;

        let when = commit.committer().when();
        let offset = FixedOffset::east_opt(when.offset_minutes() * 60).ok_or_else(|| {
            GitError::InvalidTime {
                rev: rev.to_string(),
            }
        })?;
        let date = offset
            .timestamp_opt(when.seconds(), 0)
            .single()
            .ok_or_else(|| GitError::InvalidTime {
                rev: rev.to_string(),
            })?;

        Ok(date.to_rfc3339())
    }

    fn commit_ids(&self) -> Result<Vec<String>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TIME)?;
        revwalk
            .push_head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        revwalk
            .map(|oid| oid.map(|o| o.to_string()).map_err(GitError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_non_repo_fails() {
        let temp = TempDir::new().unwrap();
        let err = Git::open(temp.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepo { .. }));
    }

    #[test]
    fn unknown_revision_is_ref_not_found() {
        let temp = TempDir::new().unwrap();
        git2::Repository::init(temp.path()).unwrap();
        let git = Git::open(temp.path()).unwrap();

        let err = git.committer_date("v9.9.9").unwrap_err();
        assert!(matches!(err, GitError::RefNotFound { ref refname } if refname == "v9.9.9"));
    }

    #[test]
    fn remote_url_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();
        repo.remote("origin", "git@github.com:Me/PkgName.jl.git")
            .unwrap();
        let git = Git::open(temp.path()).unwrap();

        assert_eq!(
            git.remote_url("origin").unwrap().as_deref(),
            Some("git@github.com:Me/PkgName.jl.git")
        );
        assert!(git.remote_url("upstream").unwrap().is_none());
    }

    #[test]
    fn error_display_formatting() {
        let err = GitError::RefNotFound {
            refname: "v1.0.0".to_string(),
        };
        assert_eq!(err.to_string(), "ref not found: v1.0.0");
        let err = GitError::InvalidTime {
            rev: "abc".to_string(),
        };
        assert!(err.to_string().contains("invalid timestamp"));
    }
}

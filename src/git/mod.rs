//! git
//!
//! Single interface for all local Git reads.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to the local clone. No other module
//! imports `git2`. Everything here is read-only: the changelog never
//! checks out, fetches or writes refs.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Committer dates of revisions (tags, commit ids)
//! - The newest-first commit list
//! - Remote URL lookup
//!
//! # Example
//!
//! ```ignore
//! use tagnotes::git::{CommitLog, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let oldest = git.commit_ids()?.pop();
//! ```

mod interface;

pub use interface::{CommitLog, Git, GitError};

//! forge::traits
//!
//! Forge trait definition and the entities it returns.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! A forge value is bound to exactly one repository; a changelog run uses two
//! of them (the tracked package repository and the registry repository).
//!
//! Every operation is a read. Failures are returned unchanged to the caller;
//! the forge never retries.
//!
//! # Example
//!
//! ```
//! use tagnotes::forge::{Forge, ForgeError};
//!
//! async fn latest_tags(forge: &dyn Forge) -> Result<Vec<String>, ForgeError> {
//!     let releases = forge.list_releases().await?;
//!     Ok(releases.into_iter().map(|r| r.tag).collect())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from forge operations.
///
/// These error types map to common failure modes when talking to a
/// hosting service such as GitHub.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error, or a response that could not be decoded.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A user-like entity as returned by the host API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login handle
    pub login: String,
    /// Display name. Listing payloads omit it; see [`Forge::user`].
    #[serde(default)]
    pub name: Option<String>,
    /// Profile page
    pub html_url: String,
}

/// An issue or pull request label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// A published release of the tracked repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Tag name, e.g. `v1.2.3`
    pub tag: String,
    /// Commit the release points at (`target_commitish`)
    pub commit: String,
}

impl Release {
    /// Create a release from a tag and its commit reference.
    pub fn new(tag: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            commit: commit.into(),
        }
    }

    /// A ref that resolves to the release commit in a local clone.
    ///
    /// `target_commitish` is only a commit id for some releases; for the
    /// rest it names the branch the release was cut from, which has since
    /// moved. The tag is used in that case.
    pub fn commit_ref(&self) -> &str {
        if is_full_commit_id(&self.commit) {
            &self.commit
        } else {
            &self.tag
        }
    }
}

fn is_full_commit_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A closed issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub labels: Vec<Label>,
    pub user: User,
    pub closed_at: Option<DateTime<Utc>>,
    /// Populated after listing, see [`Forge::issue_closer`]
    pub closed_by: Option<User>,
}

/// A closed pull request, as seen through the issues listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pull {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub labels: Vec<Label>,
    pub user: User,
    pub closed_at: Option<DateTime<Utc>>,
    /// `None` when the pull request was closed without merging
    pub merged_at: Option<DateTime<Utc>>,
    /// Populated after listing, see [`Forge::pull_merger`]
    pub merged_by: Option<User>,
}

/// Which kind of entity a [`ChangeItem`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Issue,
    Pull,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Issue => write!(f, "issue"),
            ItemKind::Pull => write!(f, "pull request"),
        }
    }
}

/// A closed issue or pull request.
///
/// The variant is fixed when the entity is fetched and decides which
/// closing actor (closer or merger) the item carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeItem {
    Issue(Issue),
    Pull(Pull),
}

impl ChangeItem {
    /// The entity kind.
    pub fn kind(&self) -> ItemKind {
        match self {
            ChangeItem::Issue(_) => ItemKind::Issue,
            ChangeItem::Pull(_) => ItemKind::Pull,
        }
    }

    /// Issue or pull request number.
    pub fn number(&self) -> u64 {
        match self {
            ChangeItem::Issue(i) => i.number,
            ChangeItem::Pull(p) => p.number,
        }
    }

    /// When the item was closed.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ChangeItem::Issue(i) => i.closed_at,
            ChangeItem::Pull(p) => p.closed_at,
        }
    }
}

/// A pull request listed from the pulls endpoint.
///
/// This is the shape used for registry lookups, where the source branch
/// and the body matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR URL (web URL for viewing)
    pub url: String,
    /// Source branch name (`head.ref`)
    pub head: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Whether the PR was merged
    pub merged: bool,
    /// When the PR was closed
    pub closed_at: Option<DateTime<Utc>>,
}

/// Options for listing closed pull requests.
#[derive(Debug, Clone, Default)]
pub struct ListClosedPullsOpts {
    /// Exact `owner:branch` head filter
    pub head: Option<String>,
    /// Maximum number of pull requests to return (default: 300)
    pub limit: Option<usize>,
}

impl ListClosedPullsOpts {
    /// Default number of pull requests returned when no limit is set.
    pub const DEFAULT_LIMIT: usize = 300;

    /// Filter on an exact `owner:branch` head.
    pub fn with_head(head: impl Into<String>) -> Self {
        Self {
            head: Some(head.into()),
            limit: None,
        }
    }

    /// The limit to apply.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// The Forge trait for reading from a remote hosting service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. A changelog run does not
/// recover from any of them; they are surfaced to the caller as-is.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Repository owner (user or organization login).
    fn owner(&self) -> &str;

    /// Repository name.
    fn repo(&self) -> &str;

    /// Web URL of the repository, without a trailing slash.
    fn html_url(&self) -> String;

    /// List every release of the repository.
    async fn list_releases(&self) -> Result<Vec<Release>, ForgeError>;

    /// List closed issues and pull requests updated at or after `since`.
    ///
    /// `since` is a naive UTC timestamp. Items come back in API order,
    /// each tagged with its kind. Closing actors are not populated.
    async fn list_closed_items(&self, since: NaiveDateTime)
        -> Result<Vec<ChangeItem>, ForgeError>;

    /// Fetch the user that closed an issue.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the issue doesn't exist
    async fn issue_closer(&self, number: u64) -> Result<Option<User>, ForgeError>;

    /// Fetch the user that merged a pull request.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the pull request doesn't exist
    async fn pull_merger(&self, number: u64) -> Result<Option<User>, ForgeError>;

    /// Fetch a user's profile, including the display name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no such user exists
    async fn user(&self, login: &str) -> Result<User, ForgeError>;

    /// List closed pull requests, optionally filtered by exact head.
    ///
    /// Returns at most `opts.effective_limit()` entries.
    async fn list_closed_pulls(
        &self,
        opts: ListClosedPullsOpts,
    ) -> Result<Vec<PullRequest>, ForgeError>;
}
